//! Weighted reciprocal-rank fusion.

use std::collections::HashMap;

use ragstore_core::config::FusionWeights;
use ragstore_core::identity::chunk_identity;
use ragstore_core::types::{Chunk, FusedResult, RetrievalResult};
use ragstore_core::Result;

struct Entry {
    chunk: Chunk,
    score: f32,
    best_rank: usize,
}

/// Fuses two ranked lists into one, scoring each chunk as the sum of
/// `weight / rank` over the signals that returned it.
///
/// Chunks are matched across signals by their identity digest, so the
/// same passage surfaced by both lists accumulates both contributions.
/// Ties are broken by the best contributing rank, then by input order
/// (lexical list first). Returns at most `k` results, best first.
pub fn fuse(
    lexical: &[RetrievalResult],
    semantic: &[RetrievalResult],
    weights: FusionWeights,
    k: usize,
) -> Result<Vec<FusedResult>> {
    weights.validate()?;
    if k == 0 {
        return Ok(Vec::new());
    }

    let mut slots: HashMap<_, usize> = HashMap::new();
    let mut entries: Vec<Entry> = Vec::new();
    for (results, weight) in [(lexical, weights.lexical), (semantic, weights.semantic)] {
        for result in results {
            let rank = result.rank.max(1);
            let contribution = weight / rank as f32;
            let id = chunk_identity(&result.chunk);
            match slots.get(&id) {
                Some(&slot) => {
                    let entry = &mut entries[slot];
                    entry.score += contribution;
                    entry.best_rank = entry.best_rank.min(rank);
                }
                None => {
                    slots.insert(id, entries.len());
                    entries.push(Entry {
                        chunk: result.chunk.clone(),
                        score: contribution,
                        best_rank: rank,
                    });
                }
            }
        }
    }

    // Stable sort keeps input order for entries that tie on both keys.
    entries.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.best_rank.cmp(&b.best_rank))
    });
    entries.truncate(k);
    Ok(entries
        .into_iter()
        .map(|entry| FusedResult {
            chunk: entry.chunk,
            fused_score: entry.score,
        })
        .collect())
}
