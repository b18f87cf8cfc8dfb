//! Dedup reconciliation between a chunk batch and the vector store.

use std::collections::HashSet;

use tracing::{debug, info};

use ragstore_core::identity::chunk_identity;
use ragstore_core::traits::{EmbeddingModel, VectorStore};
use ragstore_core::types::{Chunk, ChunkIdentity};
use ragstore_core::{Error, Result};

/// Inserts exactly the chunks the store has not seen before and returns
/// them.
///
/// Duplicates within the batch collapse to their first occurrence before
/// the store is consulted. The store sees at most one existence check
/// and one upsert per call regardless of batch size, and an empty batch
/// touches neither the store nor the embedder. Re-running with the same
/// input is a no-op.
pub async fn reconcile(
    chunks: &[Chunk],
    embedder: &dyn EmbeddingModel,
    store: &dyn VectorStore,
) -> Result<Vec<Chunk>> {
    let mut seen: HashSet<ChunkIdentity> = HashSet::new();
    let mut unique: Vec<(ChunkIdentity, Chunk)> = Vec::new();
    for chunk in chunks {
        let id = chunk_identity(chunk);
        if seen.insert(id.clone()) {
            unique.push((id, chunk.clone()));
        }
    }
    if unique.is_empty() {
        return Ok(Vec::new());
    }
    if unique.len() < chunks.len() {
        debug!(
            collapsed = chunks.len() - unique.len(),
            "collapsed duplicate chunks within the batch"
        );
    }

    let ids: Vec<ChunkIdentity> = unique.iter().map(|(id, _)| id.clone()).collect();
    let existing = store.exists_by_id(&ids).await?;
    let new: Vec<(ChunkIdentity, Chunk)> = unique
        .into_iter()
        .filter(|(id, _)| !existing.contains(id))
        .collect();
    if new.is_empty() {
        info!(batch = chunks.len(), "all chunks already stored");
        return Ok(Vec::new());
    }

    let texts: Vec<String> = new.iter().map(|(_, chunk)| chunk.content.clone()).collect();
    let vectors = embedder.embed_batch(&texts).await?;
    if vectors.len() != new.len() {
        return Err(Error::Embedding(format!(
            "expected {} vectors, got {}",
            new.len(),
            vectors.len()
        )));
    }

    let rows: Vec<(ChunkIdentity, Chunk, Vec<f32>)> = new
        .into_iter()
        .zip(vectors)
        .map(|((id, chunk), vector)| (id, chunk, vector))
        .collect();
    store.upsert(&rows).await?;
    info!(
        batch = chunks.len(),
        inserted = rows.len(),
        skipped = existing.len(),
        "reconciled chunk batch"
    );
    Ok(rows.into_iter().map(|(_, chunk, _)| chunk).collect())
}
