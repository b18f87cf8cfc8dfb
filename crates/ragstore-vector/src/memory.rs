//! Hash-map chunk store for tests and offline smoke runs.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use ragstore_core::traits::VectorStore;
use ragstore_core::types::{Chunk, ChunkIdentity};
use ragstore_core::{Error, Result};

/// In-memory `VectorStore` with cosine-similarity search.
///
/// Matches the durable store's contract: upserts are keyed by identity
/// and idempotent, searches return the best `k` hits with higher scores
/// first. Ties are broken by identity so results are deterministic.
#[derive(Default)]
pub struct MemoryVectorStore {
    rows: RwLock<HashMap<ChunkIdentity, (Chunk, Vec<f32>)>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        match self.rows.read() {
            Ok(rows) => rows.len(),
            Err(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn exists_by_id(&self, ids: &[ChunkIdentity]) -> Result<HashSet<ChunkIdentity>> {
        let rows = self
            .rows
            .read()
            .map_err(|_| Error::Store("store lock poisoned".to_string()))?;
        Ok(ids
            .iter()
            .filter(|id| rows.contains_key(id))
            .cloned()
            .collect())
    }

    async fn upsert(&self, new_rows: &[(ChunkIdentity, Chunk, Vec<f32>)]) -> Result<()> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| Error::Store("store lock poisoned".to_string()))?;
        for (id, chunk, vector) in new_rows {
            rows.insert(id.clone(), (chunk.clone(), vector.clone()));
        }
        Ok(())
    }

    async fn similarity_search(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<(ChunkIdentity, Chunk, f32)>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let rows = self
            .rows
            .read()
            .map_err(|_| Error::Store("store lock poisoned".to_string()))?;
        let mut hits: Vec<(ChunkIdentity, Chunk, f32)> = rows
            .iter()
            .map(|(id, (chunk, vector))| {
                (id.clone(), chunk.clone(), cosine_similarity(query, vector))
            })
            .collect();
        hits.sort_by(|a, b| {
            b.2.partial_cmp(&a.2)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.as_str().cmp(b.0.as_str()))
        });
        hits.truncate(k);
        Ok(hits)
    }
}
