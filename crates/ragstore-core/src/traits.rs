//! Collaborator traits at the seams of the pipeline. Implementations live
//! in the `ragstore-embed` and `ragstore-vector` crates; tests substitute
//! in-memory fakes.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Chunk, ChunkIdentity, Document};

/// Produces the documents for one ingestion run.
pub trait DocumentSource {
    fn load(&self) -> Result<Vec<Document>>;
}

/// Maps text to fixed-dimension vectors.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Dimension of every vector this model produces.
    fn dim(&self) -> usize;

    /// Embeds a batch of texts, preserving order. Returns exactly one
    /// vector per input text or an error for the whole batch.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Durable chunk storage with similarity search.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Returns the subset of `ids` already present in the store. One
    /// round trip regardless of batch size.
    async fn exists_by_id(&self, ids: &[ChunkIdentity]) -> Result<HashSet<ChunkIdentity>>;

    /// Inserts or replaces rows keyed by identity. Idempotent: upserting
    /// a row that already exists leaves exactly one copy behind, so a
    /// failed batch can be retried wholesale.
    async fn upsert(&self, rows: &[(ChunkIdentity, Chunk, Vec<f32>)]) -> Result<()>;

    /// Returns up to `k` stored chunks nearest to `query`, best first,
    /// with a similarity score where higher is better.
    async fn similarity_search(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<(ChunkIdentity, Chunk, f32)>>;
}
