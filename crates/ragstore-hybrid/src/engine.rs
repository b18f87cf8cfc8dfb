//! Ingestion and query facade over the chunker, the embedder, the vector
//! store and the per-run lexical index.

use std::sync::Arc;

use tracing::{info, instrument};

use ragstore_core::chunker::Chunker;
use ragstore_core::config::{FusionWeights, SearchConfig};
use ragstore_core::traits::{EmbeddingModel, VectorStore};
use ragstore_core::types::{Document, FusedResult, RetrievalResult, Signal};
use ragstore_core::{Error, Result};
use ragstore_text::LexicalIndex;

use crate::fusion::fuse;
use crate::reconcile::reconcile;

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Copy)]
pub struct IngestReport {
    pub document_count: usize,
    pub chunk_count: usize,
    /// Chunks actually written; the rest were already stored.
    pub inserted_count: usize,
}

/// Hybrid retrieval engine.
///
/// `ingest` chunks documents, reconciles them against the vector store
/// and rebuilds the lexical index over the run's chunks. `query` fans
/// out to both signals concurrently and fuses their rankings. Queries
/// issued before any ingestion fall back to the semantic signal alone,
/// since the lexical index only covers the current run.
pub struct HybridEngine<S: VectorStore + 'static> {
    chunker: Chunker,
    embedder: Arc<dyn EmbeddingModel>,
    store: Arc<S>,
    weights: FusionWeights,
    k: usize,
    lexical: Option<Arc<LexicalIndex>>,
}

impl<S: VectorStore + 'static> HybridEngine<S> {
    pub fn new(
        chunker: Chunker,
        embedder: Arc<dyn EmbeddingModel>,
        store: Arc<S>,
        weights: FusionWeights,
        search: SearchConfig,
    ) -> Result<Self> {
        weights.validate()?;
        Ok(Self {
            chunker,
            embedder,
            store,
            weights,
            k: search.k,
            lexical: None,
        })
    }

    #[instrument(skip_all, fields(documents = documents.len()))]
    pub async fn ingest(&mut self, documents: &[Document]) -> Result<IngestReport> {
        let chunks = self.chunker.split_documents(documents);
        let inserted = reconcile(&chunks, self.embedder.as_ref(), self.store.as_ref()).await?;
        self.lexical = Some(Arc::new(LexicalIndex::build(&chunks)?));
        let report = IngestReport {
            document_count: documents.len(),
            chunk_count: chunks.len(),
            inserted_count: inserted.len(),
        };
        info!(
            chunks = report.chunk_count,
            inserted = report.inserted_count,
            "ingestion run complete"
        );
        Ok(report)
    }

    #[instrument(skip_all)]
    pub async fn query(&self, query_text: &str) -> Result<Vec<FusedResult>> {
        if query_text.trim().is_empty() || self.k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self
            .embedder
            .embed_batch(&[query_text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("empty embedding response".to_string()))?;

        // Lexical search is CPU-bound, so it runs on the blocking pool
        // while the semantic search awaits the store.
        let lexical_task = {
            let index = self.lexical.clone();
            let query = query_text.to_string();
            let k = self.k;
            tokio::task::spawn_blocking(move || match index {
                Some(index) => index.search(&query, k),
                None => Ok(Vec::new()),
            })
        };
        let semantic_task = self.store.similarity_search(&query_vector, self.k);

        let (lexical_joined, semantic_rows) = tokio::join!(lexical_task, semantic_task);
        let lexical_results = lexical_joined.map_err(|e| Error::Index(e.to_string()))??;
        let semantic_results: Vec<RetrievalResult> = semantic_rows?
            .into_iter()
            .enumerate()
            .map(|(i, (_, chunk, score))| RetrievalResult {
                chunk,
                score,
                signal: Signal::Semantic,
                rank: i + 1,
            })
            .collect();

        fuse(&lexical_results, &semantic_results, self.weights, self.k)
    }
}
