use thiserror::Error;

/// Failure taxonomy for ingestion and retrieval.
///
/// Every batch or query call surfaces at most one of these; partial
/// results are never returned alongside an error.
#[derive(Debug, Error)]
pub enum Error {
    /// The document source could not be read. Fatal for the ingestion run.
    #[error("document source: {0}")]
    Source(String),

    /// An embedding model call failed. Fatal for the batch containing it;
    /// the caller may retry the whole batch since upserts are idempotent.
    #[error("embedding model: {0}")]
    Embedding(String),

    /// A vector store round trip (existence check, upsert or similarity
    /// search) failed. Same batch-fatal retry contract as `Embedding`.
    #[error("vector store: {0}")]
    Store(String),

    /// The in-memory lexical index failed to build or answer a query.
    #[error("lexical index: {0}")]
    Index(String),

    /// Malformed configuration, e.g. a negative fusion weight. Rejected
    /// at construction time, never clamped.
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
