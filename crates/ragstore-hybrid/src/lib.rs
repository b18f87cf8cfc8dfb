//! Hybrid retrieval: content-addressed ingestion into the vector store
//! plus a per-run lexical index, with rank fusion across both signals at
//! query time.

pub mod engine;
pub mod fusion;
pub mod reconcile;

pub use engine::{HybridEngine, IngestReport};
pub use fusion::fuse;
pub use reconcile::reconcile;
