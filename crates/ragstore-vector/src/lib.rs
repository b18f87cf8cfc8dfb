//! Durable chunk storage implementations of the `VectorStore` trait.
//!
//! `LanceVectorStore` persists chunks and their embeddings in LanceDB and
//! is the production backend. `MemoryVectorStore` keeps everything in a
//! hash map and exists for tests and offline smoke runs.

pub mod lance;
pub mod memory;
mod schema;

pub use lance::LanceVectorStore;
pub use memory::MemoryVectorStore;
