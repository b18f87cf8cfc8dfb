//! Embedding model implementations.
//!
//! `RemoteEmbedder` talks to an HTTP service speaking the OpenAI
//! embeddings protocol; `FakeEmbedder` is a deterministic local stand-in
//! for tests and offline runs. `embedder_from_config` picks one from the
//! embedding config block.

pub mod fake;
pub mod remote;

use std::sync::Arc;

use ragstore_core::config::{EmbeddingConfig, EmbeddingProvider};
use ragstore_core::traits::EmbeddingModel;
use ragstore_core::Result;

pub use fake::FakeEmbedder;
pub use remote::RemoteEmbedder;

pub fn embedder_from_config(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingModel>> {
    config.validate()?;
    match config.provider {
        EmbeddingProvider::Fake => Ok(Arc::new(FakeEmbedder::new(config.dim))),
        EmbeddingProvider::Remote => Ok(Arc::new(RemoteEmbedder::new(config)?)),
    }
}
