//! Domain types, collaborator traits and ingestion primitives shared by
//! the lexical, vector and hybrid engines. See `chunker` and `identity`
//! for the content-addressed ingestion building blocks.

pub mod chunker;
pub mod config;
pub mod error;
pub mod identity;
pub mod source;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
