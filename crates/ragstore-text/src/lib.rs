//! In-memory lexical retrieval over chunks, backed by Tantivy's BM25
//! scoring. The index is rebuilt per ingestion run and queried alongside
//! the vector store during hybrid retrieval.

pub mod index;
mod tantivy_utils;

pub use index::LexicalIndex;
