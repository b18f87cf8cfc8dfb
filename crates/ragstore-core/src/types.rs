//! Domain types used by the ingestion pipeline and both retrieval engines.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw text plus metadata as produced by a document source. Immutable
/// input to chunking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Origin of the document (relative file path or external id).
    pub source: String,
    pub raw_text: String,
    /// Free-form metadata; the `page` key, when present, is carried onto
    /// every chunk of this document.
    #[serde(default)]
    pub page_metadata: HashMap<String, String>,
}

/// A bounded text segment derived from one document; the unit of indexing
/// and retrieval.
///
/// `position_index` records reading order within the parent document. It
/// participates in overlap bookkeeping only, never in identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub source: String,
    pub page: Option<String>,
    pub content: String,
    pub position_index: usize,
}

/// Hex-encoded content digest used as the dedup and storage key.
///
/// Derived from `(source, page, content)` by [`crate::identity::chunk_identity`];
/// identical triples always yield the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkIdentity(String);

impl ChunkIdentity {
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChunkIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which retrieval signal produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Lexical,
    Semantic,
}

/// One ranked hit from a single signal. Ephemeral, produced per query.
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    pub chunk: Chunk,
    /// Engine-specific score; higher is better. Not comparable across
    /// signals, which is why fusion works on ranks instead.
    pub score: f32,
    pub signal: Signal,
    /// 1-based position within the signal's own result list.
    pub rank: usize,
}

/// Fusion output, ordered descending by `fused_score`.
#[derive(Debug, Clone)]
pub struct FusedResult {
    pub chunk: Chunk,
    pub fused_score: f32,
}
