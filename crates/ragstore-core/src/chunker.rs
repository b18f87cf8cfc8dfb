//! Recursive character chunking.
//!
//! Splits text along a fixed separator hierarchy, preferring paragraph
//! breaks over line breaks over sentence ends over spaces, and falls back
//! to per-character splitting only when nothing else fits. Adjacent
//! chunks share a configurable character overlap so context spanning a
//! boundary survives in at least one chunk.

use std::collections::VecDeque;

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::types::{Chunk, Document};

/// Separator hierarchy, tried in order. The empty string always matches
/// and splits into single characters.
const SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    /// Fails if the config is invalid (zero size, or overlap >= size).
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Splits every document into ordered chunks. The `page` metadata
    /// key, when present, is carried onto each chunk; `position_index`
    /// numbers chunks within their parent document starting at zero.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for document in documents {
            let page = document.page_metadata.get("page").cloned();
            for (position_index, content) in self.split_text(&document.raw_text).into_iter().enumerate()
            {
                chunks.push(Chunk {
                    source: document.source.clone(),
                    page: page.clone(),
                    content,
                    position_index,
                });
            }
        }
        chunks
    }

    /// Splits one text into chunks of at most `chunk_size` characters.
    /// Whitespace-only output is dropped, so blank input yields nothing.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let chunk_size = self.config.chunk_size;

        // First separator actually present in the text wins; the empty
        // separator is a universal fallback.
        let mut separator = "";
        let mut remaining: &[&str] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() || text.contains(sep) {
                separator = sep;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut final_chunks = Vec::new();
        let mut good: Vec<String> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if piece.chars().count() < chunk_size {
                good.push(piece);
            } else {
                // Flush what fits before handling the oversize piece so
                // output order matches reading order.
                if !good.is_empty() {
                    final_chunks.extend(self.merge_pieces(&mut good));
                }
                if remaining.is_empty() {
                    final_chunks.push(piece);
                } else {
                    final_chunks.extend(self.split_recursive(&piece, remaining));
                }
            }
        }
        if !good.is_empty() {
            final_chunks.extend(self.merge_pieces(&mut good));
        }
        final_chunks
    }

    /// Greedily packs pieces into chunks of at most `chunk_size`
    /// characters, retaining a trailing window of at most
    /// `chunk_overlap` characters between consecutive chunks.
    fn merge_pieces(&self, pieces: &mut Vec<String>) -> Vec<String> {
        let chunk_size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut out = Vec::new();
        let mut window: VecDeque<(String, usize)> = VecDeque::new();
        let mut total = 0usize;
        for piece in pieces.drain(..) {
            let len = piece.chars().count();
            if total + len > chunk_size && !window.is_empty() {
                if let Some(doc) = join_window(&window) {
                    out.push(doc);
                }
                // Shrink the window to the overlap budget, and further if
                // the incoming piece still would not fit.
                while total > overlap || (total + len > chunk_size && total > 0) {
                    match window.pop_front() {
                        Some((_, front_len)) => total -= front_len,
                        None => break,
                    }
                }
            }
            total += len;
            window.push_back((piece, len));
        }
        if let Some(doc) = join_window(&window) {
            out.push(doc);
        }
        out
    }
}

/// Splits on `separator`, keeping each separator attached to the start of
/// the piece that follows it. An empty separator splits into characters.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }
    let mut pieces = Vec::new();
    let mut prev = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > prev {
            pieces.push(text[prev..idx].to_string());
            prev = idx;
        }
    }
    if prev < text.len() {
        pieces.push(text[prev..].to_string());
    }
    pieces
}

fn join_window(window: &VecDeque<(String, usize)>) -> Option<String> {
    let joined: String = window.iter().map(|(piece, _)| piece.as_str()).collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
