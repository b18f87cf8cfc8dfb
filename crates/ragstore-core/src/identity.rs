//! Stable content-addressed chunk identity.

use crate::types::{Chunk, ChunkIdentity};

// Tag bytes keeping an absent page distinct from any literal page string,
// so ("a", Some("1")) and ("a:1", None) can never collapse.
const PAGE_ABSENT: [u8; 1] = [0];
const PAGE_PRESENT: [u8; 1] = [1];

/// Derives the identity digest for a chunk from `(source, page, content)`.
///
/// Deterministic: identical triples always hash identically.
/// `position_index` is deliberately excluded so the same passage produced
/// by a different chunking run keeps its identity. Each field is
/// length-prefixed before hashing, so no field content can be confused
/// with a delimiter or with a neighboring field.
pub fn chunk_identity(chunk: &Chunk) -> ChunkIdentity {
    let mut hasher = blake3::Hasher::new();
    update_field(&mut hasher, &chunk.source);
    match &chunk.page {
        Some(page) => {
            hasher.update(&PAGE_PRESENT);
            update_field(&mut hasher, page);
        }
        None => {
            hasher.update(&PAGE_ABSENT);
        }
    }
    update_field(&mut hasher, &chunk.content);
    ChunkIdentity::from_hex(hasher.finalize().to_hex().to_string())
}

fn update_field(hasher: &mut blake3::Hasher, field: &str) {
    hasher.update(&(field.len() as u64).to_le_bytes());
    hasher.update(field.as_bytes());
}
