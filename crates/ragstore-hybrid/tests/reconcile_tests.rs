use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ragstore_core::traits::{EmbeddingModel, VectorStore};
use ragstore_core::types::{Chunk, ChunkIdentity};
use ragstore_core::Result;
use ragstore_embed::FakeEmbedder;
use ragstore_hybrid::reconcile;
use ragstore_vector::MemoryVectorStore;

const DIM: usize = 8;

fn chunk(source: &str, content: &str, position_index: usize) -> Chunk {
    Chunk {
        source: source.to_string(),
        page: None,
        content: content.to_string(),
        position_index,
    }
}

/// Store wrapper that counts round trips.
struct CountingStore {
    inner: MemoryVectorStore,
    exists_calls: AtomicUsize,
    upsert_calls: AtomicUsize,
    upserted_rows: AtomicUsize,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: MemoryVectorStore::new(),
            exists_calls: AtomicUsize::new(0),
            upsert_calls: AtomicUsize::new(0),
            upserted_rows: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl VectorStore for CountingStore {
    async fn exists_by_id(&self, ids: &[ChunkIdentity]) -> Result<HashSet<ChunkIdentity>> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.exists_by_id(ids).await
    }

    async fn upsert(&self, rows: &[(ChunkIdentity, Chunk, Vec<f32>)]) -> Result<()> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.upserted_rows.fetch_add(rows.len(), Ordering::SeqCst);
        self.inner.upsert(rows).await
    }

    async fn similarity_search(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<(ChunkIdentity, Chunk, f32)>> {
        self.inner.similarity_search(query, k).await
    }
}

/// Embedder wrapper that counts texts embedded.
struct CountingEmbedder {
    inner: FakeEmbedder,
    embedded_texts: AtomicUsize,
}

impl CountingEmbedder {
    fn new() -> Self {
        Self {
            inner: FakeEmbedder::new(DIM),
            embedded_texts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EmbeddingModel for CountingEmbedder {
    fn dim(&self) -> usize {
        self.inner.dim()
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.embedded_texts.fetch_add(texts.len(), Ordering::SeqCst);
        self.inner.embed_batch(texts).await
    }
}

#[tokio::test]
async fn inserts_every_new_chunk_once() {
    let store = CountingStore::new();
    let embedder = CountingEmbedder::new();
    let chunks = vec![
        chunk("a.txt", "first passage", 0),
        chunk("a.txt", "second passage", 1),
    ];

    let inserted = reconcile(&chunks, &embedder, &store).await.expect("reconcile");
    assert_eq!(inserted.len(), 2);
    assert_eq!(store.exists_calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.upsert_calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.upserted_rows.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn rerun_inserts_nothing_and_skips_the_embedder() {
    let store = CountingStore::new();
    let embedder = CountingEmbedder::new();
    let chunks = vec![chunk("a.txt", "a passage", 0)];

    reconcile(&chunks, &embedder, &store).await.expect("first run");
    let inserted = reconcile(&chunks, &embedder, &store)
        .await
        .expect("second run");

    assert!(inserted.is_empty());
    assert_eq!(store.inner.len(), 1);
    // Second run: one existence check, no upsert, no embedding work.
    assert_eq!(store.exists_calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.upsert_calls.load(Ordering::SeqCst), 1);
    assert_eq!(embedder.embedded_texts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn duplicates_within_the_batch_collapse_to_first_occurrence() {
    let store = CountingStore::new();
    let embedder = CountingEmbedder::new();
    // position_index differs but identity does not.
    let chunks = vec![
        chunk("a.txt", "repeated passage", 0),
        chunk("a.txt", "repeated passage", 5),
        chunk("a.txt", "distinct passage", 1),
    ];

    let inserted = reconcile(&chunks, &embedder, &store).await.expect("reconcile");
    assert_eq!(inserted.len(), 2);
    assert_eq!(inserted[0].position_index, 0);
    assert_eq!(embedder.embedded_texts.load(Ordering::SeqCst), 2);
    assert_eq!(store.inner.len(), 2);
}

#[tokio::test]
async fn empty_batch_touches_nothing() {
    let store = CountingStore::new();
    let embedder = CountingEmbedder::new();

    let inserted = reconcile(&[], &embedder, &store).await.expect("reconcile");
    assert!(inserted.is_empty());
    assert_eq!(store.exists_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.upsert_calls.load(Ordering::SeqCst), 0);
    assert_eq!(embedder.embedded_texts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn only_unseen_chunks_are_embedded_on_a_partial_overlap() {
    let store = CountingStore::new();
    let embedder = CountingEmbedder::new();

    reconcile(&[chunk("a.txt", "old passage", 0)], &embedder, &store)
        .await
        .expect("seed run");
    let inserted = reconcile(
        &[
            chunk("a.txt", "old passage", 0),
            chunk("a.txt", "new passage", 1),
        ],
        &embedder,
        &store,
    )
    .await
    .expect("overlap run");

    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].content, "new passage");
    assert_eq!(embedder.embedded_texts.load(Ordering::SeqCst), 2);
    assert_eq!(store.inner.len(), 2);
}
