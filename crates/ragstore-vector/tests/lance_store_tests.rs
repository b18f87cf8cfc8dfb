use ragstore_core::identity::chunk_identity;
use ragstore_core::traits::VectorStore;
use ragstore_core::types::{Chunk, ChunkIdentity};
use ragstore_vector::LanceVectorStore;
use tempfile::TempDir;

const DIM: usize = 4;

fn row(source: &str, content: &str, vector: Vec<f32>) -> (ChunkIdentity, Chunk, Vec<f32>) {
    let chunk = Chunk {
        source: source.to_string(),
        page: None,
        content: content.to_string(),
        position_index: 0,
    };
    (chunk_identity(&chunk), chunk, vector)
}

async fn open_store(dir: &TempDir) -> LanceVectorStore {
    LanceVectorStore::connect(&dir.path().to_string_lossy(), "chunks", DIM)
        .await
        .expect("connect")
}

#[tokio::test]
async fn upsert_then_exists_round_trips() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir).await;

    let stored = row("a.txt", "stored chunk", vec![1.0, 0.0, 0.0, 0.0]);
    let absent = row("a.txt", "absent chunk", vec![0.0, 1.0, 0.0, 0.0]);
    store.upsert(&[stored.clone()]).await.expect("upsert");

    let present = store
        .exists_by_id(&[stored.0.clone(), absent.0.clone()])
        .await
        .expect("exists");
    assert!(present.contains(&stored.0));
    assert!(!present.contains(&absent.0));
}

#[tokio::test]
async fn repeated_upsert_keeps_one_row() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir).await;

    let r = row("a.txt", "the chunk", vec![1.0, 0.0, 0.0, 0.0]);
    store.upsert(&[r.clone()]).await.expect("first upsert");
    store.upsert(&[r.clone()]).await.expect("second upsert");

    let hits = store
        .similarity_search(&[1.0, 0.0, 0.0, 0.0], 10)
        .await
        .expect("search");
    let matching: Vec<_> = hits.iter().filter(|(id, _, _)| *id == r.0).collect();
    assert_eq!(matching.len(), 1);
}

#[tokio::test]
async fn similarity_search_returns_nearest_first() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir).await;

    store
        .upsert(&[
            row("a.txt", "east", vec![1.0, 0.0, 0.0, 0.0]),
            row("a.txt", "north", vec![0.0, 1.0, 0.0, 0.0]),
            row("a.txt", "up", vec![0.0, 0.0, 1.0, 0.0]),
        ])
        .await
        .expect("upsert");

    let hits = store
        .similarity_search(&[0.9, 0.1, 0.0, 0.0], 2)
        .await
        .expect("search");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].1.content, "east");
    assert!(hits[0].2 >= hits[1].2);
}

#[tokio::test]
async fn page_column_round_trips() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir).await;

    let paged = Chunk {
        source: "paged.txt".to_string(),
        page: Some("12".to_string()),
        content: "a paged chunk".to_string(),
        position_index: 3,
    };
    let id = chunk_identity(&paged);
    store
        .upsert(&[(id.clone(), paged.clone(), vec![1.0, 0.0, 0.0, 0.0])])
        .await
        .expect("upsert");

    let hits = store
        .similarity_search(&[1.0, 0.0, 0.0, 0.0], 1)
        .await
        .expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0, id);
    assert_eq!(hits[0].1, paged);
}

#[tokio::test]
async fn dim_mismatch_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir).await;

    let bad = row("a.txt", "short vector", vec![1.0, 0.0]);
    assert!(store.upsert(&[bad]).await.is_err());
    assert!(store.similarity_search(&[1.0, 0.0], 5).await.is_err());
}
