use std::collections::HashMap;
use std::sync::Arc;

use ragstore_core::chunker::Chunker;
use ragstore_core::config::{ChunkingConfig, FusionWeights, SearchConfig};
use ragstore_core::types::Document;
use ragstore_embed::FakeEmbedder;
use ragstore_hybrid::HybridEngine;
use ragstore_vector::MemoryVectorStore;

const DIM: usize = 64;

fn document(source: &str, text: &str) -> Document {
    Document {
        source: source.to_string(),
        raw_text: text.to_string(),
        page_metadata: HashMap::new(),
    }
}

fn engine() -> HybridEngine<MemoryVectorStore> {
    let chunker = Chunker::new(ChunkingConfig::default()).expect("chunker");
    HybridEngine::new(
        chunker,
        Arc::new(FakeEmbedder::new(DIM)),
        Arc::new(MemoryVectorStore::new()),
        FusionWeights::default(),
        SearchConfig::default(),
    )
    .expect("engine")
}

fn corpus() -> Vec<Document> {
    vec![
        document(
            "garden.txt",
            "Crop rotation keeps garden soil healthy across growing seasons.",
        ),
        document(
            "energy.txt",
            "Solar panel tilt angle changes the winter energy yield.",
        ),
        document(
            "water.txt",
            "Rainwater barrels overflow without a diverter valve installed.",
        ),
    ]
}

#[tokio::test]
async fn ingest_reports_counts_and_is_idempotent() {
    let mut engine = engine();
    let documents = corpus();

    let first = engine.ingest(&documents).await.expect("first ingest");
    assert_eq!(first.document_count, 3);
    assert_eq!(first.chunk_count, 3);
    assert_eq!(first.inserted_count, 3);

    let second = engine.ingest(&documents).await.expect("second ingest");
    assert_eq!(second.chunk_count, 3);
    assert_eq!(second.inserted_count, 0);
}

#[tokio::test]
async fn query_surfaces_the_relevant_chunk_first() {
    let mut engine = engine();
    engine.ingest(&corpus()).await.expect("ingest");

    let results = engine
        .query("solar panel tilt angle")
        .await
        .expect("query");
    assert!(!results.is_empty());
    assert!(results[0].chunk.content.contains("Solar panel"));
    for pair in results.windows(2) {
        assert!(pair[0].fused_score >= pair[1].fused_score);
    }
}

#[tokio::test]
async fn fused_results_contain_no_duplicate_chunks() {
    let mut engine = engine();
    engine.ingest(&corpus()).await.expect("ingest");

    let results = engine.query("garden soil seasons").await.expect("query");
    let mut contents: Vec<&str> = results.iter().map(|r| r.chunk.content.as_str()).collect();
    contents.sort_unstable();
    contents.dedup();
    assert_eq!(contents.len(), results.len());
}

#[tokio::test]
async fn blank_query_yields_nothing() {
    let mut engine = engine();
    engine.ingest(&corpus()).await.expect("ingest");
    assert!(engine.query("   ").await.expect("query").is_empty());
}

#[tokio::test]
async fn query_before_ingest_falls_back_to_semantic_only() {
    let engine = engine();
    let results = engine.query("anything at all").await.expect("query");
    assert!(results.is_empty());
}

#[tokio::test]
async fn reingesting_a_subset_still_answers_over_that_subset() {
    let mut engine = engine();
    engine.ingest(&corpus()).await.expect("full ingest");

    let subset = vec![document(
        "energy.txt",
        "Solar panel tilt angle changes the winter energy yield.",
    )];
    let report = engine.ingest(&subset).await.expect("subset ingest");
    assert_eq!(report.inserted_count, 0);

    let results = engine
        .query("solar panel tilt angle")
        .await
        .expect("query");
    assert!(results[0].chunk.content.contains("Solar panel"));
}
