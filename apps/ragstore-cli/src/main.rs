//! Command-line front end: `ragstore-cli ingest [docs_dir]` and
//! `ragstore-cli query "<text>" [docs_dir]`.

use std::env;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use indicatif::ProgressBar;
use tracing_subscriber::EnvFilter;

use ragstore_core::config::{
    expand_path, ChunkingConfig, Config, EmbeddingConfig, FusionWeights, SearchConfig, StoreConfig,
};
use ragstore_core::chunker::Chunker;
use ragstore_core::source::FsDocumentSource;
use ragstore_core::traits::DocumentSource;
use ragstore_core::types::FusedResult;
use ragstore_embed::embedder_from_config;
use ragstore_hybrid::HybridEngine;
use ragstore_vector::LanceVectorStore;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {prog} <ingest|query> [args...]");
        process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

async fn build_engine(config: &Config) -> anyhow::Result<HybridEngine<LanceVectorStore>> {
    let chunking: ChunkingConfig = config.get_or("chunking", ChunkingConfig::default());
    let weights: FusionWeights = config.get_or("fusion", FusionWeights::default());
    let search: SearchConfig = config.get_or("search", SearchConfig::default());
    let embedding: EmbeddingConfig = config.get_or("embedding", EmbeddingConfig::default());
    let store_config: StoreConfig = config.get_or("store", StoreConfig::default());

    let chunker = Chunker::new(chunking)?;
    let embedder = embedder_from_config(&embedding)?;
    let db_dir = expand_path(&store_config.db_dir);
    let store = LanceVectorStore::connect(
        &db_dir.to_string_lossy(),
        &store_config.table,
        embedding.dim,
    )
    .await
    .with_context(|| format!("opening vector store at {}", db_dir.display()))?;

    Ok(HybridEngine::new(
        chunker,
        embedder,
        Arc::new(store),
        weights,
        search,
    )?)
}

fn docs_dir(arg: Option<&String>, config: &Config) -> String {
    arg.cloned()
        .unwrap_or_else(|| config.get_or("data.docs_dir", "./data/docs".to_string()))
}

async fn ingest_dir(
    engine: &mut HybridEngine<LanceVectorStore>,
    dir: &str,
) -> anyhow::Result<ragstore_hybrid::IngestReport> {
    let documents = FsDocumentSource::new(expand_path(dir))
        .load()
        .with_context(|| format!("loading documents from {dir}"))?;
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("ingesting {} documents...", documents.len()));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let report = engine.ingest(&documents).await?;
    spinner.finish_and_clear();
    Ok(report)
}

fn print_results(results: &[FusedResult]) {
    if results.is_empty() {
        println!("No results.");
        return;
    }
    for (i, result) in results.iter().enumerate() {
        let location = match &result.chunk.page {
            Some(page) => format!("{} p.{page}", result.chunk.source),
            None => result.chunk.source.clone(),
        };
        let snippet: String = result
            .chunk
            .content
            .chars()
            .take(120)
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        println!(
            "{:>2}. [{:.4}] {location}  {snippet}",
            i + 1,
            result.fused_score
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::load().context("loading configuration")?;
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "ingest" => {
            let dir = docs_dir(args.first(), &config);
            let mut engine = build_engine(&config).await?;
            let report = ingest_dir(&mut engine, &dir).await?;
            println!(
                "Ingested {} documents from {dir}: {} chunks, {} newly stored",
                report.document_count, report.chunk_count, report.inserted_count
            );
        }
        "query" => {
            let Some(query_text) = args.first().cloned() else {
                eprintln!("Usage: ragstore-cli query \"<query>\" [docs_dir]");
                process::exit(1);
            };
            let dir = docs_dir(args.get(1), &config);
            let mut engine = build_engine(&config).await?;
            // Reconciliation makes this a cheap no-op for already-stored
            // chunks while giving the lexical signal its corpus.
            ingest_dir(&mut engine, &dir).await?;
            let results = engine.query(&query_text).await?;
            print_results(&results);
        }
        _ => {
            eprintln!("Unknown command: {cmd}");
            process::exit(1);
        }
    }
    Ok(())
}
