//! RAM-resident BM25 index over one corpus of chunks.

use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::Value;
use tantivy::{doc, Index, IndexReader, TantivyDocument};

use ragstore_core::identity::chunk_identity;
use ragstore_core::types::{Chunk, RetrievalResult, Signal};
use ragstore_core::{Error, Result};

use crate::tantivy_utils::{build_schema, register_tokenizer};

const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Lexical retrieval over the chunks of a single ingestion run.
///
/// Built once per run and then immutable. Queries are infallible with
/// respect to user input: unparsable query fragments are dropped rather
/// than rejected, and a blank query or `k == 0` yields an empty list.
pub struct LexicalIndex {
    index: Index,
    reader: IndexReader,
    source_field: tantivy::schema::Field,
    page_field: tantivy::schema::Field,
    content_field: tantivy::schema::Field,
    position_field: tantivy::schema::Field,
}

impl LexicalIndex {
    pub fn build(chunks: &[Chunk]) -> Result<Self> {
        let schema = build_schema();
        let index = Index::create_in_ram(schema.clone());
        register_tokenizer(&index);

        let id_field = schema.get_field("id").map_err(index_err)?;
        let source_field = schema.get_field("source").map_err(index_err)?;
        let page_field = schema.get_field("page").map_err(index_err)?;
        let content_field = schema.get_field("content").map_err(index_err)?;
        let position_field = schema.get_field("position_index").map_err(index_err)?;

        let mut writer = index.writer(WRITER_HEAP_BYTES).map_err(index_err)?;
        for chunk in chunks {
            let id = chunk_identity(chunk);
            let document = match &chunk.page {
                Some(page) => doc!(
                    id_field => id.as_str(),
                    source_field => chunk.source.clone(),
                    page_field => page.clone(),
                    content_field => chunk.content.clone(),
                    position_field => chunk.position_index as u64,
                ),
                None => doc!(
                    id_field => id.as_str(),
                    source_field => chunk.source.clone(),
                    content_field => chunk.content.clone(),
                    position_field => chunk.position_index as u64,
                ),
            };
            writer.add_document(document).map_err(index_err)?;
        }
        writer.commit().map_err(index_err)?;
        let reader = index.reader().map_err(index_err)?;

        Ok(Self {
            index,
            reader,
            source_field,
            page_field,
            content_field,
            position_field,
        })
    }

    /// Returns up to `k` chunks ranked by BM25 score, best first, with
    /// 1-based ranks.
    pub fn search(&self, query_text: &str, k: usize) -> Result<Vec<RetrievalResult>> {
        if k == 0 || query_text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();
        let query_parser = QueryParser::for_index(&self.index, vec![self.content_field]);
        let (query, parse_errors) = query_parser.parse_query_lenient(query_text);
        if !parse_errors.is_empty() {
            tracing::debug!(?parse_errors, "dropped unparsable query fragments");
        }
        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(k))
            .map_err(index_err)?;

        let mut results = Vec::with_capacity(top_docs.len());
        for (rank0, (score, address)) in top_docs.into_iter().enumerate() {
            let document: TantivyDocument = searcher.doc(address).map_err(index_err)?;
            results.push(RetrievalResult {
                chunk: self.chunk_from_doc(&document)?,
                score,
                signal: Signal::Lexical,
                rank: rank0 + 1,
            });
        }
        Ok(results)
    }

    fn chunk_from_doc(&self, document: &TantivyDocument) -> Result<Chunk> {
        let text = |field| {
            document
                .get_first(field)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };
        let source = text(self.source_field)
            .ok_or_else(|| Error::Index("stored document missing source".to_string()))?;
        let content = text(self.content_field)
            .ok_or_else(|| Error::Index("stored document missing content".to_string()))?;
        let page = text(self.page_field);
        let position_index = document
            .get_first(self.position_field)
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as usize;
        Ok(Chunk {
            source,
            page,
            content,
            position_index,
        })
    }
}

fn index_err(e: impl std::fmt::Display) -> Error {
    Error::Index(e.to_string())
}
