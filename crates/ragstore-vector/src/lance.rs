//! LanceDB-backed chunk store.

use std::collections::HashSet;
use std::sync::Arc;

use arrow_array::{
    Array, FixedSizeListArray, Float32Array, Int32Array, RecordBatch, RecordBatchIterator,
    StringArray, TimestampMillisecondArray,
};
use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection};
use tracing::debug;

use ragstore_core::traits::VectorStore;
use ragstore_core::types::{Chunk, ChunkIdentity};
use ragstore_core::{Error, Result};

use crate::schema::chunk_schema;

/// Chunk store persisted in a LanceDB table.
///
/// Rows are keyed by the chunk identity digest; writes go through
/// `merge_insert` so re-upserting an existing id replaces the row instead
/// of duplicating it.
pub struct LanceVectorStore {
    db: Connection,
    table_name: String,
    dim: usize,
}

impl LanceVectorStore {
    /// Connects to (or creates) the database at `uri` and ensures the
    /// chunk table exists with the expected schema.
    pub async fn connect(uri: &str, table_name: &str, dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::Config("embedding dim must be positive".to_string()));
        }
        let db = connect(uri).execute().await.map_err(store_err)?;
        let store = Self {
            db,
            table_name: table_name.to_string(),
            dim,
        };
        store.ensure_table().await?;
        Ok(store)
    }

    async fn ensure_table(&self) -> Result<()> {
        let names = self.db.table_names().execute().await.map_err(store_err)?;
        if names.contains(&self.table_name) {
            return Ok(());
        }
        let schema = chunk_schema(self.dim_i32());
        let iter = RecordBatchIterator::new(vec![].into_iter(), schema);
        self.db
            .create_table(&self.table_name, Box::new(iter))
            .execute()
            .await
            .map_err(store_err)?;
        debug!(table = %self.table_name, "created chunk table");
        Ok(())
    }

    fn dim_i32(&self) -> i32 {
        i32::try_from(self.dim).unwrap_or(i32::MAX)
    }

    fn rows_to_record_batch(&self, rows: &[(ChunkIdentity, Chunk, Vec<f32>)]) -> Result<RecordBatch> {
        let schema = chunk_schema(self.dim_i32());
        let mut ids = Vec::with_capacity(rows.len());
        let mut sources = Vec::with_capacity(rows.len());
        let mut pages: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut contents = Vec::with_capacity(rows.len());
        let mut positions = Vec::with_capacity(rows.len());
        let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(rows.len());
        let now = Utc::now().timestamp_millis();
        for (id, chunk, vector) in rows {
            if vector.len() != self.dim {
                return Err(Error::Embedding(format!(
                    "vector dim mismatch: got {}, expected {}",
                    vector.len(),
                    self.dim
                )));
            }
            ids.push(id.as_str().to_string());
            sources.push(chunk.source.clone());
            pages.push(chunk.page.clone());
            contents.push(chunk.content.clone());
            positions.push(i32::try_from(chunk.position_index).unwrap_or(i32::MAX));
            vectors.push(Some(vector.iter().map(|&x| Some(x)).collect()));
        }
        let times = vec![now; rows.len()];
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(ids)),
                Arc::new(StringArray::from(sources)),
                Arc::new(StringArray::from(pages)),
                Arc::new(StringArray::from(contents)),
                Arc::new(Int32Array::from(positions)),
                Arc::new(TimestampMillisecondArray::from(times)),
                Arc::new(FixedSizeListArray::from_iter_primitive::<
                    arrow_array::types::Float32Type,
                    _,
                    _,
                >(vectors.into_iter(), self.dim_i32())),
            ],
        )
        .map_err(store_err)
    }
}

#[async_trait]
impl VectorStore for LanceVectorStore {
    async fn exists_by_id(&self, ids: &[ChunkIdentity]) -> Result<HashSet<ChunkIdentity>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let table = self
            .db
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(store_err)?;
        let id_list = ids
            .iter()
            .map(|id| format!("'{}'", id.as_str().replace('\'', "''")))
            .collect::<Vec<_>>()
            .join(",");
        let filter = format!("id IN ({id_list})");
        let mut stream = table
            .query()
            .only_if(filter)
            .execute()
            .await
            .map_err(store_err)?;
        let mut present = HashSet::new();
        while let Some(batch) = stream.try_next().await.map_err(store_err)? {
            let id_col = string_column(&batch, "id")?;
            for i in 0..batch.num_rows() {
                present.insert(ChunkIdentity::from_hex(id_col.value(i)));
            }
        }
        Ok(present)
    }

    async fn upsert(&self, rows: &[(ChunkIdentity, Chunk, Vec<f32>)]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let record_batch = self.rows_to_record_batch(rows)?;
        let schema = record_batch.schema();
        let reader = Box::new(RecordBatchIterator::new(
            vec![Ok(record_batch)].into_iter(),
            schema,
        ));
        let table = self
            .db
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(store_err)?;
        let mut merge = table.merge_insert(&["id"]);
        merge
            .when_matched_update_all(None)
            .when_not_matched_insert_all();
        merge.execute(reader).await.map_err(store_err)?;
        debug!(rows = rows.len(), table = %self.table_name, "upserted chunk rows");
        Ok(())
    }

    async fn similarity_search(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<(ChunkIdentity, Chunk, f32)>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dim {
            return Err(Error::Embedding(format!(
                "query dim mismatch: got {}, expected {}",
                query.len(),
                self.dim
            )));
        }
        let table = self
            .db
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(store_err)?;
        let mut stream = table
            .vector_search(query.to_vec())
            .map_err(store_err)?
            .limit(k)
            .execute()
            .await
            .map_err(store_err)?;
        let mut hits = Vec::new();
        while let Some(batch) = stream.try_next().await.map_err(store_err)? {
            let id_col = string_column(&batch, "id")?;
            let source_col = string_column(&batch, "source")?;
            let page_col = string_column(&batch, "page")?;
            let content_col = string_column(&batch, "content")?;
            let position_col = batch
                .column_by_name("position_index")
                .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
                .ok_or_else(|| Error::Store("column 'position_index' missing".to_string()))?;
            let distance_col = batch
                .column_by_name("_distance")
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
                .ok_or_else(|| Error::Store("column '_distance' missing".to_string()))?;
            for i in 0..batch.num_rows() {
                let page = if page_col.is_null(i) {
                    None
                } else {
                    Some(page_col.value(i).to_string())
                };
                let chunk = Chunk {
                    source: source_col.value(i).to_string(),
                    page,
                    content: content_col.value(i).to_string(),
                    position_index: usize::try_from(position_col.value(i)).unwrap_or(0),
                };
                // Lance reports L2 distance; flip it so higher is better.
                let score = 1.0 - distance_col.value(i);
                hits.push((ChunkIdentity::from_hex(id_col.value(i)), chunk, score));
            }
        }
        Ok(hits)
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| Error::Store(format!("column '{name}' missing or not utf8")))
}

fn store_err(e: impl std::fmt::Display) -> Error {
    Error::Store(e.to_string())
}
