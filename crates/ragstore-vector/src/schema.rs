use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema, TimeUnit};

/// Arrow schema for the chunk table. `id` is the content digest and the
/// merge key; `page` is nullable because most sources carry no page.
pub fn chunk_schema(dim: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("source", DataType::Utf8, false),
        Field::new("page", DataType::Utf8, true),
        Field::new("content", DataType::Utf8, false),
        Field::new("position_index", DataType::Int32, false),
        Field::new(
            "ingested_at",
            DataType::Timestamp(TimeUnit::Millisecond, None),
            false,
        ),
        Field::new(
            "vector",
            DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim),
            true,
        ),
    ]))
}
