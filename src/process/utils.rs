use arrow::{
    array::{Array, ArrayRef, AsArray, StringArray},
    compute::cast,
    datatypes::DataType,
    record_batch::RecordBatch,
};
use std::sync::Arc;

use crate::error::{DataError, Result};

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

/// Index of `name` in `batch`, or a schema error mentioning `context`.
pub fn require_column(batch: &RecordBatch, name: &str, context: &str) -> Result<usize> {
    batch
        .schema()
        .index_of(name)
        .map_err(|_| DataError::schema(context, name))
}

/// Render any column as text so it can be used as a hashable key or compared
/// against a set of identifiers.
pub fn column_as_strings(col: &ArrayRef) -> Result<StringArray> {
    if let Some(s) = col.as_string_opt::<i32>() {
        return Ok(s.clone());
    }
    let casted = cast(col.as_ref(), &DataType::Utf8)?;
    Ok(casted.as_string::<i32>().clone())
}

/// Swap the column at `idx` for `array`, keeping the field's name and metadata.
pub fn replace_column(batch: &RecordBatch, idx: usize, array: ArrayRef) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<_> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    fields[idx] = fields[idx]
        .clone()
        .with_data_type(array.data_type().clone())
        .with_nullable(fields[idx].is_nullable() || array.null_count() > 0);

    let mut columns = batch.columns().to_vec();
    columns[idx] = array;

    let schema = arrow::datatypes::Schema::new_with_metadata(fields, schema.metadata().clone());
    RecordBatch::try_new(Arc::new(schema), columns).map_err(Into::into)
}
