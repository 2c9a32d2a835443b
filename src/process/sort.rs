use arrow::{
    array::{ArrayRef, UInt32Array},
    compute::{lexsort_to_indices, take_record_batch, SortColumn, SortOptions},
    record_batch::RecordBatch,
};
use std::sync::Arc;

use crate::error::Result;
use crate::process::utils::require_column;

/// Stable ascending sort by `columns`, nulls last. Rows that tie on every
/// column keep their input order, which is what makes a later keep-first
/// dedup deterministic.
pub fn stable_sort(batch: &RecordBatch, columns: &[&str], context: &str) -> Result<RecordBatch> {
    let options = SortOptions {
        descending: false,
        nulls_first: false,
    };

    let mut sort_columns = columns
        .iter()
        .map(|name| {
            require_column(batch, name, context).map(|i| SortColumn {
                values: batch.column(i).clone(),
                options: Some(options),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if batch.num_rows() < 2 || sort_columns.is_empty() {
        return Ok(batch.clone());
    }

    // row position as the final key: lexsort is not guaranteed stable
    let position: ArrayRef = Arc::new(UInt32Array::from_iter_values(0..batch.num_rows() as u32));
    sort_columns.push(SortColumn {
        values: position,
        options: Some(options),
    });

    let indices = lexsort_to_indices(&sort_columns, None)?;
    take_record_batch(batch, &indices).map_err(Into::into)
}
