use arrow::{
    array::{ArrayRef, UInt32Array},
    compute::take_record_batch,
    record_batch::RecordBatch,
    row::{RowConverter, SortField},
};
use std::collections::HashSet;
use tracing::debug;

use crate::error::Result;
use crate::process::utils::require_column;

/// Which of several rows sharing a key survives deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepPolicy {
    /// The earliest row wins ("first write wins").
    First,
    /// The latest row wins ("last write wins").
    Last,
}

/// Drop rows whose `keys` duplicate another row, keeping the one chosen by
/// `keep`. Surviving rows stay in their original relative order and nulls
/// compare equal to each other.
pub fn dedup(
    batch: &RecordBatch,
    keys: &[&str],
    keep: KeepPolicy,
    context: &str,
) -> Result<RecordBatch> {
    let key_columns: Vec<ArrayRef> = keys
        .iter()
        .map(|k| require_column(batch, k, context).map(|i| batch.column(i).clone()))
        .collect::<Result<_>>()?;

    let n = batch.num_rows();
    if n < 2 || key_columns.is_empty() {
        return Ok(batch.clone());
    }

    let converter = RowConverter::new(
        key_columns
            .iter()
            .map(|c| SortField::new(c.data_type().clone()))
            .collect(),
    )?;
    let rows = converter.convert_columns(&key_columns)?;

    let mut seen = HashSet::with_capacity(n);
    let mut keep_idx: Vec<u32> = Vec::with_capacity(n);
    match keep {
        KeepPolicy::First => {
            for i in 0..n {
                if seen.insert(rows.row(i)) {
                    keep_idx.push(i as u32);
                }
            }
        }
        KeepPolicy::Last => {
            for i in (0..n).rev() {
                if seen.insert(rows.row(i)) {
                    keep_idx.push(i as u32);
                }
            }
            keep_idx.reverse();
        }
    }

    if keep_idx.len() == n {
        return Ok(batch.clone());
    }
    debug!(context, dropped = n - keep_idx.len(), ?keep, "dropped duplicate rows");

    let indices = UInt32Array::from(keep_idx);
    take_record_batch(batch, &indices).map_err(Into::into)
}
