use arrow::record_batch::RecordBatch;

use crate::error::DataError;
use crate::process::empty_table;

/// A recoverable failure: one file or dataset that was left out while the
/// rest of the call went ahead.
#[derive(Debug)]
pub struct Skipped {
    pub item: String,
    pub error: DataError,
}

impl Skipped {
    pub fn new(item: impl Into<String>, error: DataError) -> Self {
        Self {
            item: item.into(),
            error,
        }
    }
}

/// A key-only raw table, passed through with a `dataset_name` column added.
#[derive(Debug, Clone)]
pub struct TaggedTable {
    pub dataset: String,
    pub table: RecordBatch,
}

/// Result of [`load_raw`](super::TableAssembler::load_raw).
///
/// Only datasets with value columns are pivoted into `combined`. A dataset
/// holding nothing but `mdate` and `coid` has no wide columns to join, so it
/// is returned unchanged in `passthrough` instead and never appears in
/// `combined`.
#[derive(Debug)]
pub struct RawLoad {
    /// Date-aligned wide columns of every pivoted dataset.
    pub combined: RecordBatch,
    /// Key-only datasets, in request order, each with a `dataset_name`
    /// column added. Not joined into `combined`.
    pub passthrough: Vec<TaggedTable>,
    pub skipped: Vec<Skipped>,
}

impl RawLoad {
    pub(crate) fn empty() -> Self {
        Self {
            combined: empty_table(),
            passthrough: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// True when no requested dataset produced any data.
    pub fn is_empty(&self) -> bool {
        self.combined.num_columns() == 0 && self.passthrough.is_empty()
    }

    /// Names of the datasets that were skipped.
    pub fn skipped_items(&self) -> Vec<&str> {
        self.skipped.iter().map(|s| s.item.as_str()).collect()
    }
}

/// Flags for [`get_dataset`](super::TableAssembler::get_dataset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetOptions {
    /// Concatenate every file of the dataset instead of returning the first.
    pub merge_files: bool,
    /// Keep only rows of reference (ordinary share) entities.
    pub filter_reference_entities: bool,
}

impl Default for GetOptions {
    fn default() -> Self {
        Self {
            merge_files: true,
            filter_reference_entities: false,
        }
    }
}

impl GetOptions {
    pub fn merge_files(mut self, merge: bool) -> Self {
        self.merge_files = merge;
        self
    }

    pub fn filter_reference_entities(mut self, filter: bool) -> Self {
        self.filter_reference_entities = filter;
        self
    }
}

/// Result of [`get_dataset`](super::TableAssembler::get_dataset).
#[derive(Debug)]
pub struct CuratedLoad {
    pub table: RecordBatch,
    /// Files that failed to read.
    pub skipped: Vec<Skipped>,
}

/// One first-level folder of the load root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubfolderInfo {
    pub name: String,
    pub distinct_column_count: usize,
    /// Sorted.
    pub distinct_column_names: Vec<String>,
}

/// Result of [`list_subfolders`](super::TableAssembler::list_subfolders).
#[derive(Debug)]
pub struct SubfolderScan {
    pub folders: Vec<SubfolderInfo>,
    pub skipped: Vec<Skipped>,
}
