// src/store/mod.rs

use arrow::{
    compute::concat_batches,
    datatypes::SchemaRef,
    record_batch::RecordBatch,
};
use glob::{glob, Pattern};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::{
    fs::{self, File},
    path::Path,
};
use tracing::{debug, trace};

use crate::error::{DataError, Result};

/// Extension of the columnar files the store recognizes.
pub const DATA_FILE_EXTENSION: &str = "parquet";

/// The file-store collaborator: list entries under a directory and read a
/// table at a path. The assembler only ever talks to storage through this.
pub trait TableStore {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Names of the data files directly inside `dir`, sorted.
    fn list_data_files(&self, dir: &Path) -> Result<Vec<String>>;

    /// Names of the first-level subdirectories of `dir`, sorted.
    fn list_subdirs(&self, dir: &Path) -> Result<Vec<String>>;

    /// Read a whole file into one batch.
    fn read_table(&self, path: &Path) -> Result<RecordBatch>;

    /// Column names of a file, without reading its data.
    fn read_columns(&self, path: &Path) -> Result<Vec<String>>;
}

/// Local filesystem store backed by Parquet files.
#[derive(Debug, Clone)]
pub struct ParquetStore {
    batch_size: usize,
}

impl ParquetStore {
    pub fn new() -> Self {
        Self { batch_size: 8192 }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    fn open_builder(&self, path: &Path) -> Result<ParquetRecordBatchReaderBuilder<File>> {
        let file = File::open(path).map_err(|e| DataError::io(path, e))?;
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|source| DataError::Parquet {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Default for ParquetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TableStore for ParquetStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_data_files(&self, dir: &Path) -> Result<Vec<String>> {
        if !dir.is_dir() {
            return Err(DataError::MissingPath {
                path: dir.to_path_buf(),
            });
        }

        // escape the directory part: dataset folders may contain glob metacharacters
        let pattern = format!(
            "{}/*.{}",
            Pattern::escape(&dir.to_string_lossy()),
            DATA_FILE_EXTENSION
        );
        let mut names = Vec::new();
        for entry in glob(&pattern)? {
            let path = match entry {
                Ok(p) => p,
                Err(e) => {
                    debug!("cannot read glob entry: {}", e);
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        trace!(dir = %dir.display(), files = names.len(), "listed data files");
        Ok(names)
    }

    fn list_subdirs(&self, dir: &Path) -> Result<Vec<String>> {
        let entries = fs::read_dir(dir).map_err(|e| DataError::io(dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DataError::io(dir, e))?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read_table(&self, path: &Path) -> Result<RecordBatch> {
        let builder = self.open_builder(path)?;
        let schema: SchemaRef = builder.schema().clone();
        let reader = builder
            .with_batch_size(self.batch_size)
            .build()
            .map_err(|source| DataError::Parquet {
                path: path.to_path_buf(),
                source,
            })?;

        let mut batches = Vec::new();
        for batch in reader {
            batches.push(batch?);
        }
        let table = concat_batches(&schema, &batches)?;
        debug!(
            path = %path.display(),
            rows = table.num_rows(),
            columns = table.num_columns(),
            "read table"
        );
        Ok(table)
    }

    fn read_columns(&self, path: &Path) -> Result<Vec<String>> {
        let builder = self.open_builder(path)?;
        Ok(builder
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect())
    }
}
