#![allow(dead_code)]

use arrow::{
    array::{ArrayRef, Date32Array, Float64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;
use std::{cell::RefCell, fs, fs::File, path::Path, sync::Arc};
use tquant_data::{process::date_parser, ParquetStore, Result, TableStore};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tquant_data=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

pub fn day(s: &str) -> i32 {
    date_parser::to_date32(NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap())
}

pub fn write_parquet(path: &Path, batch: &RecordBatch) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let file = File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(batch).unwrap();
    writer.close().unwrap();
}

/// Long raw table: `mdate` as text, `coid`, one Float64 value column.
pub fn raw_table(value_column: &str, rows: &[(&str, &str, f64)]) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("mdate", DataType::Utf8, true),
        Field::new("coid", DataType::Utf8, true),
        Field::new(value_column, DataType::Float64, true),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.0))) as ArrayRef,
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.1))) as ArrayRef,
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.2))) as ArrayRef,
        ],
    )
    .unwrap()
}

/// Key-only raw table with a proper date column.
pub fn key_only_table(rows: &[(&str, &str)]) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("mdate", DataType::Date32, true),
        Field::new("coid", DataType::Utf8, true),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Date32Array::from_iter_values(rows.iter().map(|r| day(r.0)))) as ArrayRef,
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.1))) as ArrayRef,
        ],
    )
    .unwrap()
}

/// Utf8 table from named columns.
pub fn text_table(cols: &[(&str, Vec<&str>)]) -> RecordBatch {
    let fields: Vec<Field> = cols
        .iter()
        .map(|(n, _)| Field::new(*n, DataType::Utf8, true))
        .collect();
    let arrays: Vec<ArrayRef> = cols
        .iter()
        .map(|(_, v)| Arc::new(StringArray::from(v.clone())) as ArrayRef)
        .collect();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap()
}

/// Parquet store that records every call it receives.
#[derive(Default)]
pub struct RecordingStore {
    inner: ParquetStore,
    pub calls: RefCell<Vec<String>>,
}

impl RecordingStore {
    fn record(&self, op: &str, path: &Path) {
        self.calls
            .borrow_mut()
            .push(format!("{} {}", op, path.display()));
    }
}

impl TableStore for RecordingStore {
    fn exists(&self, path: &Path) -> bool {
        self.record("exists", path);
        self.inner.exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.record("is_dir", path);
        self.inner.is_dir(path)
    }

    fn list_data_files(&self, dir: &Path) -> Result<Vec<String>> {
        self.record("list_data_files", dir);
        self.inner.list_data_files(dir)
    }

    fn list_subdirs(&self, dir: &Path) -> Result<Vec<String>> {
        self.record("list_subdirs", dir);
        self.inner.list_subdirs(dir)
    }

    fn read_table(&self, path: &Path) -> Result<RecordBatch> {
        self.record("read_table", path);
        self.inner.read_table(path)
    }

    fn read_columns(&self, path: &Path) -> Result<Vec<String>> {
        self.record("read_columns", path);
        self.inner.read_columns(path)
    }
}
