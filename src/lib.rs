//! Tabular access layer over a directory tree of Parquet files.
//!
//! A [`CatalogResolver`] maps logical dataset names to locations under two
//! roots, a [`TableStore`] reads the files, and the [`TableAssembler`] turns
//! them into analysis-ready Arrow tables:
//!
//! - [`TableAssembler::load_raw`] pivots long `(mdate, coid, …)` raw tables
//!   into wide, date-indexed tables and joins them on the date;
//! - [`TableAssembler::get_dataset`] merges a curated dataset's files,
//!   optionally filters to ordinary shares and applies per-dataset
//!   sort/dedup rules;
//! - [`TableAssembler::list_subfolders`] reports the columns available
//!   under the load root.

pub mod assembler;
pub mod catalog;
pub mod config;
pub mod error;
pub mod process;
pub mod store;

pub use assembler::{
    CuratedLoad, GetOptions, RawLoad, Skipped, SubfolderInfo, SubfolderScan, TableAssembler,
    TaggedTable,
};
pub use catalog::{Catalog, CatalogResolver};
pub use config::StoreConfig;
pub use error::{DataError, Result};
pub use store::{ParquetStore, TableStore};
