// src/process/mod.rs
//! Table shaping kernels: date coercion, dedup, sorting, pivoting, combining
//! and filtering of Arrow record batches.

pub mod combine;
pub mod convert;
pub mod date_parser;
pub mod dedup;
pub mod filter;
pub mod normalize;
pub mod pivot;
pub mod sort;
pub mod utils;

pub use combine::{align_on_dates, concat_rows, empty_table};
pub use dedup::{dedup, KeepPolicy};
pub use normalize::{NormalizationRule, RuleBook};
pub use pivot::{pivot, unpivot, ColumnLabel, DATE_COLUMN, ENTITY_COLUMN};
