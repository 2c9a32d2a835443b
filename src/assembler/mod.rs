// src/assembler/mod.rs
//! Retrieval modes over the catalog and the file store.

mod curated;
mod introspect;
mod raw;
pub mod report;

pub use report::{
    CuratedLoad, GetOptions, RawLoad, Skipped, SubfolderInfo, SubfolderScan, TaggedTable,
};

use std::path::Path;

use crate::catalog::CatalogResolver;
use crate::config::StoreConfig;
use crate::error::Result;
use crate::process::RuleBook;
use crate::store::{ParquetStore, TableStore};

/// Loads, reshapes and normalizes tables for callers.
pub struct TableAssembler<S = ParquetStore> {
    resolver: CatalogResolver,
    store: S,
    rules: RuleBook,
}

impl TableAssembler<ParquetStore> {
    /// Built-in catalog and rules over the Parquet store at the configured roots.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(CatalogResolver::from_config(config), ParquetStore::new())
    }
}

impl<S: TableStore> TableAssembler<S> {
    pub fn new(resolver: CatalogResolver, store: S) -> Self {
        Self {
            resolver,
            store,
            rules: RuleBook::builtin(),
        }
    }

    /// Replace the per-dataset normalization rules.
    pub fn with_rules(mut self, rules: RuleBook) -> Self {
        self.rules = rules;
        self
    }

    pub fn resolver(&self) -> &CatalogResolver {
        &self.resolver
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    /// Logical names in the catalog, in definition order.
    pub fn list_datasets(&self) -> Vec<String> {
        self.resolver.names()
    }

    /// Data file names directly inside `directory`, sorted.
    pub fn list_data_files(&self, directory: impl AsRef<Path>) -> Result<Vec<String>> {
        self.store.list_data_files(directory.as_ref())
    }
}
