use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::report::{CuratedLoad, GetOptions, Skipped};
use super::TableAssembler;
use crate::error::{DataError, Result};
use crate::process::{concat_rows, filter};
use crate::store::TableStore;

/// Load-root dataset holding the security category of every entity.
pub const REFERENCE_LOOKUP: &str = "證券種類_中文";

impl<S: TableStore> TableAssembler<S> {
    /// Read a curated catalog dataset: merge its files, optionally filter to
    /// reference entities, then apply the dataset's normalization rule.
    ///
    /// Files are taken in lexicographic order; without `merge_files` the
    /// first readable one is returned. Unreadable files are reported in
    /// [`CuratedLoad::skipped`] as long as at least one file reads.
    #[tracing::instrument(level = "info", skip(self))]
    pub fn get_dataset(&self, name: &str, options: GetOptions) -> Result<CuratedLoad> {
        // 1) locate
        let dir = self.resolver.resolve(name)?;
        if !self.store.is_dir(&dir) {
            return Err(DataError::MissingPath { path: dir });
        }
        let files = self.store.list_data_files(&dir)?;
        if files.is_empty() {
            return Err(DataError::MissingFile { path: dir });
        }

        // 2) read
        let mut tables = Vec::with_capacity(files.len());
        let mut skipped = Vec::new();
        for file in &files {
            let path = dir.join(file);
            match self.store.read_table(&path) {
                Ok(table) => {
                    tables.push(table);
                    if !options.merge_files {
                        break;
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable file");
                    skipped.push(Skipped::new(path.display().to_string(), e));
                }
            }
        }
        if tables.is_empty() {
            return Err(DataError::AllFilesUnreadable { path: dir });
        }

        // 3) merge
        let read = tables.len();
        let mut table = if options.merge_files {
            concat_rows(&tables)?
        } else {
            tables.swap_remove(0)
        };
        debug!(dataset = name, files = read, rows = table.num_rows(), "loaded files");

        // 4) reference entities
        if options.filter_reference_entities {
            let entities = self.reference_entities()?;
            table = filter::filter_by_entities(&table, &entities, name)?;
        }

        // 5) dataset-specific normalization
        let table = self.rules.apply(name, table)?;

        info!(
            dataset = name,
            rows = table.num_rows(),
            columns = table.num_columns(),
            skipped = skipped.len(),
            "dataset ready"
        );
        Ok(CuratedLoad { table, skipped })
    }

    /// Entity ids of ordinary shares, read from the load-root lookup table.
    pub fn reference_entities(&self) -> Result<HashSet<String>> {
        let path = self.resolver.raw_file(REFERENCE_LOOKUP);
        if !self.store.exists(&path) {
            return Err(DataError::MissingFile { path });
        }
        let lookup = self.store.read_table(&path)?;
        filter::reference_entities(&lookup, REFERENCE_LOOKUP)
    }
}
