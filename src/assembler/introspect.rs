use std::collections::BTreeSet;
use tracing::{info, warn};

use super::report::{Skipped, SubfolderInfo, SubfolderScan};
use super::TableAssembler;
use crate::error::{DataError, Result};
use crate::process::pivot::is_value_column;
use crate::store::TableStore;

impl<S: TableStore> TableAssembler<S> {
    /// For every first-level folder of the load root, the distinct non-key
    /// column names found across its data files. Only file schemas are read.
    #[tracing::instrument(level = "info", skip(self))]
    pub fn list_subfolders(&self) -> Result<SubfolderScan> {
        let root = self.resolver.load_root();
        if !self.store.is_dir(root) {
            return Err(DataError::MissingPath {
                path: root.to_path_buf(),
            });
        }

        let mut folders = Vec::new();
        let mut skipped = Vec::new();
        for folder in self.store.list_subdirs(root)? {
            let dir = root.join(&folder);
            let files = match self.store.list_data_files(&dir) {
                Ok(files) => files,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "cannot list folder");
                    skipped.push(Skipped::new(dir.display().to_string(), e));
                    continue;
                }
            };

            let mut columns = BTreeSet::new();
            for file in files {
                let path = dir.join(&file);
                match self.store.read_columns(&path) {
                    Ok(names) => columns.extend(
                        names
                            .iter()
                            .map(|n| top_level_label(n))
                            .filter(|n| is_value_column(n))
                            .map(str::to_string),
                    ),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "error reading file schema");
                        skipped.push(Skipped::new(path.display().to_string(), e));
                    }
                }
            }

            folders.push(SubfolderInfo {
                name: folder,
                distinct_column_count: columns.len(),
                distinct_column_names: columns.into_iter().collect(),
            });
        }

        info!(folders = folders.len(), skipped = skipped.len(), "scanned load root");
        Ok(SubfolderScan { folders, skipped })
    }
}

/// First level of a two-level column name. Files written from a wide frame
/// flatten `(value, entity)` labels to `"('value', 'entity')"`.
fn top_level_label(name: &str) -> &str {
    name.strip_prefix("('")
        .and_then(|rest| rest.split_once("', "))
        .map(|(first, _)| first)
        .unwrap_or(name)
}
