use arrow::{
    array::{ArrayRef, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, info, warn};

use super::report::{RawLoad, Skipped, TaggedTable};
use super::TableAssembler;
use crate::error::{DataError, Result};
use crate::process::{
    align_on_dates, convert, dedup, pivot, pivot::non_key_columns, utils, KeepPolicy,
    DATE_COLUMN, ENTITY_COLUMN,
};
use crate::store::TableStore;

/// Column added to key-only raw tables to record where they came from.
pub const DATASET_NAME_COLUMN: &str = "dataset_name";

/// What one raw dataset turned into.
enum RawShape {
    Wide(RecordBatch),
    Passthrough(RecordBatch),
}

impl<S: TableStore> TableAssembler<S> {
    /// Load one or more single-file raw datasets from the load root, pivot
    /// each into a wide table and join them on the date index.
    ///
    /// A dataset that is missing or fails to process is recorded in
    /// [`RawLoad::skipped`] and the others still load; if none loads the
    /// combined table is empty.
    #[tracing::instrument(level = "info", skip(self, names))]
    pub fn load_raw<I, N>(&self, names: I) -> Result<RawLoad>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let mut out = RawLoad::empty();
        let mut wide_tables = Vec::new();
        let mut seen = HashSet::new();

        for name in names {
            let name = name.as_ref();
            if !seen.insert(name.to_string()) {
                debug!(dataset = name, "repeated dataset ignored");
                continue;
            }

            match self.shape_raw(name) {
                Ok(RawShape::Wide(wide)) => wide_tables.push(wide),
                Ok(RawShape::Passthrough(table)) => out.passthrough.push(TaggedTable {
                    dataset: name.to_string(),
                    table,
                }),
                Err(e) => {
                    warn!(dataset = name, error = %e, "skipping raw dataset");
                    out.skipped.push(Skipped::new(name, e));
                }
            }
        }

        if wide_tables.is_empty() && out.passthrough.is_empty() {
            warn!("no raw dataset could be loaded");
            return Ok(out);
        }

        out.combined = align_on_dates(&wide_tables)?;
        info!(
            pivoted = wide_tables.len(),
            passthrough = out.passthrough.len(),
            skipped = out.skipped.len(),
            rows = out.combined.num_rows(),
            "raw datasets loaded"
        );
        Ok(out)
    }

    fn shape_raw(&self, name: &str) -> Result<RawShape> {
        // 1) locate + read
        let path = self.resolver.raw_file(name);
        if !self.store.exists(&path) {
            return Err(DataError::MissingFile { path });
        }
        let table = self.store.read_table(&path)?;

        // 2) dates; bad values become null
        let table = convert::coerce_date_column(&table, DATE_COLUMN, name)?;

        // 3) key-only tables pass through
        let value_columns = non_key_columns(&table);
        if value_columns.is_empty() {
            debug!(dataset = name, "only key columns; passing through");
            return tag_with_dataset(&table, name).map(RawShape::Passthrough);
        }

        // 4) last write wins, then reshape
        debug!(dataset = name, columns = ?value_columns, "pivoting");
        utils::require_column(&table, ENTITY_COLUMN, name)?;
        let table = dedup(&table, &[DATE_COLUMN, ENTITY_COLUMN], KeepPolicy::Last, name)?;
        pivot(&table, name).map(RawShape::Wide)
    }
}

/// Append a constant `dataset_name` column.
pub(crate) fn tag_with_dataset(table: &RecordBatch, dataset: &str) -> Result<RecordBatch> {
    let schema = table.schema();
    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    fields.push(Field::new(DATASET_NAME_COLUMN, DataType::Utf8, false));

    let mut columns = table.columns().to_vec();
    columns.push(Arc::new(StringArray::from(vec![dataset; table.num_rows()])) as ArrayRef);

    let schema = Schema::new_with_metadata(fields, schema.metadata().clone());
    RecordBatch::try_new(Arc::new(schema), columns).map_err(Into::into)
}
