//! Long ⇄ wide reshaping of `(mdate, coid, values…)` tables.
//!
//! A wide table has `mdate` as its first column, one row per distinct date in
//! ascending order, and one column per `(value column, entity)` pair. Each
//! wide column carries its [`ColumnLabel`] in the field metadata so the
//! two-level label survives even though Arrow field names are flat.

use arrow::{
    array::{new_null_array, Array, ArrayRef, AsArray, Date32Array, StringArray, UInt32Array},
    compute::{interleave, sort_to_indices, take},
    datatypes::{DataType, Date32Type, Field, Schema},
    record_batch::RecordBatch,
};
use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};
use tracing::debug;

use crate::error::{DataError, Result};
use crate::process::{convert, utils};

/// Date key column of every raw table.
pub const DATE_COLUMN: &str = "mdate";
/// Entity key column of every raw table.
pub const ENTITY_COLUMN: &str = "coid";

/// Prefix of the index columns pandas stores next to the data.
const PANDAS_INDEX_PREFIX: &str = "__index_level_";

const META_DATASET: &str = "dataset";
const META_VALUE: &str = "value_column";
const META_ENTITY: &str = "entity";

/// Two-level label of a wide column, plus the dataset it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnLabel {
    pub dataset: String,
    pub value: String,
    pub entity: String,
}

impl ColumnLabel {
    pub fn new(
        dataset: impl Into<String>,
        value: impl Into<String>,
        entity: impl Into<String>,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            value: value.into(),
            entity: entity.into(),
        }
    }

    /// Flat Arrow field name: `"{value}|{entity}"`.
    pub fn field_name(&self) -> String {
        format!("{}|{}", self.value, self.entity)
    }

    pub fn to_field(&self, data_type: DataType) -> Field {
        Field::new(self.field_name(), data_type, true).with_metadata(HashMap::from([
            (META_DATASET.to_string(), self.dataset.clone()),
            (META_VALUE.to_string(), self.value.clone()),
            (META_ENTITY.to_string(), self.entity.clone()),
        ]))
    }

    /// Recover the label of a wide column. Falls back to splitting the field
    /// name on its last `|` when the metadata was lost.
    pub fn from_field(field: &Field) -> Option<Self> {
        let meta = field.metadata();
        if let (Some(value), Some(entity)) = (meta.get(META_VALUE), meta.get(META_ENTITY)) {
            return Some(Self::new(
                meta.get(META_DATASET).cloned().unwrap_or_default(),
                value.clone(),
                entity.clone(),
            ));
        }
        let (value, entity) = field.name().rsplit_once('|')?;
        Some(Self::new("", value, entity))
    }
}

/// True for `__index_level_N__`, the columns pandas writes for a
/// non-default index.
pub fn is_index_column(name: &str) -> bool {
    name.starts_with(PANDAS_INDEX_PREFIX) && name.ends_with("__")
}

/// True for columns that hold data: not the date or entity key and not a
/// stored index.
pub fn is_value_column(name: &str) -> bool {
    name != DATE_COLUMN && name != ENTITY_COLUMN && !is_index_column(name)
}

/// Names of the value columns of a long table.
pub fn non_key_columns(batch: &RecordBatch) -> Vec<String> {
    batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name())
        .filter(|n| is_value_column(n))
        .cloned()
        .collect()
}

/// Distinct non-null entities rendered as text, ordered by their native
/// values so numeric ids sort numerically.
fn ordered_entities<'a>(column: &ArrayRef, rendered: &'a StringArray) -> Result<Vec<&'a str>> {
    let mut first_row: HashMap<&str, u32> = HashMap::new();
    for (row, entity) in rendered.iter().enumerate() {
        if let Some(entity) = entity {
            first_row.entry(entity).or_insert(row as u32);
        }
    }
    let mut rows: Vec<u32> = first_row.into_values().collect();
    rows.sort_unstable();

    let rows = UInt32Array::from(rows);
    let distinct = take(column.as_ref(), &rows, None)?;
    let order = sort_to_indices(distinct.as_ref(), None, None)?;
    Ok(order
        .values()
        .iter()
        .map(|&i| rendered.value(rows.value(i as usize) as usize))
        .collect())
}

/// Reshape a long table into a wide one. The input should already be
/// deduplicated on `(mdate, coid)`; if it is not, the later row fills the
/// cell. Rows with a null date or entity have no cell and are dropped.
pub fn pivot(batch: &RecordBatch, dataset: &str) -> Result<RecordBatch> {
    let date_idx = utils::require_column(batch, DATE_COLUMN, dataset)?;
    let entity_idx = utils::require_column(batch, ENTITY_COLUMN, dataset)?;

    let dates_arr = convert::coerce_to_date32(batch.column(date_idx))?;
    let dates_arr = dates_arr.as_primitive::<Date32Type>();
    let entities_arr = utils::column_as_strings(batch.column(entity_idx))?;

    // 1) distinct dates and entities, both ascending
    let dates: Vec<i32> = dates_arr.iter().flatten().collect::<BTreeSet<_>>().into_iter().collect();
    let entities = ordered_entities(batch.column(entity_idx), &entities_arr)?;
    let date_pos: HashMap<i32, usize> = dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();
    let entity_pos: HashMap<&str, usize> =
        entities.iter().enumerate().map(|(i, e)| (*e, i)).collect();

    // 2) cell → source row
    let mut cells: Vec<Option<u32>> = vec![None; dates.len() * entities.len()];
    let mut dropped = 0usize;
    for row in 0..batch.num_rows() {
        match (dates_arr.is_valid(row), entities_arr.is_valid(row)) {
            (true, true) => {
                let d = date_pos[&dates_arr.value(row)];
                let e = entity_pos[entities_arr.value(row)];
                cells[d * entities.len() + e] = Some(row as u32);
            }
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!(dataset, dropped, "rows without date or entity left out of pivot");
    }

    // 3) one gathered column per (value column, entity)
    let mut fields = vec![Field::new(DATE_COLUMN, DataType::Date32, false)];
    let mut columns: Vec<ArrayRef> = vec![Arc::new(Date32Array::from(dates.clone()))];
    let schema = batch.schema();
    for (col_idx, field) in schema.fields().iter().enumerate() {
        if col_idx == date_idx || col_idx == entity_idx || is_index_column(field.name()) {
            continue;
        }
        let source = batch.column(col_idx);
        for (e, entity) in entities.iter().enumerate() {
            let indices: UInt32Array = (0..dates.len())
                .map(|d| cells[d * entities.len() + e])
                .collect();
            let label = ColumnLabel::new(dataset, field.name().as_str(), *entity);
            fields.push(label.to_field(source.data_type().clone()));
            columns.push(take(source.as_ref(), &indices, None)?);
        }
    }

    debug!(
        dataset,
        dates = dates.len(),
        entities = entities.len(),
        columns = columns.len() - 1,
        "pivoted"
    );
    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).map_err(Into::into)
}

/// Flatten a wide table back to `(mdate, coid, values…)` rows, ordered by
/// date then by the entity order of the wide columns. A `(date, entity)`
/// pair whose cells are all null produces no row.
pub fn unpivot(wide: &RecordBatch) -> Result<RecordBatch> {
    let date_idx = utils::require_column(wide, DATE_COLUMN, "unpivot")?;
    let schema = wide.schema();

    // 1) group the wide columns by value label, entities in first-seen order
    let mut values: Vec<(String, DataType)> = Vec::new();
    let mut entities: Vec<String> = Vec::new();
    let mut by_label: HashMap<(String, String), usize> = HashMap::new();
    for (i, field) in schema.fields().iter().enumerate() {
        if i == date_idx {
            continue;
        }
        let label = ColumnLabel::from_field(field).ok_or_else(|| {
            DataError::schema("unpivot", format!("{} (not a wide column)", field.name()))
        })?;
        if !values.iter().any(|(v, _)| v == &label.value) {
            values.push((label.value.clone(), field.data_type().clone()));
        }
        if !entities.contains(&label.entity) {
            entities.push(label.entity.clone());
        }
        by_label.insert((label.value, label.entity), i);
    }

    // 2) which (date row, entity) pairs carry data
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    for d in 0..wide.num_rows() {
        for (e, entity) in entities.iter().enumerate() {
            let has_value = values.iter().any(|(v, _)| {
                by_label
                    .get(&(v.clone(), entity.clone()))
                    .is_some_and(|&c| wide.column(c).is_valid(d))
            });
            if has_value {
                pairs.push((d, e));
            }
        }
    }

    // 3) assemble long columns
    let date_take = UInt32Array::from_iter_values(pairs.iter().map(|(d, _)| *d as u32));
    let mut fields = vec![
        Field::new(DATE_COLUMN, DataType::Date32, true),
        Field::new(ENTITY_COLUMN, DataType::Utf8, true),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        take(wide.column(date_idx).as_ref(), &date_take, None)?,
        Arc::new(StringArray::from_iter_values(
            pairs.iter().map(|(_, e)| entities[*e].as_str()),
        )),
    ];

    for (value, data_type) in &values {
        let sources: Vec<ArrayRef> = entities
            .iter()
            .map(|entity| match by_label.get(&(value.clone(), entity.clone())) {
                Some(&c) => wide.column(c).clone(),
                None => new_null_array(data_type, wide.num_rows()),
            })
            .collect();
        let refs: Vec<&dyn Array> = sources.iter().map(|a| a.as_ref()).collect();
        let picks: Vec<(usize, usize)> = pairs.iter().map(|(d, e)| (*e, *d)).collect();
        columns.push(interleave(&refs, &picks)?);
        fields.push(Field::new(value, data_type.clone(), true));
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).map_err(Into::into)
}
