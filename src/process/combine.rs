use arrow::{
    array::{new_null_array, ArrayRef, AsArray, Date32Array, UInt32Array},
    compute::{cast, cast_with_options, concat_batches, take, CastOptions},
    datatypes::{DataType, Date32Type, Field, FieldRef, Schema},
    record_batch::RecordBatch,
};
use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};
use tracing::debug;

use crate::error::Result;
use crate::process::pivot::DATE_COLUMN;
use crate::process::utils::require_column;

/// Zero rows, zero columns.
pub fn empty_table() -> RecordBatch {
    RecordBatch::new_empty(Arc::new(Schema::empty()))
}

/// Outer-join wide tables on their `mdate` column. The result has one row per
/// date seen in any input (ascending) and every non-date column of every
/// input, in input order; cells an input has no row for are null.
pub fn align_on_dates(tables: &[RecordBatch]) -> Result<RecordBatch> {
    if tables.is_empty() {
        return Ok(empty_table());
    }

    let mut date_columns = Vec::with_capacity(tables.len());
    for table in tables {
        let idx = require_column(table, DATE_COLUMN, "align on dates")?;
        let col = match table.column(idx).data_type() {
            DataType::Date32 => table.column(idx).clone(),
            _ => cast(table.column(idx).as_ref(), &DataType::Date32)?,
        };
        date_columns.push((idx, col));
    }

    let all_dates: Vec<i32> = date_columns
        .iter()
        .flat_map(|(_, c)| c.as_primitive::<Date32Type>().iter().flatten().collect::<Vec<_>>())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut fields: Vec<FieldRef> = vec![Arc::new(Field::new(DATE_COLUMN, DataType::Date32, false))];
    let mut columns: Vec<ArrayRef> = vec![Arc::new(Date32Array::from(all_dates.clone()))];

    for (table, (date_idx, dates)) in tables.iter().zip(&date_columns) {
        let row_of: HashMap<i32, u32> = dates
            .as_primitive::<Date32Type>()
            .iter()
            .enumerate()
            .filter_map(|(row, d)| d.map(|d| (d, row as u32)))
            .collect();
        let indices: UInt32Array = all_dates.iter().map(|d| row_of.get(d).copied()).collect();

        let schema = table.schema();
        for (i, field) in schema.fields().iter().enumerate() {
            if i == *date_idx {
                continue;
            }
            let taken = take(table.column(i).as_ref(), &indices, None)?;
            fields.push(Arc::new(field.as_ref().clone().with_nullable(true)));
            columns.push(taken);
        }
    }

    debug!(
        tables = tables.len(),
        dates = all_dates.len(),
        columns = columns.len() - 1,
        "aligned on dates"
    );
    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).map_err(Into::into)
}

/// Row-wise concatenation of tables whose schemas may differ. Columns are
/// matched by name in first-seen order; a column absent from a table is
/// filled with nulls and a column whose type differs from the first one seen
/// is cast to that type. A value that does not convert is an error, never a
/// null.
pub fn concat_rows(tables: &[RecordBatch]) -> Result<RecordBatch> {
    match tables {
        [] => return Ok(empty_table()),
        [only] => return Ok(only.clone()),
        _ => {}
    }

    // 1) unified schema
    let mut fields: Vec<Field> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();
    for table in tables {
        for field in table.schema().fields() {
            if !position.contains_key(field.name()) {
                position.insert(field.name().clone(), fields.len());
                fields.push(field.as_ref().clone().with_nullable(true));
            }
        }
    }
    let schema = Arc::new(Schema::new(fields));
    let strict = CastOptions {
        safe: false,
        ..Default::default()
    };

    // 2) conform every table to it
    let mut conformed = Vec::with_capacity(tables.len());
    for table in tables {
        let columns = schema
            .fields()
            .iter()
            .map(|field| match table.column_by_name(field.name()) {
                Some(col) if col.data_type() == field.data_type() => Ok(col.clone()),
                Some(col) => {
                    debug!(column = %field.name(), from = ?col.data_type(), to = ?field.data_type(), "casting column");
                    cast_with_options(col.as_ref(), field.data_type(), &strict)
                }
                None => Ok(new_null_array(field.data_type(), table.num_rows())),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        conformed.push(RecordBatch::try_new(schema.clone(), columns)?);
    }

    concat_batches(&schema, &conformed).map_err(Into::into)
}
