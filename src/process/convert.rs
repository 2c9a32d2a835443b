use crate::error::Result;
use crate::process::{date_parser, utils};
use arrow::{
    array::{Array, ArrayRef, AsArray, Date32Array},
    compute::{can_cast_types, cast},
    datatypes::{DataType, Int64Type},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::debug;

/// Coerce any column to `Date32`. Values that cannot be read as a date
/// become null; this never fails on individual bad values.
pub fn coerce_to_date32(arr: &ArrayRef) -> Result<ArrayRef> {
    let out: ArrayRef = match arr.data_type() {
        DataType::Date32 => arr.clone(),

        // Date64/timestamps: arrow truncates to the (local) calendar day
        DataType::Date64 | DataType::Timestamp(_, _) => cast(arr.as_ref(), &DataType::Date32)?,

        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View | DataType::Dictionary(_, _) => {
            let strings = utils::column_as_strings(arr)?;
            let parsed: Date32Array = strings
                .iter()
                .map(|v| v.and_then(date_parser::parse_date).map(date_parser::to_date32))
                .collect();
            Arc::new(parsed)
        }

        dt if dt.is_integer() => {
            let ints = cast(arr.as_ref(), &DataType::Int64)?;
            let parsed: Date32Array = ints
                .as_primitive::<Int64Type>()
                .iter()
                .map(|v| {
                    v.and_then(date_parser::date_from_yyyymmdd)
                        .map(date_parser::to_date32)
                })
                .collect();
            Arc::new(parsed)
        }

        dt if can_cast_types(dt, &DataType::Utf8) => {
            debug!(data_type = ?dt, "parsing dates from text rendering");
            let strings = utils::column_as_strings(arr)?;
            let parsed: Date32Array = strings
                .iter()
                .map(|v| v.and_then(date_parser::parse_date).map(date_parser::to_date32))
                .collect();
            Arc::new(parsed)
        }

        dt => {
            debug!(data_type = ?dt, "no date interpretation; all values null");
            Arc::new(Date32Array::from(vec![None; arr.len()]))
        }
    };
    Ok(out)
}

/// Replace the column `name` of `batch` with its `Date32` coercion.
pub fn coerce_date_column(batch: &RecordBatch, name: &str, context: &str) -> Result<RecordBatch> {
    let idx = utils::require_column(batch, name, context)?;
    let col = batch.column(idx);
    if col.data_type() == &DataType::Date32 {
        return Ok(batch.clone());
    }

    let before = col.null_count();
    let coerced = coerce_to_date32(col)?;
    let unparsed = coerced.null_count().saturating_sub(before);
    if unparsed > 0 {
        debug!(context, column = name, unparsed, "date values coerced to null");
    }
    utils::replace_column(batch, idx, coerced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int64Array, StringArray, TimestampMillisecondArray};
    use arrow::datatypes::{Field, Schema};
    use chrono::NaiveDate;

    fn days(y: i32, m: u32, d: u32) -> i32 {
        date_parser::to_date32(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn strings_are_parsed_and_bad_values_nulled() {
        let arr: ArrayRef = Arc::new(StringArray::from(vec![
            Some("2024-01-02"),
            Some("garbage"),
            None,
            Some("2024/01/03"),
        ]));
        let out = coerce_to_date32(&arr).unwrap();
        let out = out.as_primitive::<arrow::datatypes::Date32Type>();
        assert_eq!(out.value(0), days(2024, 1, 2));
        assert!(out.is_null(1));
        assert!(out.is_null(2));
        assert_eq!(out.value(3), days(2024, 1, 3));
    }

    #[test]
    fn integers_and_timestamps() {
        let ints: ArrayRef = Arc::new(Int64Array::from(vec![20240105, 7]));
        let out = coerce_to_date32(&ints).unwrap();
        let out = out.as_primitive::<arrow::datatypes::Date32Type>();
        assert_eq!(out.value(0), days(2024, 1, 5));
        assert!(out.is_null(1));

        // 2024-01-05T12:00:00Z
        let ts: ArrayRef = Arc::new(TimestampMillisecondArray::from(vec![1_704_456_000_000]));
        let out = coerce_to_date32(&ts).unwrap();
        assert_eq!(
            out.as_primitive::<arrow::datatypes::Date32Type>().value(0),
            days(2024, 1, 5)
        );
    }

    #[test]
    fn coerce_date_column_requires_the_column() {
        let schema = Arc::new(Schema::new(vec![Field::new("x", DataType::Utf8, true)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringArray::from(vec!["2024-01-01"])) as ArrayRef],
        )
        .unwrap();
        assert!(coerce_date_column(&batch, "mdate", "t").is_err());

        let out = coerce_date_column(&batch, "x", "t").unwrap();
        assert_eq!(out.schema().field(0).data_type(), &DataType::Date32);
        assert_eq!(out.schema().field(0).name(), "x");
    }
}
