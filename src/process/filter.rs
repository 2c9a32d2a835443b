use arrow::{array::BooleanArray, compute::filter_record_batch, record_batch::RecordBatch};
use std::collections::HashSet;
use tracing::debug;

use crate::error::{DataError, Result};
use crate::process::pivot::ENTITY_COLUMN;
use crate::process::utils::{column_as_strings, require_column};

/// Column of the lookup table holding the security category.
pub const SECURITY_TYPE_COLUMN: &str = "Security_Type_Chinese";
/// Category that makes up the reference set (ordinary shares).
pub const REFERENCE_CATEGORY: &str = "普通股";
/// Identifying columns recognized on curated tables, tried in order.
pub const IDENTIFYING_COLUMNS: [&str; 2] = ["證券名稱", "公司"];

/// Entity ids of the lookup rows classified as the reference category.
pub fn reference_entities(lookup: &RecordBatch, context: &str) -> Result<HashSet<String>> {
    let type_idx = require_column(lookup, SECURITY_TYPE_COLUMN, context)?;
    let id_idx = require_column(lookup, ENTITY_COLUMN, context)?;
    let types = column_as_strings(lookup.column(type_idx))?;
    let ids = column_as_strings(lookup.column(id_idx))?;

    let set: HashSet<String> = types
        .iter()
        .zip(ids.iter())
        .filter_map(|(ty, id)| match (ty, id) {
            (Some(ty), Some(id)) if ty == REFERENCE_CATEGORY => Some(id.to_string()),
            _ => None,
        })
        .collect();
    debug!(context, entities = set.len(), "loaded reference entity set");
    Ok(set)
}

/// Keep the rows whose identifying column value is in `entities`. Null
/// identifiers never match.
pub fn filter_by_entities(
    batch: &RecordBatch,
    entities: &HashSet<String>,
    context: &str,
) -> Result<RecordBatch> {
    let schema = batch.schema();
    let idx = IDENTIFYING_COLUMNS
        .iter()
        .find_map(|name| schema.index_of(name).ok())
        .ok_or_else(|| DataError::schema(context, IDENTIFYING_COLUMNS.join("' or '")))?;

    let ids = column_as_strings(batch.column(idx))?;
    let mask: BooleanArray = ids
        .iter()
        .map(|id| Some(id.is_some_and(|id| entities.contains(id))))
        .collect();

    let filtered = filter_record_batch(batch, &mask)?;
    debug!(
        context,
        column = %schema.field(idx).name(),
        kept = filtered.num_rows(),
        total = batch.num_rows(),
        "filtered to reference entities"
    );
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, AsArray, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    fn table(cols: &[(&str, Vec<Option<&str>>)]) -> RecordBatch {
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

    #[test]
    fn reference_set_keeps_only_the_category() {
        let lookup = table(&[
            ("coid", vec![Some("2330"), Some("0050"), Some("2317"), None]),
            (
                SECURITY_TYPE_COLUMN,
                vec![Some("普通股"), Some("ETF"), Some("普通股"), Some("普通股")],
            ),
        ]);
        let set = reference_entities(&lookup, "t").unwrap();
        assert_eq!(set, HashSet::from(["2330".to_string(), "2317".to_string()]));
    }

    #[test]
    fn filter_output_is_subset_of_reference() {
        let set = HashSet::from(["2330".to_string(), "2317".to_string()]);
        let data = table(&[
            ("公司", vec![Some("2330"), Some("0050"), None, Some("2317"), Some("9999")]),
            ("x", vec![Some("a"), Some("b"), Some("c"), Some("d"), Some("e")]),
        ]);
        let out = filter_by_entities(&data, &set, "t").unwrap();
        let ids = out.column(0).as_string::<i32>();
        assert_eq!(out.num_rows(), 2);
        assert!(ids.iter().all(|id| set.contains(id.unwrap())));
    }

    #[test]
    fn security_name_column_wins_over_company() {
        let set = HashSet::from(["A".to_string()]);
        let data = table(&[
            ("公司", vec![Some("A"), Some("B")]),
            ("證券名稱", vec![Some("B"), Some("A")]),
        ]);
        let out = filter_by_entities(&data, &set, "t").unwrap();
        assert_eq!(out.num_rows(), 1);
        assert_eq!(out.column(1).as_string::<i32>().value(0), "A");
    }

    #[test]
    fn missing_identifier_is_schema_error() {
        let data = table(&[("x", vec![Some("a")])]);
        let err = filter_by_entities(&data, &HashSet::new(), "t").unwrap_err();
        assert!(matches!(err, DataError::Schema { .. }));
    }
}
