use std::collections::BTreeMap;
use std::sync::Arc;

use neo4rs::Row;

use crate::error::GraphMiddlewareError;
use crate::results::Record;
use crate::types::Value;

/// Decode a driver row into a [`Record`] with its fields in `columns` order.
///
/// The driver keeps a row in a hash map, so the order has to come from the
/// statement rather than from the row.
///
/// # Errors
/// Returns `QueryError` if a column is missing from the row or holds a
/// non-scalar value (node, list, map, ...).
pub fn row_to_record(
    row: &Row,
    columns: &Arc<Vec<String>>,
) -> Result<Record, GraphMiddlewareError> {
    let values = columns
        .iter()
        .map(|name| {
            row.get::<Value>(name).map_err(|e| {
                GraphMiddlewareError::QueryError(format!("cannot decode field `{name}`: {e}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Record::new(Arc::clone(columns), values)
}

/// Decode a row whose columns are not known up front (`RETURN *`, a bare
/// procedure call). Fields come back sorted by name, the order `RETURN *` uses.
///
/// # Errors
/// Returns `QueryError` if a field holds a non-scalar value.
pub fn row_to_sorted_record(row: &Row) -> Result<Record, GraphMiddlewareError> {
    let fields = row
        .to_strict::<BTreeMap<String, Value>>()
        .map_err(|e| GraphMiddlewareError::QueryError(format!("cannot decode record: {e}")))?;
    Ok(Record::from_pairs(fields))
}
