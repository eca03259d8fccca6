use neo4rs::{BoltNull, BoltType};

use crate::query::Query;
use crate::types::Value;

/// Convert a parameter into the driver's Bolt value.
#[must_use]
pub fn to_bolt(value: &Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(value) => BoltType::from(*value),
        Value::Int(value) => BoltType::from(*value),
        Value::Float(value) => BoltType::from(*value),
        Value::String(value) => BoltType::from(value.as_str()),
    }
}

/// Build a driver query with every parameter bound by name.
#[must_use]
pub fn build_query(query: &Query) -> neo4rs::Query {
    query
        .params()
        .iter()
        .fold(neo4rs::query(query.text()), |bolt_query, (name, value)| {
            bolt_query.param(name, to_bolt(value))
        })
}
