use std::fmt;
use std::sync::Arc;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::GraphMiddlewareError;
use crate::types::Value;

/// A record from a query result
///
/// Field names are kept in the order the database returned them and may be
/// shared across all records of a result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    field_names: Arc<Vec<String>>,
    values: Vec<Value>,
}

impl Record {
    /// Create a new record
    ///
    /// # Errors
    /// Returns `QueryError` if the number of values differs from the number of field names.
    pub fn new(
        field_names: Arc<Vec<String>>,
        values: Vec<Value>,
    ) -> Result<Self, GraphMiddlewareError> {
        if field_names.len() != values.len() {
            return Err(GraphMiddlewareError::QueryError(format!(
                "record has {} fields but {} values",
                field_names.len(),
                values.len()
            )));
        }
        Ok(Self {
            field_names,
            values,
        })
    }

    /// Build a record from `(field, value)` pairs.
    #[must_use]
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let (names, values): (Vec<String>, Vec<Value>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            field_names: Arc::new(names),
            values,
        }
    }

    #[must_use]
    pub fn field_names(&self) -> &Arc<Vec<String>> {
        &self.field_names
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the index of a field by name
    #[must_use]
    pub fn field_index(&self, field: &str) -> Option<usize> {
        self.field_names.iter().position(|name| name == field)
    }

    /// Get a value from the record by field name
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.field_index(field).and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the record by position
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get a value from the record, failing when the field is absent.
    ///
    /// # Errors
    /// Returns `MissingField` if the record has no such field.
    pub fn value(&self, field: &str) -> Result<&Value, GraphMiddlewareError> {
        self.get(field)
            .ok_or_else(|| GraphMiddlewareError::MissingField(field.to_string()))
    }

    /// Typed accessor for string fields.
    ///
    /// # Errors
    /// Returns `MissingField` if the field is absent or `TypeMismatchError` if it is not a string.
    pub fn get_string(&self, field: &str) -> Result<&str, GraphMiddlewareError> {
        self.value(field)?.as_str()
    }

    /// Iterate `(field, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.field_names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub(crate) fn share_field_names(&mut self, shared: &Arc<Vec<String>>) {
        if !Arc::ptr_eq(&self.field_names, shared) && self.field_names == *shared {
            self.field_names = Arc::clone(shared);
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of field names to scalar values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
        let capacity = access.size_hint().unwrap_or(0);
        let mut names = Vec::with_capacity(capacity);
        let mut values = Vec::with_capacity(capacity);
        while let Some((name, value)) = access.next_entry::<String, Value>()? {
            names.push(name);
            values.push(value);
        }
        Ok(Record {
            field_names: Arc::new(names),
            values,
        })
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}
