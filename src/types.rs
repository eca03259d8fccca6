use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};

use crate::error::GraphMiddlewareError;

/// Scalar values used both as query parameters and as record fields.
///
/// ```rust
/// use graph_middleware::prelude::*;
///
/// let state = Value::from("Texas");
/// assert_eq!(state.as_str().unwrap(), "Texas");
/// assert!(Value::Int(3).as_str().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// NULL value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    String(String),
}

impl Value {
    /// Name of the variant, used in type mismatch errors.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
        }
    }

    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// # Errors
    /// Returns `TypeMismatchError` unless the value is a string.
    pub fn as_str(&self) -> Result<&str, GraphMiddlewareError> {
        if let Value::String(value) = self {
            Ok(value)
        } else {
            Err(self.mismatch("string"))
        }
    }

    /// # Errors
    /// Returns `TypeMismatchError` unless the value is an integer.
    pub fn as_int(&self) -> Result<i64, GraphMiddlewareError> {
        if let Value::Int(value) = self {
            Ok(*value)
        } else {
            Err(self.mismatch("integer"))
        }
    }

    /// Numeric view of the value; integers are widened to `f64`.
    ///
    /// # Errors
    /// Returns `TypeMismatchError` unless the value is an integer or a float.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Result<f64, GraphMiddlewareError> {
        match self {
            Value::Float(value) => Ok(*value),
            Value::Int(value) => Ok(*value as f64),
            _ => Err(self.mismatch("float")),
        }
    }

    /// # Errors
    /// Returns `TypeMismatchError` unless the value is a boolean.
    pub fn as_bool(&self) -> Result<bool, GraphMiddlewareError> {
        if let Value::Bool(value) = self {
            Ok(*value)
        } else {
            Err(self.mismatch("boolean"))
        }
    }

    fn mismatch(&self, expected: &'static str) -> GraphMiddlewareError {
        GraphMiddlewareError::TypeMismatchError {
            expected,
            found: self.type_name(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::String(value) => f.write_str(value),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Int(value) => serializer.serialize_i64(*value),
            Value::Float(value) => serializer.serialize_f64(*value),
            Value::String(value) => serializer.serialize_str(value),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar value (string, number, boolean or null)")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        i64::try_from(v)
            .map(Value::Int)
            .map_err(|_| E::custom(format!("integer {v} does not fit in i64")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, _seq: A) -> Result<Value, A::Error> {
        Err(de::Error::custom("lists are not supported as record values"))
    }

    fn visit_map<A: MapAccess<'de>>(self, _map: A) -> Result<Value, A::Error> {
        Err(de::Error::custom(
            "maps, nodes and relationships are not supported as record values",
        ))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercions_are_strict() {
        let genre = Value::from("Drama");
        assert_eq!(genre.as_str().unwrap(), "Drama");
        assert!(matches!(
            genre.as_int(),
            Err(GraphMiddlewareError::TypeMismatchError {
                expected: "integer",
                found: "string"
            })
        ));
        assert!(matches!(
            Value::Int(3).as_str(),
            Err(GraphMiddlewareError::TypeMismatchError {
                expected: "string",
                found: "integer"
            })
        ));
        assert!(Value::Null.as_bool().is_err());
        assert!(Value::Null.is_null());
    }

    #[test]
    fn float_view_widens_ints() {
        assert_eq!(Value::Int(3).as_float().unwrap(), 3.0);
        assert_eq!(Value::Float(2.5).as_float().unwrap(), 2.5);
        assert!(Value::Bool(true).as_float().is_err());
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(7)), Value::Int(7));
    }

    #[test]
    fn deserializes_scalars_and_rejects_containers() {
        let value: Value = serde_json::from_str("\"Comedy\"").unwrap();
        assert_eq!(value, Value::String("Comedy".into()));
        let value: Value = serde_json::from_str("null").unwrap();
        assert_eq!(value, Value::Null);
        let value: Value = serde_json::from_str("42").unwrap();
        assert_eq!(value, Value::Int(42));
        let value: Value = serde_json::from_str("1.5").unwrap();
        assert_eq!(value, Value::Float(1.5));
        assert!(serde_json::from_str::<Value>("[1, 2]").is_err());
        assert!(serde_json::from_str::<Value>("{\"a\": 1}").is_err());
    }

    #[test]
    fn display_prints_raw_strings() {
        assert_eq!(Value::from("Drama").to_string(), "Drama");
        assert_eq!(Value::Int(3).to_string(), "3");
        assert_eq!(Value::Null.to_string(), "null");
    }
}
