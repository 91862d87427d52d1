use std::fmt;

use serde::Serialize;

/// A single typed scalar value within a measurement.
///
/// Field values are schema-less: a measurement can freely mix the variants. Individual wire
/// formats decide which variants they can represent, and how.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A boolean value.
    Boolean(bool),

    /// A signed 64-bit integer value.
    Integer(i64),

    /// An unsigned 64-bit integer value.
    Unsigned(u64),

    /// A 64-bit floating point value.
    Float(f64),

    /// A text value.
    Text(String),
}

impl FieldValue {
    /// Returns the name of this value's type, suitable for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Unsigned(_) => "unsigned integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(value) => write!(f, "{}", value),
            Self::Integer(value) => write!(f, "{}", value),
            Self::Unsigned(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{}", value),
            Self::Text(value) => write!(f, "{}", value),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Unsigned(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a str> for FieldValue {
    fn from(value: &'a str) -> Self {
        Self::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(FieldValue::from(true).type_name(), "boolean");
        assert_eq!(FieldValue::from(-1i64).type_name(), "integer");
        assert_eq!(FieldValue::from(1u64).type_name(), "unsigned integer");
        assert_eq!(FieldValue::from(1.0f64).type_name(), "float");
        assert_eq!(FieldValue::from("one").type_name(), "text");
    }

    #[test]
    fn test_serialize_untagged() {
        assert_eq!(serde_json::to_string(&FieldValue::from(true)).unwrap(), "true");
        assert_eq!(serde_json::to_string(&FieldValue::from(-42i64)).unwrap(), "-42");
        assert_eq!(
            serde_json::to_string(&FieldValue::from(u64::MAX)).unwrap(),
            "18446744073709551615"
        );
        assert_eq!(serde_json::to_string(&FieldValue::from(91.5f64)).unwrap(), "91.5");
        assert_eq!(serde_json::to_string(&FieldValue::from("idle")).unwrap(), "\"idle\"");
    }
}
