//! Typed attribute values attached to entity states.

use serde::{Deserialize, Serialize};

/// A single typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Json(serde_json::Value),
}

impl AttributeValue {
    /// Numeric view of the value. Numeric strings are parsed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::String(value) => value.trim().parse().ok(),
            Self::Json(value) => value.as_f64(),
            Self::Bool(_) => None,
        }
    }

    /// String view of the value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            Self::Json(value) => value.as_str(),
            _ => None,
        }
    }

    /// Loose truthiness as understood by the host frontend: `false`, `0`,
    /// `NaN`, `""` and `null` are falsy, everything else is truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Int(value) => *value != 0,
            Self::Float(value) => *value != 0.0 && !value.is_nan(),
            Self::String(value) => !value.is_empty(),
            Self::Json(value) => match value {
                serde_json::Value::Null => false,
                serde_json::Value::Bool(value) => *value,
                serde_json::Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
                serde_json::Value::String(value) => !value.is_empty(),
                serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
            },
        }
    }
}
