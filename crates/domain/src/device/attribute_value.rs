//! Typed metric values attached to devices.

use serde::{Deserialize, Serialize};

/// A single typed metric value.
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
    /// Numeric view of the value; integers widen to `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::Json(v) => v.as_f64(),
            _ => None,
        }
    }

    /// Integer view of the value; floats only when they carry no fraction.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            Self::Json(v) => v.as_i64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            Self::Json(v) => v.as_str(),
            _ => None,
        }
    }

    /// String list view: a single string counts as a one-element list.
    #[must_use]
    pub fn as_str_list(&self) -> Option<Vec<&str>> {
        match self {
            Self::String(v) => Some(vec![v.as_str()]),
            Self::Json(serde_json::Value::Array(items)) => {
                items.iter().map(serde_json::Value::as_str).collect()
            }
            Self::Json(serde_json::Value::String(v)) => Some(vec![v.as_str()]),
            _ => None,
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}
