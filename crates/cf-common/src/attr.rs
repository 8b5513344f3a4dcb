//! Attribute values and attribute maps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attribute map keyed by attribute name.
///
/// A `BTreeMap` keeps iteration order deterministic, which the checking
/// engines rely on for byte-identical report output across runs.
pub type AttrMap = BTreeMap<String, AttrValue>;

/// A single attribute value: a string, a number, or a list of either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Str(String),
    Num(f64),
    NumList(Vec<f64>),
    StrList(Vec<String>),
}

impl AttrValue {
    /// Get the value as a string slice, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as a number, if it is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// Render the value as display text for report messages.
    pub fn display_text(&self) -> String {
        match self {
            AttrValue::Str(s) => s.clone(),
            AttrValue::Num(n) => format!("{}", n),
            AttrValue::NumList(values) => format!("{:?}", values),
            AttrValue::StrList(values) => format!("{:?}", values),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Num(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_value_accessors() {
        assert_eq!(AttrValue::from("degrees_north").as_str(), Some("degrees_north"));
        assert_eq!(AttrValue::from("degrees_north").as_f64(), None);
        assert_eq!(AttrValue::from(1.5).as_f64(), Some(1.5));
        assert_eq!(AttrValue::from(1.5).as_str(), None);
    }

    #[test]
    fn test_attr_value_json_shape() {
        let json = serde_json::to_string(&AttrValue::from("CF-1.12")).unwrap();
        assert_eq!(json, "\"CF-1.12\"");
        let json = serde_json::to_string(&AttrValue::Num(-999.0)).unwrap();
        assert_eq!(json, "-999.0");
    }
}
