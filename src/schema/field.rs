//! Field declarations, typed values and front-matter coercion

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;
use crate::helpers::parse_date_string;

/// Primitive type of a declared front-matter field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Date,
    Number,
    Boolean,
    /// A list of strings (a single string is accepted as a one-item list)
    List,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Date => "date",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::List => "list",
        };
        f.write_str(name)
    }
}

/// A declared field: its type and whether documents must provide it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    #[serde(rename = "type")]
    pub ty: FieldType,
    #[serde(default)]
    pub required: bool,
}

impl FieldDef {
    pub fn required(ty: FieldType) -> Self {
        Self { ty, required: true }
    }

    pub fn optional(ty: FieldType) -> Self {
        Self {
            ty,
            required: false,
        }
    }
}

/// A validated field or computed value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Number(f64),
    Bool(bool),
    Date(DateTime<FixedOffset>),
    List(Vec<FieldValue>),
    Map(IndexMap<String, FieldValue>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            FieldValue::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<usize> for FieldValue {
    fn from(n: usize) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// Short name of a YAML value's kind, used in mismatch errors
pub(crate) fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "boolean",
        serde_yaml::Value::Number(_) => "number",
        serde_yaml::Value::String(_) => "string",
        serde_yaml::Value::Sequence(_) => "list",
        serde_yaml::Value::Mapping(_) => "mapping",
        serde_yaml::Value::Tagged(_) => "tagged value",
    }
}

impl FieldType {
    /// Coerce a raw front-matter value into this type
    pub fn coerce(&self, field: &str, value: &serde_yaml::Value) -> Result<FieldValue, ValidationError> {
        let mismatch = || ValidationError::TypeMismatch {
            field: field.to_string(),
            expected: *self,
            found: yaml_kind(value),
        };

        match (self, value) {
            (FieldType::String, serde_yaml::Value::String(s)) => Ok(FieldValue::String(s.clone())),
            (FieldType::Number, serde_yaml::Value::Number(n)) => {
                n.as_f64().map(FieldValue::Number).ok_or_else(mismatch)
            }
            (FieldType::Boolean, serde_yaml::Value::Bool(b)) => Ok(FieldValue::Bool(*b)),
            (FieldType::Date, serde_yaml::Value::String(s)) => parse_date_string(s)
                .map(FieldValue::Date)
                .ok_or_else(|| ValidationError::InvalidDate {
                    field: field.to_string(),
                    value: s.clone(),
                }),
            (FieldType::List, serde_yaml::Value::String(s)) => {
                Ok(FieldValue::List(vec![FieldValue::String(s.clone())]))
            }
            (FieldType::List, serde_yaml::Value::Sequence(items)) => items
                .iter()
                .map(|item| match item {
                    serde_yaml::Value::String(s) => Ok(FieldValue::String(s.clone())),
                    _ => Err(mismatch()),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(FieldValue::List),
            _ => Err(mismatch()),
        }
    }
}
