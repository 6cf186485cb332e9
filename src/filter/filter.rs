use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::FilterError;
use super::types::{FilterOp, FilterWhereInfo};

/// Predicate over stored documents, evaluated in memory or compiled to SQL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    All,
    Where(FilterWhereInfo),
    #[serde(rename = "$or")]
    Or(Vec<Filter>),
}

impl Filter {
    pub fn all() -> Self {
        Filter::All
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Where(FilterWhereInfo { field: field.into(), operator: FilterOp::Eq, data: value.into() })
    }

    /// Case-insensitive "contains"; `%` and `_` in `needle` are literal.
    pub fn ilike(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Filter::Where(FilterWhereInfo {
            field: field.into(),
            operator: FilterOp::ILike,
            data: Value::String(needle.into()),
        })
    }

    pub fn is_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Filter::Where(FilterWhereInfo { field: field.into(), operator: FilterOp::In, data: Value::Array(values) })
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Or(filters)
    }

    /// Field names end up inside SQL JSON paths, so only identifier characters are allowed.
    pub fn validate(&self) -> Result<(), FilterError> {
        match self {
            Filter::All => Ok(()),
            Filter::Where(info) => {
                let valid = !info.field.is_empty()
                    && info.field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
                if !valid {
                    return Err(FilterError::InvalidField(info.field.clone()));
                }
                match (&info.operator, &info.data) {
                    (FilterOp::ILike, Value::String(_)) | (FilterOp::In, Value::Array(_)) | (FilterOp::Eq, _) => Ok(()),
                    (FilterOp::ILike, _) => Err(FilterError::InvalidOperatorData("$ilike requires a string".to_string())),
                    (FilterOp::In, _) => Err(FilterError::InvalidOperatorData("$in requires an array".to_string())),
                }
            }
            Filter::Or(filters) => filters.iter().try_for_each(Filter::validate),
        }
    }

    pub fn matches(&self, doc: &Map<String, Value>) -> bool {
        match self {
            Filter::All => true,
            Filter::Where(info) => {
                let value = doc.get(&info.field).unwrap_or(&Value::Null);
                match info.operator {
                    FilterOp::Eq => value == &info.data,
                    FilterOp::ILike => match (value, &info.data) {
                        (Value::String(haystack), Value::String(needle)) => {
                            haystack.to_lowercase().contains(&needle.to_lowercase())
                        }
                        _ => false,
                    },
                    FilterOp::In => match &info.data {
                        Value::Array(candidates) => candidates.iter().any(|c| c == value),
                        _ => false,
                    },
                }
            }
            Filter::Or(filters) => filters.iter().any(|f| f.matches(doc)),
        }
    }
}
