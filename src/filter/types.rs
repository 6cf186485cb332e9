use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    /// Exact JSON equality; `null` also matches a missing field
    #[serde(rename = "$eq")] Eq,
    /// Case-insensitive substring match on a string field
    #[serde(rename = "$ilike")] ILike,
    #[serde(rename = "$in")] In,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterWhereInfo {
    pub field: String,
    pub operator: FilterOp,
    pub data: Value,
}

/// A bound SQL parameter. Document fields compare as JSONB, pattern matches as text.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Json(Value),
    Text(String),
}
