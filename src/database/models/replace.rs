use serde_json::{Map, Value};
use thiserror::Error;

/// Name of the body key that unlocks relationship fields. Never counted as a field.
pub const OVERRIDE_KEY: &str = "override";

#[derive(Debug, Error, PartialEq)]
pub enum ReplaceError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("No fields provided for update")]
    NoFields,

    #[error("Only one field can be updated at a time (got {})", .0.join(", "))]
    TooManyFields(Vec<String>),

    #[error("Field '{0}' cannot be replaced")]
    UnknownField(String),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("'override' must be a boolean")]
    InvalidOverride,
}

/// The allow-listed single fields a PATCH may target on one entity type.
pub trait ReplaceField: Sized {
    const ALLOWED: &'static [&'static str];

    /// Build the field from an allow-listed name and its JSON value.
    fn parse(name: &str, value: Value) -> Result<Self, serde_json::Error>;

    fn name(&self) -> &'static str;

    /// Relationship fields need `override: true`.
    fn is_relationship(&self) -> bool {
        false
    }

    /// The stored value the field writes.
    fn value(&self) -> Value;
}

/// A parsed single-field replace: exactly one business field plus the override flag.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceRequest<F> {
    pub field: F,
    pub override_relationships: bool,
}

impl<F: ReplaceField> ReplaceRequest<F> {
    pub fn parse(body: Value) -> Result<Self, ReplaceError> {
        let Value::Object(mut map) = body else {
            return Err(ReplaceError::NotAnObject);
        };

        let override_relationships = match map.remove(OVERRIDE_KEY) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => b,
            Some(_) => return Err(ReplaceError::InvalidOverride),
        };

        let (name, value) = Self::single_entry(map)?;
        if !F::ALLOWED.contains(&name.as_str()) {
            return Err(ReplaceError::UnknownField(name));
        }

        let field = F::parse(&name, value).map_err(|e| ReplaceError::InvalidValue {
            field: name.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self { field, override_relationships })
    }

    fn single_entry(map: Map<String, Value>) -> Result<(String, Value), ReplaceError> {
        if map.len() > 1 {
            return Err(ReplaceError::TooManyFields(map.keys().cloned().collect()));
        }
        map.into_iter().next().ok_or(ReplaceError::NoFields)
    }
}
