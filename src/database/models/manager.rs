use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::replace::ReplaceField;
use super::Entity;
use crate::database::store::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shift {
    Morning,
    Afternoon,
    Night,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manager {
    pub manager_id: i64,
    pub name: String,
    pub education: String,
    pub shift: Shift,
}

impl Entity for Manager {
    type Key = i64;

    const COLLECTION: Collection = Collection::Manager;

    fn key(&self) -> i64 {
        self.manager_id
    }
}

/// POST /manager body. `managerId` is assigned when omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewManager {
    pub manager_id: Option<i64>,
    pub name: String,
    pub education: String,
    pub shift: Shift,
}

impl NewManager {
    pub fn into_manager(self, manager_id: i64) -> Manager {
        Manager {
            manager_id,
            name: self.name,
            education: self.education,
            shift: self.shift,
        }
    }
}

/// PUT /manager/:id body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift: Option<Shift>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ManagerField {
    Name(String),
    Education(String),
    Shift(Shift),
}

impl ReplaceField for ManagerField {
    const ALLOWED: &'static [&'static str] = &["name", "education", "shift"];

    fn parse(name: &str, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match name {
            "name" => ManagerField::Name(serde_json::from_value(value)?),
            "education" => ManagerField::Education(serde_json::from_value(value)?),
            _ => ManagerField::Shift(serde_json::from_value(value)?),
        })
    }

    fn name(&self) -> &'static str {
        match self {
            ManagerField::Name(_) => "name",
            ManagerField::Education(_) => "education",
            ManagerField::Shift(_) => "shift",
        }
    }

    fn value(&self) -> Value {
        match self {
            ManagerField::Name(v) | ManagerField::Education(v) => Value::String(v.clone()),
            ManagerField::Shift(s) => serde_json::to_value(s).unwrap_or(Value::Null),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerSearchHit {
    pub id: i64,
    pub name: String,
    pub education: String,
    pub shift: Shift,
}

impl From<Manager> for ManagerSearchHit {
    fn from(m: Manager) -> Self {
        Self {
            id: m.manager_id,
            name: m.name,
            education: m.education,
            shift: m.shift,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::replace::{ReplaceError, ReplaceRequest};
    use serde_json::json;

    #[test]
    fn replace_accepts_one_field() {
        let req = ReplaceRequest::<ManagerField>::parse(json!({"name": "X"})).unwrap();
        assert_eq!(req.field, ManagerField::Name("X".to_string()));
        assert!(!req.override_relationships);
    }

    #[test]
    fn replace_rejects_two_fields() {
        let err = ReplaceRequest::<ManagerField>::parse(json!({"name": "X", "education": "Y"})).unwrap_err();
        assert!(matches!(err, ReplaceError::TooManyFields(fields) if fields.len() == 2));
    }

    #[test]
    fn replace_ignores_override_when_counting() {
        let req = ReplaceRequest::<ManagerField>::parse(json!({"shift": "Night", "override": true})).unwrap();
        assert_eq!(req.field, ManagerField::Shift(Shift::Night));
        assert!(req.override_relationships);
    }

    #[test]
    fn replace_rejects_unknown_empty_and_bad_values() {
        assert_eq!(
            ReplaceRequest::<ManagerField>::parse(json!({"managerId": 9})).unwrap_err(),
            ReplaceError::UnknownField("managerId".to_string())
        );
        assert_eq!(
            ReplaceRequest::<ManagerField>::parse(json!({"override": true})).unwrap_err(),
            ReplaceError::NoFields
        );
        assert!(matches!(
            ReplaceRequest::<ManagerField>::parse(json!({"shift": "Dawn"})).unwrap_err(),
            ReplaceError::InvalidValue { .. }
        ));
        assert_eq!(
            ReplaceRequest::<ManagerField>::parse(json!({"name": "X", "override": "yes"})).unwrap_err(),
            ReplaceError::InvalidOverride
        );
    }

    #[test]
    fn changes_serialize_only_present_fields() {
        let changes: ManagerChanges = serde_json::from_value(json!({"education": "MBA", "managerId": 4})).unwrap();
        let doc = crate::database::models::to_document(&changes).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc["education"], "MBA");
    }
}
