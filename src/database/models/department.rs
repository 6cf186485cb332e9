use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::replace::ReplaceField;
use super::{Area, Entity, Manager};
use crate::database::store::Collection;

/// Stored department. `manager` and `area` hold the referenced keys, never names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub department_number: i64,
    pub name: String,
    #[serde(default)]
    pub manager: Option<i64>,
    #[serde(default)]
    pub area: Option<String>,
}

impl Entity for Department {
    type Key = i64;

    const COLLECTION: Collection = Collection::Department;

    fn key(&self) -> i64 {
        self.department_number
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDepartment {
    pub department_number: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub manager: Option<i64>,
    #[serde(default)]
    pub area: Option<String>,
}

impl NewDepartment {
    pub fn into_department(self, department_number: i64) -> Department {
        Department {
            department_number,
            name: self.name,
            manager: self.manager,
            area: self.area,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "super::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub manager: Option<Option<i64>>,
    #[serde(
        default,
        deserialize_with = "super::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub area: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DepartmentField {
    Name(String),
    Manager(Option<i64>),
    Area(Option<String>),
}

impl ReplaceField for DepartmentField {
    const ALLOWED: &'static [&'static str] = &["name", "manager", "area"];

    fn parse(name: &str, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match name {
            "name" => DepartmentField::Name(serde_json::from_value(value)?),
            "manager" => DepartmentField::Manager(serde_json::from_value(value)?),
            _ => DepartmentField::Area(serde_json::from_value(value)?),
        })
    }

    fn name(&self) -> &'static str {
        match self {
            DepartmentField::Name(_) => "name",
            DepartmentField::Manager(_) => "manager",
            DepartmentField::Area(_) => "area",
        }
    }

    fn is_relationship(&self) -> bool {
        !matches!(self, DepartmentField::Name(_))
    }

    fn value(&self) -> Value {
        match self {
            DepartmentField::Name(v) => Value::String(v.clone()),
            DepartmentField::Manager(v) => v.map(Value::from).unwrap_or(Value::Null),
            DepartmentField::Area(v) => v.clone().map(Value::String).unwrap_or(Value::Null),
        }
    }
}

/// Department with its manager and area joined in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentView {
    pub department_number: i64,
    pub name: String,
    pub manager: Option<Manager>,
    pub area: Option<Area>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSearchHit {
    pub id: i64,
    pub name: String,
    /// Manager name, resolved at read time
    pub manager: Option<String>,
    /// Area name, resolved at read time
    pub area: Option<String>,
    pub manager_id: Option<i64>,
    pub area_id: Option<String>,
}

impl DepartmentSearchHit {
    pub fn from_view(view: DepartmentView) -> Self {
        Self {
            id: view.department_number,
            name: view.name,
            manager_id: view.manager.as_ref().map(|m| m.manager_id),
            manager: view.manager.map(|m| m.name),
            area_id: view.area.as_ref().map(|a| a.area_id.clone()),
            area: view.area.map(|a| a.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::ReplaceRequest;
    use serde_json::json;

    #[test]
    fn relationship_fields_are_flagged() {
        let req = ReplaceRequest::<DepartmentField>::parse(json!({"manager": 3, "override": true})).unwrap();
        assert_eq!(req.field, DepartmentField::Manager(Some(3)));
        assert!(req.field.is_relationship());
        assert!(req.override_relationships);

        let req = ReplaceRequest::<DepartmentField>::parse(json!({"area": null})).unwrap();
        assert_eq!(req.field, DepartmentField::Area(None));
        assert!(req.field.is_relationship());

        let req = ReplaceRequest::<DepartmentField>::parse(json!({"name": "Ops"})).unwrap();
        assert!(!req.field.is_relationship());
    }

    #[test]
    fn stored_department_tolerates_missing_references() {
        let d: Department = serde_json::from_value(json!({"departmentNumber": 4, "name": "Marketing"})).unwrap();
        assert_eq!(d.manager, None);
        assert_eq!(d.area, None);
    }
}
