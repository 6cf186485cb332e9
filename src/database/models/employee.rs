use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::replace::ReplaceField;
use super::{Department, Entity};
use crate::database::store::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// One of the three independent department references an employee carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartmentSlot {
    First,
    Second,
    Third,
}

impl DepartmentSlot {
    pub const ALL: [DepartmentSlot; 3] = [DepartmentSlot::First, DepartmentSlot::Second, DepartmentSlot::Third];

    pub fn field_name(&self) -> &'static str {
        match self {
            DepartmentSlot::First => "department1",
            DepartmentSlot::Second => "department2",
            DepartmentSlot::Third => "department3",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub employee_number: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: Gender,
    #[serde(default)]
    pub department1: Option<i64>,
    #[serde(default)]
    pub department2: Option<i64>,
    #[serde(default)]
    pub department3: Option<i64>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn department(&self, slot: DepartmentSlot) -> Option<i64> {
        match slot {
            DepartmentSlot::First => self.department1,
            DepartmentSlot::Second => self.department2,
            DepartmentSlot::Third => self.department3,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for Employee {
    type Key = i64;

    const COLLECTION: Collection = Collection::Employee;

    fn key(&self) -> i64 {
        self.employee_number
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub employee_number: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: Gender,
    #[serde(default)]
    pub department1: Option<i64>,
    #[serde(default)]
    pub department2: Option<i64>,
    #[serde(default)]
    pub department3: Option<i64>,
}

impl NewEmployee {
    pub fn departments(&self) -> [(DepartmentSlot, Option<i64>); 3] {
        [
            (DepartmentSlot::First, self.department1),
            (DepartmentSlot::Second, self.department2),
            (DepartmentSlot::Third, self.department3),
        ]
    }

    pub fn into_employee(self, employee_number: i64, now: DateTime<Utc>) -> Employee {
        Employee {
            employee_number,
            first_name: self.first_name,
            last_name: self.last_name,
            age: self.age,
            gender: self.gender,
            department1: self.department1,
            department2: self.department2,
            department3: self.department3,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "super::double_option", skip_serializing_if = "Option::is_none")]
    pub department1: Option<Option<i64>>,
    #[serde(default, deserialize_with = "super::double_option", skip_serializing_if = "Option::is_none")]
    pub department2: Option<Option<i64>>,
    #[serde(default, deserialize_with = "super::double_option", skip_serializing_if = "Option::is_none")]
    pub department3: Option<Option<i64>>,
}

impl EmployeeChanges {
    /// Department references being set to a value (explicit nulls need no check).
    pub fn assigned_departments(&self) -> Vec<(DepartmentSlot, i64)> {
        [
            (DepartmentSlot::First, self.department1),
            (DepartmentSlot::Second, self.department2),
            (DepartmentSlot::Third, self.department3),
        ]
        .into_iter()
        .filter_map(|(slot, v)| v.flatten().map(|n| (slot, n)))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmployeeField {
    FirstName(String),
    LastName(String),
    Age(u32),
    Gender(Gender),
    Department(DepartmentSlot, Option<i64>),
}

impl ReplaceField for EmployeeField {
    const ALLOWED: &'static [&'static str] = &[
        "firstName",
        "lastName",
        "age",
        "gender",
        "department1",
        "department2",
        "department3",
    ];

    fn parse(name: &str, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match name {
            "firstName" => EmployeeField::FirstName(serde_json::from_value(value)?),
            "lastName" => EmployeeField::LastName(serde_json::from_value(value)?),
            "age" => EmployeeField::Age(serde_json::from_value(value)?),
            "gender" => EmployeeField::Gender(serde_json::from_value(value)?),
            "department1" => EmployeeField::Department(DepartmentSlot::First, serde_json::from_value(value)?),
            "department2" => EmployeeField::Department(DepartmentSlot::Second, serde_json::from_value(value)?),
            _ => EmployeeField::Department(DepartmentSlot::Third, serde_json::from_value(value)?),
        })
    }

    fn name(&self) -> &'static str {
        match self {
            EmployeeField::FirstName(_) => "firstName",
            EmployeeField::LastName(_) => "lastName",
            EmployeeField::Age(_) => "age",
            EmployeeField::Gender(_) => "gender",
            EmployeeField::Department(slot, _) => slot.field_name(),
        }
    }

    fn is_relationship(&self) -> bool {
        matches!(self, EmployeeField::Department(..))
    }

    fn value(&self) -> Value {
        match self {
            EmployeeField::FirstName(v) | EmployeeField::LastName(v) => Value::String(v.clone()),
            EmployeeField::Age(v) => Value::from(*v),
            EmployeeField::Gender(g) => serde_json::to_value(g).unwrap_or(Value::Null),
            EmployeeField::Department(_, n) => n.map(Value::from).unwrap_or(Value::Null),
        }
    }
}

/// Employee with its three departments joined in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeView {
    pub employee_number: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: Gender,
    pub department1: Option<Department>,
    pub department2: Option<Department>,
    pub department3: Option<Department>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSearchHit {
    pub id: i64,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: Gender,
    /// Names of the assigned departments, unassigned slots skipped
    pub departments: Vec<String>,
    pub department_numbers: Vec<i64>,
}

impl EmployeeSearchHit {
    pub fn from_view(view: EmployeeView) -> Self {
        let assigned: Vec<Department> = [view.department1, view.department2, view.department3]
            .into_iter()
            .flatten()
            .collect();
        Self {
            id: view.employee_number,
            name: format!("{} {}", view.first_name, view.last_name),
            first_name: view.first_name,
            last_name: view.last_name,
            age: view.age,
            gender: view.gender,
            departments: assigned.iter().map(|d| d.name.clone()).collect(),
            department_numbers: assigned.iter().map(|d| d.department_number).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{to_document, ReplaceError, ReplaceRequest};
    use serde_json::json;

    #[test]
    fn department_slots_need_override() {
        let req = ReplaceRequest::<EmployeeField>::parse(json!({"department2": 7})).unwrap();
        assert_eq!(req.field, EmployeeField::Department(DepartmentSlot::Second, Some(7)));
        assert!(req.field.is_relationship());
        assert_eq!(req.field.name(), "department2");
    }

    #[test]
    fn gender_outside_enum_is_rejected() {
        let err = ReplaceRequest::<EmployeeField>::parse(json!({"gender": "Other"})).unwrap_err();
        assert!(matches!(err, ReplaceError::InvalidValue { field, .. } if field == "gender"));
    }

    #[test]
    fn changes_list_assigned_departments_only() {
        let changes: EmployeeChanges =
            serde_json::from_value(json!({"department1": 3, "department2": null, "age": 41})).unwrap();
        assert_eq!(changes.assigned_departments(), vec![(DepartmentSlot::First, 3)]);
        let doc = to_document(&changes).unwrap();
        assert_eq!(doc["department2"], Value::Null);
        assert!(!doc.contains_key("department3"));
        assert_eq!(doc["age"], 41);
    }
}
