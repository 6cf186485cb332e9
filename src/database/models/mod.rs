pub mod area;
pub mod department;
pub mod employee;
pub mod manager;
pub mod replace;

pub use area::{Area, AreaChanges, AreaField, AreaSearchHit, NewArea};
pub use department::{
    Department, DepartmentChanges, DepartmentField, DepartmentSearchHit, DepartmentView, NewDepartment,
};
pub use employee::{
    DepartmentSlot, Employee, EmployeeChanges, EmployeeField, EmployeeSearchHit, EmployeeView, Gender, NewEmployee,
};
pub use manager::{Manager, ManagerChanges, ManagerField, ManagerSearchHit, NewManager, Shift};
pub use replace::{ReplaceError, ReplaceField, ReplaceRequest};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::database::store::{Collection, Document};

/// A record type stored in one collection and addressed by its unique key.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Key: Serialize + std::fmt::Display + Clone + Send + Sync;

    const COLLECTION: Collection;

    fn key(&self) -> Self::Key;
}

/// Keeps "field absent" (`None`) apart from "field set to null" (`Some(None)`).
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub fn to_document<T: Serialize>(value: &T) -> Result<Document, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!("expected a JSON object, got {}", other))),
    }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(doc))
}
