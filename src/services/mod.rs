pub mod area_service;
pub mod department_service;
pub mod employee_service;
pub mod manager_service;

pub use area_service::AreaService;
pub use department_service::DepartmentService;
pub use employee_service::EmployeeService;
pub use manager_service::ManagerService;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::database::models::{to_document, ReplaceError, ReplaceField, ReplaceRequest};
use crate::database::store::{Collection, Document, StoreError};

/// Failure taxonomy shared by the integrity services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} {key} not found")]
    NotFound { entity: Collection, key: String },

    #[error("{entity} with id '{key}' does not exist")]
    ReferenceNotFound { entity: Collection, key: String },

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{entity} {key} is in use by {count} {dependents} record(s); use force=true to delete it anyway")]
    InUse {
        entity: Collection,
        key: String,
        count: usize,
        dependents: Collection,
    },

    #[error("{entity} {key} already exists")]
    DuplicateKey { entity: Collection, key: String },

    #[error("no {entity} numbers left after the highest id; supply an explicit id")]
    KeysExhausted { entity: Collection },

    #[error("Error {context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(entity: Collection, key: impl ToString) -> Self {
        ServiceError::NotFound { entity, key: key.to_string() }
    }

    pub fn reference_not_found(entity: Collection, key: impl ToString) -> Self {
        ServiceError::ReferenceNotFound { entity, key: key.to_string() }
    }
}

impl From<ReplaceError> for ServiceError {
    fn from(err: ReplaceError) -> Self {
        ServiceError::InvalidRequest(err.to_string())
    }
}

/// Attach the failing operation to a store error, keeping duplicate keys distinguishable.
pub trait StoreContext<T> {
    fn context(self, context: &'static str) -> ServiceResult<T>;
}

impl<T> StoreContext<T> for Result<T, StoreError> {
    fn context(self, context: &'static str) -> ServiceResult<T> {
        self.map_err(|err| match err {
            StoreError::DuplicateKey { collection, key } => ServiceError::DuplicateKey { entity: collection, key },
            StoreError::KeysExhausted(collection) => ServiceError::KeysExhausted { entity: collection },
            source => {
                tracing::error!(context, error = %source, "store operation failed");
                ServiceError::Store { context, source }
            }
        })
    }
}

impl<T> StoreContext<T> for Result<T, serde_json::Error> {
    fn context(self, context: &'static str) -> ServiceResult<T> {
        self.map_err(StoreError::from).context(context)
    }
}

/// Response body of a successful DELETE.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteConfirmation {
    pub message: String,
    pub key: Value,
    /// Dependent records whose reference was set to null
    pub detached: usize,
}

/// First phase of a deletion: the record and how many records still reference it.
#[derive(Debug, Clone)]
pub struct DeletePlan<T> {
    pub record: T,
    pub dependents: usize,
}

impl<T> DeletePlan<T> {
    /// Refuse the deletion when dependents exist and the caller did not force it.
    pub fn authorize(self, entity: Collection, key: impl ToString, dependents: Collection, force: bool) -> ServiceResult<Self> {
        if self.dependents > 0 && !force {
            let key = key.to_string();
            tracing::warn!(%entity, %key, dependents = self.dependents, "delete blocked by dependents");
            return Err(ServiceError::InUse {
                entity,
                key,
                count: self.dependents,
                dependents,
            });
        }
        Ok(self)
    }
}

/// Numeric queries match the unique key exactly; anything else is a name search.
pub(crate) fn numeric_query(query: &str) -> Option<i64> {
    query.trim().parse::<i64>().ok()
}

/// Check a single-field replace against the current record. Relationship fields may only
/// change with override; returns true when the new reference must be verified to exist.
pub(crate) fn relationship_guard<F, T>(entity: Collection, request: &ReplaceRequest<F>, current: &T) -> ServiceResult<bool>
where
    F: ReplaceField,
    T: Serialize,
{
    let field = &request.field;
    if !field.is_relationship() {
        return Ok(false);
    }

    let current = to_document(current).context("reading current record")?;
    let new_value = field.value();
    if current.get(field.name()).unwrap_or(&Value::Null) == &new_value {
        return Ok(false);
    }

    if !request.override_relationships {
        tracing::warn!(%entity, field = field.name(), "relationship change without override rejected");
        return Err(ServiceError::InvalidRequest(format!(
            "The {} of a {} cannot be changed directly; resend with \"override\": true",
            field.name(),
            entity
        )));
    }

    Ok(!new_value.is_null())
}

/// The single-entry change document a replace writes.
pub(crate) fn single_change<F: ReplaceField>(field: &F) -> Document {
    let mut changes = Document::new();
    changes.insert(field.name().to_string(), field.value());
    changes
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use crate::database::memory::MemoryStore;
    use crate::database::models::{Area, Department, Employee, Gender, Manager, Shift};
    use crate::database::repository::Repository;
    use crate::database::store::DocumentStore;

    /// A small org: two managers, two areas, three departments, three employees.
    ///
    /// Department 1 (IT) is run by manager 1 in area "tech"; department 2 (Support) by
    /// manager 1 in area "tech"; department 3 (Legal) by manager 2 in area "corp".
    /// Employee 101 works in 1 and 2, employee 102 in 2, employee 103 in 3.
    pub async fn seeded_store() -> Arc<dyn DocumentStore> {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());

        let areas = Repository::<Area>::new(store.clone());
        for (id, name) in [("tech", "Technology"), ("corp", "Corporate")] {
            areas
                .insert(&Area { area_id: id.into(), name: name.into(), building: Some("Building A".into()) })
                .await
                .unwrap();
        }

        let managers = Repository::<Manager>::new(store.clone());
        for (id, name) in [(1, "Roberto Sanchez"), (2, "Alejandra Ortiz")] {
            managers
                .insert(&Manager { manager_id: id, name: name.into(), education: "Law".into(), shift: Shift::Morning })
                .await
                .unwrap();
        }

        let departments = Repository::<Department>::new(store.clone());
        for (n, name, manager, area) in [(1, "IT", 1, "tech"), (2, "Support", 1, "tech"), (3, "Legal", 2, "corp")] {
            departments
                .insert(&Department {
                    department_number: n,
                    name: name.into(),
                    manager: Some(manager),
                    area: Some(area.into()),
                })
                .await
                .unwrap();
        }

        let employees = Repository::<Employee>::new(store.clone());
        let now = chrono::Utc::now();
        for (n, first, last, d1, d2) in [
            (101, "Carlos", "Gomez", Some(1), Some(2)),
            (102, "Juan", "Perez", Some(2), None),
            (103, "Luis", "Fernandez", Some(3), None),
        ] {
            employees
                .insert(&Employee {
                    employee_number: n,
                    first_name: first.into(),
                    last_name: last.into(),
                    age: 30,
                    gender: Gender::Male,
                    department1: d1,
                    department2: d2,
                    department3: None,
                    created_at: now,
                    updated_at: now,
                })
                .await
                .unwrap();
        }

        store
    }
}
