use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use super::{
    numeric_query, relationship_guard, single_change, DeleteConfirmation, DeletePlan, ServiceError, ServiceResult,
    StoreContext,
};
use crate::database::models::{
    to_document, Department, Manager, ManagerChanges, ManagerField, ManagerSearchHit, NewManager, ReplaceField,
    ReplaceRequest,
};
use crate::database::repository::Repository;
use crate::database::store::{Collection, DocumentStore};
use crate::filter::Filter;

/// Managers; departments point at them through `manager`.
pub struct ManagerService {
    managers: Repository<Manager>,
    departments: Repository<Department>,
}

impl ManagerService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            managers: Repository::new(store.clone()),
            departments: Repository::new(store),
        }
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<Manager>> {
        self.managers.select_all().await.context("fetching managers")
    }

    pub async fn get_by_id(&self, manager_id: i64) -> ServiceResult<Manager> {
        self.managers
            .select_one(&manager_id)
            .await
            .context("fetching manager")?
            .ok_or_else(|| ServiceError::not_found(Collection::Manager, manager_id))
    }

    pub async fn search(&self, query: &str) -> ServiceResult<Vec<ManagerSearchHit>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let filter = match numeric_query(query) {
            Some(id) => Filter::eq("managerId", id),
            None => Filter::ilike("name", query.trim()),
        };
        let found = self.managers.select_any(filter).await.context("searching managers")?;
        Ok(found.into_iter().map(ManagerSearchHit::from).collect())
    }

    pub async fn create(&self, new: NewManager) -> ServiceResult<Manager> {
        let manager_id = match new.manager_id {
            Some(id) => id,
            None => self.managers.next_number().await.context("numbering manager")?,
        };
        let manager = new.into_manager(manager_id);
        self.managers.insert(&manager).await.context("creating manager")?;

        info!(manager_id, name = %manager.name, "manager created");
        Ok(manager)
    }

    pub async fn update(&self, manager_id: i64, changes: ManagerChanges) -> ServiceResult<Manager> {
        let current = self.get_by_id(manager_id).await?;
        let changes = to_document(&changes).context("updating manager")?;
        let renamed = changes.get("name").and_then(Value::as_str).is_some_and(|n| n != current.name);

        self.managers.update_one(&manager_id, changes).await.context("updating manager")?;
        if renamed {
            self.log_rename(manager_id).await?;
        }

        info!(manager_id, "manager updated");
        self.get_by_id(manager_id).await
    }

    pub async fn replace(&self, manager_id: i64, body: Value) -> ServiceResult<Manager> {
        let current = self.get_by_id(manager_id).await?;
        let request = ReplaceRequest::<ManagerField>::parse(body)?;
        relationship_guard(Collection::Manager, &request, &current)?;

        self.managers
            .update_one(&manager_id, single_change(&request.field))
            .await
            .context("updating manager")?;
        if matches!(&request.field, ManagerField::Name(name) if *name != current.name) {
            self.log_rename(manager_id).await?;
        }

        info!(manager_id, field = request.field.name(), "manager field replaced");
        self.get_by_id(manager_id).await
    }

    /// Stage, guard and apply a deletion.
    pub async fn delete(&self, manager_id: i64, force: bool) -> ServiceResult<DeleteConfirmation> {
        let plan = self
            .stage_delete(manager_id)
            .await?
            .authorize(Collection::Manager, manager_id, Collection::Department, force)?;
        self.apply_delete(plan).await
    }

    pub async fn stage_delete(&self, manager_id: i64) -> ServiceResult<DeletePlan<Manager>> {
        let record = self.get_by_id(manager_id).await?;
        let dependents = self
            .departments
            .count(Filter::eq("manager", manager_id))
            .await
            .context("deleting manager")?;
        Ok(DeletePlan { record, dependents })
    }

    /// Detach departments first, then remove the manager. Safe to rerun.
    pub async fn apply_delete(&self, plan: DeletePlan<Manager>) -> ServiceResult<DeleteConfirmation> {
        let manager_id = plan.record.manager_id;
        let detached = self
            .departments
            .detach("manager", Value::from(manager_id))
            .await
            .context("deleting manager")?;
        if !self.managers.delete_one(&manager_id).await.context("deleting manager")? {
            return Err(ServiceError::not_found(Collection::Manager, manager_id));
        }

        info!(manager_id, detached, "manager deleted");
        Ok(DeleteConfirmation {
            message: format!("Manager {} has been successfully deleted.", manager_id),
            key: Value::from(manager_id),
            detached: plan.dependents,
        })
    }

    async fn log_rename(&self, manager_id: i64) -> ServiceResult<()> {
        let observers = self
            .departments
            .count(Filter::eq("manager", manager_id))
            .await
            .context("renaming manager")?;
        info!(manager_id, departments = observers, "manager renamed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Shift;
    use crate::services::testing::seeded_store;
    use crate::services::DepartmentService;
    use serde_json::json;

    #[tokio::test]
    async fn create_numbers_after_the_highest_id() {
        let service = ManagerService::new(seeded_store().await);
        let created = service
            .create(NewManager {
                manager_id: None,
                name: "Diego Torres".into(),
                education: "Cybersecurity".into(),
                shift: Shift::Afternoon,
            })
            .await
            .unwrap();
        assert_eq!(created.manager_id, 3);
    }

    #[tokio::test]
    async fn explicit_duplicate_id_is_rejected() {
        let service = ManagerService::new(seeded_store().await);
        let err = service
            .create(NewManager {
                manager_id: Some(1),
                name: "Copy".into(),
                education: "None".into(),
                shift: Shift::Night,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateKey { entity: Collection::Manager, .. }));
    }

    #[tokio::test]
    async fn numbering_past_the_largest_id_is_a_conflict() {
        let service = ManagerService::new(seeded_store().await);
        service
            .create(NewManager {
                manager_id: Some(i64::MAX),
                name: "Last".into(),
                education: "None".into(),
                shift: Shift::Night,
            })
            .await
            .unwrap();

        let err = service
            .create(NewManager {
                manager_id: None,
                name: "Overflow".into(),
                education: "None".into(),
                shift: Shift::Night,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::KeysExhausted { entity: Collection::Manager }));
        assert_eq!(service.get_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn rename_is_visible_from_departments() {
        let store = seeded_store().await;
        let managers = ManagerService::new(store.clone());
        let departments = DepartmentService::new(store);

        managers.replace(1, json!({"name": "Roberto S."})).await.unwrap();

        let names: Vec<_> = departments
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .filter_map(|d| d.manager.map(|m| m.name))
            .collect();
        assert!(names.iter().any(|n| n == "Roberto S."));
        assert!(names.iter().all(|n| n != "Roberto Sanchez"));
    }

    #[tokio::test]
    async fn replace_rejects_two_fields_without_writing() {
        let service = ManagerService::new(seeded_store().await);
        let err = service
            .replace(1, json!({"name": "X", "education": "Y"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest(_)));
        assert_eq!(service.get_by_id(1).await.unwrap().name, "Roberto Sanchez");
    }

    #[tokio::test]
    async fn delete_in_use_needs_force() {
        let store = seeded_store().await;
        let service = ManagerService::new(store.clone());

        let err = service.delete(1, false).await.unwrap_err();
        assert!(matches!(err, ServiceError::InUse { count: 2, .. }));
        assert!(service.get_by_id(1).await.is_ok());

        let done = service.delete(1, true).await.unwrap();
        assert_eq!(done.detached, 2);
        assert!(matches!(service.get_by_id(1).await, Err(ServiceError::NotFound { .. })));

        let departments = Repository::<Department>::new(store);
        let orphaned = departments.select_any(Filter::eq("manager", Value::Null)).await.unwrap();
        assert_eq!(orphaned.len(), 2);
        assert!(matches!(service.delete(1, true).await, Err(ServiceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn search_by_id_or_name() {
        let service = ManagerService::new(seeded_store().await);
        let by_id = service.search("2").await.unwrap();
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].name, "Alejandra Ortiz");

        assert_eq!(service.search("sANCH").await.unwrap().len(), 1);
        assert!(service.search("nobody").await.unwrap().is_empty());
        assert!(service.search("%").await.unwrap().is_empty());
        assert!(service.search("\t").await.unwrap().is_empty());
    }
}
