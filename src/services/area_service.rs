use std::sync::Arc;

use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use super::{
    numeric_query, relationship_guard, single_change, DeleteConfirmation, DeletePlan, ServiceError, ServiceResult,
    StoreContext,
};
use crate::database::models::{
    to_document, Area, AreaChanges, AreaField, AreaSearchHit, Department, NewArea, ReplaceField, ReplaceRequest,
};
use crate::database::repository::Repository;
use crate::database::store::{Collection, DocumentStore};
use crate::filter::Filter;

pub struct AreaService {
    areas: Repository<Area>,
    departments: Repository<Department>,
}

impl AreaService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            areas: Repository::new(store.clone()),
            departments: Repository::new(store),
        }
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<Area>> {
        self.areas.select_all().await.context("fetching areas")
    }

    pub async fn get_by_id(&self, area_id: &str) -> ServiceResult<Area> {
        self.areas
            .select_one(&area_id.to_string())
            .await
            .context("fetching area")?
            .ok_or_else(|| ServiceError::not_found(Collection::Area, area_id))
    }

    /// Numeric queries compare the key string; anything else matches the key exactly
    /// or the name as a substring.
    pub async fn search(&self, query: &str) -> ServiceResult<Vec<AreaSearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let filter = match numeric_query(query) {
            Some(_) => Filter::eq("areaId", query),
            None => Filter::or(vec![Filter::eq("areaId", query), Filter::ilike("name", query)]),
        };
        let found = self.areas.select_any(filter).await.context("searching areas")?;
        Ok(found.into_iter().map(AreaSearchHit::from).collect())
    }

    pub async fn create(&self, new: NewArea) -> ServiceResult<Area> {
        let area_id = new
            .area_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let area = new.into_area(area_id);
        self.areas.insert(&area).await.context("creating area")?;

        info!(area_id = %area.area_id, name = %area.name, "area created");
        Ok(area)
    }

    pub async fn update(&self, area_id: &str, changes: AreaChanges) -> ServiceResult<Area> {
        let current = self.get_by_id(area_id).await?;
        let changes = to_document(&changes).context("updating area")?;
        let renamed = changes.get("name").and_then(Value::as_str).is_some_and(|n| n != current.name);

        self.areas
            .update_one(&current.area_id, changes)
            .await
            .context("updating area")?;
        if renamed {
            self.log_rename(area_id).await?;
        }

        info!(area_id, "area updated");
        self.get_by_id(area_id).await
    }

    pub async fn replace(&self, area_id: &str, body: Value) -> ServiceResult<Area> {
        let current = self.get_by_id(area_id).await?;
        let request = ReplaceRequest::<AreaField>::parse(body)?;
        relationship_guard(Collection::Area, &request, &current)?;

        self.areas
            .update_one(&current.area_id, single_change(&request.field))
            .await
            .context("updating area")?;
        if matches!(&request.field, AreaField::Name(name) if *name != current.name) {
            self.log_rename(area_id).await?;
        }

        info!(area_id, field = request.field.name(), "area field replaced");
        self.get_by_id(area_id).await
    }

    pub async fn delete(&self, area_id: &str, force: bool) -> ServiceResult<DeleteConfirmation> {
        let plan = self
            .stage_delete(area_id)
            .await?
            .authorize(Collection::Area, area_id, Collection::Department, force)?;
        self.apply_delete(plan).await
    }

    pub async fn stage_delete(&self, area_id: &str) -> ServiceResult<DeletePlan<Area>> {
        let record = self.get_by_id(area_id).await?;
        let dependents = self
            .departments
            .count(Filter::eq("area", area_id))
            .await
            .context("deleting area")?;
        Ok(DeletePlan { record, dependents })
    }

    /// Detach departments first, then remove the area. Safe to rerun.
    pub async fn apply_delete(&self, plan: DeletePlan<Area>) -> ServiceResult<DeleteConfirmation> {
        let area_id = plan.record.area_id;
        let detached = self
            .departments
            .detach("area", Value::from(area_id.as_str()))
            .await
            .context("deleting area")?;
        if !self.areas.delete_one(&area_id).await.context("deleting area")? {
            return Err(ServiceError::not_found(Collection::Area, &area_id));
        }

        info!(area_id = %area_id, detached, "area deleted");
        Ok(DeleteConfirmation {
            message: format!("Area {} has been successfully deleted.", area_id),
            key: Value::from(area_id),
            detached: plan.dependents,
        })
    }

    async fn log_rename(&self, area_id: &str) -> ServiceResult<()> {
        let observers = self
            .departments
            .count(Filter::eq("area", area_id))
            .await
            .context("renaming area")?;
        info!(area_id, departments = observers, "area renamed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::seeded_store;
    use crate::services::DepartmentService;
    use serde_json::json;

    #[tokio::test]
    async fn create_without_id_assigns_uuid() {
        let service = AreaService::new(seeded_store().await);
        let area = service
            .create(NewArea { area_id: None, name: "Finance".into(), building: None })
            .await
            .unwrap();
        assert!(Uuid::parse_str(&area.area_id).is_ok());
        assert_eq!(service.get_by_id(&area.area_id).await.unwrap().name, "Finance");
    }

    #[tokio::test]
    async fn create_with_taken_id_conflicts() {
        let service = AreaService::new(seeded_store().await);
        let err = service
            .create(NewArea { area_id: Some("tech".into()), name: "Again".into(), building: None })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn update_can_clear_building() {
        let service = AreaService::new(seeded_store().await);
        let changes: AreaChanges = serde_json::from_value(json!({"building": null})).unwrap();
        let area = service.update("corp", changes).await.unwrap();
        assert_eq!(area.building, None);
        assert_eq!(area.name, "Corporate");
    }

    #[tokio::test]
    async fn renamed_area_shows_through_departments() {
        let store = seeded_store().await;
        AreaService::new(store.clone())
            .replace("tech", json!({"name": "Engineering"}))
            .await
            .unwrap();

        let it = DepartmentService::new(store).get_by_id(1).await.unwrap();
        assert_eq!(it.area.unwrap().name, "Engineering");
    }

    #[tokio::test]
    async fn forced_delete_detaches_departments() {
        let store = seeded_store().await;
        let service = AreaService::new(store.clone());

        assert!(matches!(
            service.delete("corp", false).await,
            Err(ServiceError::InUse { count: 1, .. })
        ));
        service.delete("corp", true).await.unwrap();

        let legal = DepartmentService::new(store).get_by_id(3).await.unwrap();
        assert!(legal.area.is_none());
        assert!(legal.manager.is_some());
    }

    #[tokio::test]
    async fn search_matches_key_or_name() {
        let service = AreaService::new(seeded_store().await);
        assert_eq!(service.search("tech").await.unwrap().len(), 1);
        assert_eq!(service.search("ORATE").await.unwrap()[0].id, "corp");
        assert!(service.search("7").await.unwrap().is_empty());
        assert!(service.search(" ").await.unwrap().is_empty());
    }
}
