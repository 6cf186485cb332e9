use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::{
    numeric_query, relationship_guard, single_change, DeleteConfirmation, DeletePlan, ServiceError, ServiceResult,
    StoreContext,
};
use crate::database::models::{
    to_document, Area, Department, DepartmentChanges, DepartmentField, DepartmentSearchHit, DepartmentSlot,
    DepartmentView, Employee, Manager, NewDepartment, ReplaceField, ReplaceRequest,
};
use crate::database::repository::Repository;
use crate::database::store::{Collection, DocumentStore};
use crate::filter::Filter;

/// Departments reference a manager and an area, and are referenced by employees.
pub struct DepartmentService {
    departments: Repository<Department>,
    managers: Repository<Manager>,
    areas: Repository<Area>,
    employees: Repository<Employee>,
}

impl DepartmentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            departments: Repository::new(store.clone()),
            managers: Repository::new(store.clone()),
            areas: Repository::new(store.clone()),
            employees: Repository::new(store),
        }
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<DepartmentView>> {
        let departments = self.departments.select_all().await.context("fetching departments")?;
        self.populate(departments, "fetching departments").await
    }

    pub async fn get_by_id(&self, department_number: i64) -> ServiceResult<DepartmentView> {
        let department = self.get_record(department_number).await?;
        let (manager, area) = futures::try_join!(
            async {
                match department.manager {
                    Some(id) => self.managers.select_one(&id).await,
                    None => Ok(None),
                }
            },
            async {
                match &department.area {
                    Some(id) => self.areas.select_one(id).await,
                    None => Ok(None),
                }
            },
        )
        .context("fetching department")?;

        Ok(DepartmentView {
            department_number: department.department_number,
            name: department.name,
            manager,
            area,
        })
    }

    /// The stored record, references left as keys.
    pub async fn get_record(&self, department_number: i64) -> ServiceResult<Department> {
        self.departments
            .select_one(&department_number)
            .await
            .context("fetching department")?
            .ok_or_else(|| ServiceError::not_found(Collection::Department, department_number))
    }

    pub async fn search(&self, query: &str) -> ServiceResult<Vec<DepartmentSearchHit>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let filter = match numeric_query(query) {
            Some(n) => Filter::eq("departmentNumber", n),
            None => Filter::ilike("name", query.trim()),
        };
        let found = self.departments.select_any(filter).await.context("searching departments")?;
        let views = self.populate(found, "searching departments").await?;
        Ok(views.into_iter().map(DepartmentSearchHit::from_view).collect())
    }

    pub async fn create(&self, new: NewDepartment) -> ServiceResult<Department> {
        self.ensure_manager(new.manager).await?;
        self.ensure_area(new.area.as_deref()).await?;

        let department_number = match new.department_number {
            Some(n) => n,
            None => self.departments.next_number().await.context("numbering department")?,
        };
        let department = new.into_department(department_number);
        self.departments.insert(&department).await.context("creating department")?;

        info!(department_number, name = %department.name, "department created");
        Ok(department)
    }

    pub async fn update(&self, department_number: i64, changes: DepartmentChanges) -> ServiceResult<Department> {
        let current = self.get_record(department_number).await?;
        if let Some(manager) = changes.manager {
            self.ensure_manager(manager).await?;
        }
        if let Some(area) = &changes.area {
            self.ensure_area(area.as_deref()).await?;
        }

        let renamed = changes.name.as_ref().is_some_and(|n| *n != current.name);
        let changes = to_document(&changes).context("updating department")?;
        self.departments
            .update_one(&department_number, changes)
            .await
            .context("updating department")?;
        if renamed {
            self.log_rename(department_number).await?;
        }

        info!(department_number, "department updated");
        self.get_record(department_number).await
    }

    pub async fn replace(&self, department_number: i64, body: Value) -> ServiceResult<Department> {
        let current = self.get_record(department_number).await?;
        let request = ReplaceRequest::<DepartmentField>::parse(body)?;

        if relationship_guard(Collection::Department, &request, &current)? {
            match &request.field {
                DepartmentField::Manager(manager) => self.ensure_manager(*manager).await?,
                DepartmentField::Area(area) => self.ensure_area(area.as_deref()).await?,
                DepartmentField::Name(_) => {}
            }
        }

        self.departments
            .update_one(&department_number, single_change(&request.field))
            .await
            .context("updating department")?;
        if matches!(&request.field, DepartmentField::Name(name) if *name != current.name) {
            self.log_rename(department_number).await?;
        }

        info!(department_number, field = request.field.name(), "department field replaced");
        self.get_record(department_number).await
    }

    pub async fn delete(&self, department_number: i64, force: bool) -> ServiceResult<DeleteConfirmation> {
        let plan = self.stage_delete(department_number).await?.authorize(
            Collection::Department,
            department_number,
            Collection::Employee,
            force,
        )?;
        self.apply_delete(plan).await
    }

    pub async fn stage_delete(&self, department_number: i64) -> ServiceResult<DeletePlan<Department>> {
        let record = self.get_record(department_number).await?;
        let dependents = self
            .employees
            .count(assigned_to(department_number))
            .await
            .context("deleting department")?;
        Ok(DeletePlan { record, dependents })
    }

    /// Clear only the employee slots that hold this department, then remove it. Safe to rerun.
    pub async fn apply_delete(&self, plan: DeletePlan<Department>) -> ServiceResult<DeleteConfirmation> {
        let department_number = plan.record.department_number;
        let mut slots_cleared = 0;
        for slot in DepartmentSlot::ALL {
            slots_cleared += self
                .employees
                .detach(slot.field_name(), Value::from(department_number))
                .await
                .context("deleting department")?;
        }
        if !self
            .departments
            .delete_one(&department_number)
            .await
            .context("deleting department")?
        {
            return Err(ServiceError::not_found(Collection::Department, department_number));
        }

        info!(department_number, slots_cleared, "department deleted");
        Ok(DeleteConfirmation {
            message: format!("Department {} has been successfully deleted.", department_number),
            key: Value::from(department_number),
            detached: plan.dependents,
        })
    }

    async fn populate(&self, departments: Vec<Department>, context: &'static str) -> ServiceResult<Vec<DepartmentView>> {
        let mut manager_ids: Vec<i64> = departments.iter().filter_map(|d| d.manager).collect();
        manager_ids.sort_unstable();
        manager_ids.dedup();
        let mut area_ids: Vec<&str> = departments.iter().filter_map(|d| d.area.as_deref()).collect();
        area_ids.sort_unstable();
        area_ids.dedup();

        let (managers, areas) = futures::try_join!(
            self.managers.select_any(Filter::is_in("managerId", manager_ids.into_iter().map(Value::from).collect())),
            self.areas.select_any(Filter::is_in("areaId", area_ids.into_iter().map(Value::from).collect())),
        )
        .context(context)?;
        let managers: HashMap<i64, Manager> = managers.into_iter().map(|m| (m.manager_id, m)).collect();
        let areas: HashMap<String, Area> = areas.into_iter().map(|a| (a.area_id.clone(), a)).collect();

        Ok(departments
            .into_iter()
            .map(|d| DepartmentView {
                manager: d.manager.and_then(|id| managers.get(&id).cloned()),
                area: d.area.as_ref().and_then(|id| areas.get(id).cloned()),
                department_number: d.department_number,
                name: d.name,
            })
            .collect())
    }

    async fn ensure_manager(&self, manager: Option<i64>) -> ServiceResult<()> {
        let Some(id) = manager else { return Ok(()) };
        if !self.managers.exists(&id).await.context("checking manager")? {
            warn!(manager_id = id, "department references a missing manager");
            return Err(ServiceError::reference_not_found(Collection::Manager, id));
        }
        Ok(())
    }

    async fn ensure_area(&self, area: Option<&str>) -> ServiceResult<()> {
        let Some(id) = area else { return Ok(()) };
        if !self.areas.exists(&id.to_string()).await.context("checking area")? {
            warn!(area_id = id, "department references a missing area");
            return Err(ServiceError::reference_not_found(Collection::Area, id));
        }
        Ok(())
    }

    async fn log_rename(&self, department_number: i64) -> ServiceResult<()> {
        let observers = self
            .employees
            .count(assigned_to(department_number))
            .await
            .context("renaming department")?;
        info!(department_number, employees = observers, "department renamed");
        Ok(())
    }
}

/// Employees holding `department_number` in any of their three slots.
pub(crate) fn assigned_to(department_number: i64) -> Filter {
    Filter::or(
        DepartmentSlot::ALL
            .iter()
            .map(|slot| Filter::eq(slot.field_name(), department_number))
            .collect(),
    )
}
