use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use super::{
    numeric_query, relationship_guard, single_change, DeleteConfirmation, ServiceError, ServiceResult, StoreContext,
};
use crate::database::models::{
    to_document, Department, DepartmentSlot, Employee, EmployeeChanges, EmployeeField, EmployeeSearchHit,
    EmployeeView, NewEmployee, ReplaceField, ReplaceRequest,
};
use crate::database::repository::Repository;
use crate::database::store::{Collection, Document, DocumentStore};
use crate::filter::Filter;

/// Employees reference up to three departments. Nothing references employees.
pub struct EmployeeService {
    employees: Repository<Employee>,
    departments: Repository<Department>,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            employees: Repository::new(store.clone()),
            departments: Repository::new(store),
        }
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<EmployeeView>> {
        let employees = self.employees.select_all().await.context("fetching employees")?;
        self.populate(employees, "fetching employees").await
    }

    pub async fn get_by_id(&self, employee_number: i64) -> ServiceResult<EmployeeView> {
        let employee = self.get_record(employee_number).await?;
        let mut views = self.populate(vec![employee], "fetching employee").await?;
        views.pop().ok_or_else(|| ServiceError::not_found(Collection::Employee, employee_number))
    }

    pub async fn get_record(&self, employee_number: i64) -> ServiceResult<Employee> {
        self.employees
            .select_one(&employee_number)
            .await
            .context("fetching employee")?
            .ok_or_else(|| ServiceError::not_found(Collection::Employee, employee_number))
    }

    pub async fn search(&self, query: &str) -> ServiceResult<Vec<EmployeeSearchHit>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let filter = match numeric_query(query) {
            Some(n) => Filter::eq("employeeNumber", n),
            None => {
                let needle = query.trim();
                Filter::or(vec![Filter::ilike("firstName", needle), Filter::ilike("lastName", needle)])
            }
        };
        let found = self.employees.select_any(filter).await.context("searching employees")?;
        let views = self.populate(found, "searching employees").await?;
        Ok(views.into_iter().map(EmployeeSearchHit::from_view).collect())
    }

    pub async fn create(&self, new: NewEmployee) -> ServiceResult<Employee> {
        for (slot, department) in new.departments() {
            if let Some(n) = department {
                self.ensure_department(slot, n).await?;
            }
        }

        let employee_number = match new.employee_number {
            Some(n) => n,
            None => self.employees.next_number().await.context("numbering employee")?,
        };
        let employee = new.into_employee(employee_number, Utc::now());
        self.employees.insert(&employee).await.context("creating employee")?;

        info!(employee_number, name = %employee.full_name(), "employee created");
        Ok(employee)
    }

    pub async fn update(&self, employee_number: i64, changes: EmployeeChanges) -> ServiceResult<Employee> {
        self.get_record(employee_number).await?;
        for (slot, n) in changes.assigned_departments() {
            self.ensure_department(slot, n).await?;
        }

        let mut changes = to_document(&changes).context("updating employee")?;
        touch(&mut changes)?;
        self.employees
            .update_one(&employee_number, changes)
            .await
            .context("updating employee")?;

        info!(employee_number, "employee updated");
        self.get_record(employee_number).await
    }

    pub async fn replace(&self, employee_number: i64, body: Value) -> ServiceResult<Employee> {
        let current = self.get_record(employee_number).await?;
        let request = ReplaceRequest::<EmployeeField>::parse(body)?;

        if relationship_guard(Collection::Employee, &request, &current)? {
            if let EmployeeField::Department(slot, Some(n)) = &request.field {
                self.ensure_department(*slot, *n).await?;
            }
        }

        let mut changes = single_change(&request.field);
        touch(&mut changes)?;
        self.employees
            .update_one(&employee_number, changes)
            .await
            .context("updating employee")?;

        info!(employee_number, field = request.field.name(), "employee field replaced");
        self.get_record(employee_number).await
    }

    /// Employees have no dependents, so `force` changes nothing.
    pub async fn delete(&self, employee_number: i64, _force: bool) -> ServiceResult<DeleteConfirmation> {
        if !self
            .employees
            .delete_one(&employee_number)
            .await
            .context("deleting employee")?
        {
            return Err(ServiceError::not_found(Collection::Employee, employee_number));
        }

        info!(employee_number, "employee deleted");
        Ok(DeleteConfirmation {
            message: format!("Employee {} has been successfully deleted.", employee_number),
            key: Value::from(employee_number),
            detached: 0,
        })
    }

    async fn populate(&self, employees: Vec<Employee>, context: &'static str) -> ServiceResult<Vec<EmployeeView>> {
        let mut referenced: Vec<i64> =
            employees.iter().flat_map(|e| [e.department1, e.department2, e.department3]).flatten().collect();
        referenced.sort_unstable();
        referenced.dedup();

        let departments: HashMap<i64, Department> = self
            .departments
            .select_any(Filter::is_in("departmentNumber", referenced.into_iter().map(Value::from).collect()))
            .await
            .context(context)?
            .into_iter()
            .map(|d| (d.department_number, d))
            .collect();
        let lookup = |n: Option<i64>| n.and_then(|n| departments.get(&n).cloned());

        Ok(employees
            .into_iter()
            .map(|e| EmployeeView {
                department1: lookup(e.department1),
                department2: lookup(e.department2),
                department3: lookup(e.department3),
                employee_number: e.employee_number,
                first_name: e.first_name,
                last_name: e.last_name,
                age: e.age,
                gender: e.gender,
                created_at: e.created_at,
                updated_at: e.updated_at,
            })
            .collect())
    }

    async fn ensure_department(&self, slot: DepartmentSlot, department_number: i64) -> ServiceResult<()> {
        if !self
            .departments
            .exists(&department_number)
            .await
            .context("checking department")?
        {
            warn!(slot = slot.field_name(), department_number, "employee references a missing department");
            return Err(ServiceError::reference_not_found(Collection::Department, department_number));
        }
        Ok(())
    }
}

fn touch(changes: &mut Document) -> ServiceResult<()> {
    let now = serde_json::to_value(Utc::now()).context("updating employee")?;
    changes.insert("updatedAt".to_string(), now);
    Ok(())
}
