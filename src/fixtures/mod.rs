//! YAML seed data. Departments and employees refer to their parents by display name;
//! [`seed`] resolves those names to keys and stores null for names it cannot find.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::database::models::{Area, Department, Employee, Gender, Manager};
use crate::database::repository::Repository;
use crate::database::store::{DocumentStore, StoreError};

/// The sample organisation shipped with the crate.
pub const SEED_YAML: &str = include_str!("../../fixtures/seed.yaml");

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Cannot read fixture file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed fixture file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Employee {0} lists more than three departments")]
    TooManyDepartments(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub areas: Vec<Area>,
    #[serde(default)]
    pub managers: Vec<Manager>,
    #[serde(default)]
    pub departments: Vec<DepartmentFixture>,
    #[serde(default)]
    pub employees: Vec<EmployeeFixture>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentFixture {
    pub department_number: i64,
    pub name: String,
    /// Manager name
    pub manager: Option<String>,
    /// Area name
    pub area: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeFixture {
    pub employee_number: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: Gender,
    /// Department names, in slot order
    #[serde(default)]
    pub departments: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    pub areas: usize,
    pub managers: usize,
    pub departments: usize,
    pub employees: usize,
    /// Names that matched no record and were stored as null
    pub unresolved: Vec<String>,
}

impl Fixtures {
    pub fn parse(yaml: &str) -> Result<Self, FixtureError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn builtin() -> Result<Self, FixtureError> {
        Self::parse(SEED_YAML)
    }

    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let raw = std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }
}

/// Load `fixtures` into the store. With `reset`, every collection is emptied first.
pub async fn seed(store: Arc<dyn DocumentStore>, fixtures: &Fixtures, reset: bool) -> Result<SeedReport, FixtureError> {
    let areas = Repository::<Area>::new(store.clone());
    let managers = Repository::<Manager>::new(store.clone());
    let departments = Repository::<Department>::new(store.clone());
    let employees = Repository::<Employee>::new(store);

    if let Some(n) = fixtures.employees.iter().find(|e| e.departments.len() > 3) {
        return Err(FixtureError::TooManyDepartments(n.employee_number));
    }

    if reset {
        // Children first so nothing is left pointing at a removed parent
        let removed = employees.delete_all().await?
            + departments.delete_all().await?
            + managers.delete_all().await?
            + areas.delete_all().await?;
        info!(removed, "collections cleared");
    }

    let mut report = SeedReport::default();

    for area in &fixtures.areas {
        areas.insert(area).await?;
        report.areas += 1;
    }
    for manager in &fixtures.managers {
        managers.insert(manager).await?;
        report.managers += 1;
    }

    let manager_ids = index_by_name(fixtures.managers.iter().map(|m| (m.name.as_str(), m.manager_id)));
    let area_ids = index_by_name(fixtures.areas.iter().map(|a| (a.name.as_str(), a.area_id.clone())));

    for fixture in &fixtures.departments {
        let department = Department {
            department_number: fixture.department_number,
            name: fixture.name.clone(),
            manager: resolve(&manager_ids, fixture.manager.as_deref(), "manager", &mut report.unresolved),
            area: resolve(&area_ids, fixture.area.as_deref(), "area", &mut report.unresolved),
        };
        departments.insert(&department).await?;
        report.departments += 1;
    }

    let department_numbers = index_by_name(
        fixtures
            .departments
            .iter()
            .map(|d| (d.name.as_str(), d.department_number)),
    );

    let now = Utc::now();
    for fixture in &fixtures.employees {
        let mut slots = fixture
            .departments
            .iter()
            .map(|name| resolve(&department_numbers, Some(name.as_str()), "department", &mut report.unresolved));
        let employee = Employee {
            employee_number: fixture.employee_number,
            first_name: fixture.first_name.clone(),
            last_name: fixture.last_name.clone(),
            age: fixture.age,
            gender: fixture.gender,
            department1: slots.next().flatten(),
            department2: slots.next().flatten(),
            department3: slots.next().flatten(),
            created_at: now,
            updated_at: now,
        };
        employees.insert(&employee).await?;
        report.employees += 1;
    }

    info!(
        areas = report.areas,
        managers = report.managers,
        departments = report.departments,
        employees = report.employees,
        unresolved = report.unresolved.len(),
        "fixtures seeded"
    );
    Ok(report)
}

/// First record wins when two share a name.
fn index_by_name<'a, K>(entries: impl Iterator<Item = (&'a str, K)>) -> HashMap<String, K> {
    let mut index = HashMap::new();
    for (name, key) in entries {
        index.entry(name.to_lowercase()).or_insert(key);
    }
    index
}

fn resolve<K: Clone>(index: &HashMap<String, K>, name: Option<&str>, kind: &str, unresolved: &mut Vec<String>) -> Option<K> {
    let name = name?;
    let found = index.get(&name.to_lowercase()).cloned();
    if found.is_none() {
        warn!(kind, name, "fixture reference does not resolve; storing null");
        unresolved.push(format!("{}: {}", kind, name));
    }
    found
}
