//! In-memory implementation of [`DirectoryStore`] for testing.
//!
//! Mirrors the graph store's semantics: normalized name matching, atomic
//! writes (every check runs before the first mutation, under one write
//! lock) and conditional department removal. Compiled for this crate's
//! tests and for dependents that enable the `test-util` feature.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::department::model::{DepartmentInfo, DepartmentSummary};
use crate::employee::model::{
    normalize_name, DeleteOutcome, EmployeeRecord, EmployeeSummary, EmployeeUpdate, NewEmployee,
    Relation, Salary, MANAGER_POSITION,
};
use crate::error::{DirectoryError, DirectoryResult};
use crate::filter::{DepartmentField, EmployeeField, ListQuery};
use crate::store::DirectoryStore;

#[derive(Debug, Clone)]
struct EmployeeNode {
    position: String,
    salary: Option<Salary>,
}

#[derive(Debug, Default)]
struct MemoryGraph {
    /// Keyed by exact name.
    employees: BTreeMap<String, EmployeeNode>,
    departments: BTreeSet<String>,
    /// employee -> department
    works_in: HashMap<String, String>,
    /// (manager, subordinate)
    manages: BTreeSet<(String, String)>,
}

impl MemoryGraph {
    fn find_normalized(&self, name: &str) -> Option<String> {
        let key = normalize_name(name);
        self.employees
            .keys()
            .find(|existing| normalize_name(existing) == key)
            .cloned()
    }

    fn record(&self, name: &str) -> Option<EmployeeRecord> {
        let node = self.employees.get(name)?;
        Some(EmployeeRecord {
            employee: name.to_string(),
            position: node.position.clone(),
            salary: node.salary,
            department: self.works_in.get(name).cloned().unwrap_or_default(),
        })
    }

    fn summary(&self, name: &str) -> Option<EmployeeSummary> {
        let node = self.employees.get(name)?;
        Some(EmployeeSummary {
            name: name.to_string(),
            position: node.position.clone(),
            salary: node.salary,
        })
    }

    fn occupants(&self, department: &str) -> Vec<&String> {
        let mut names: Vec<&String> = self
            .works_in
            .iter()
            .filter(|(_, d)| d.as_str() == department)
            .map(|(e, _)| e)
            .collect();
        names.sort();
        names
    }

    fn rename(&mut self, from: &str, to: &str) {
        if let Some(node) = self.employees.remove(from) {
            self.employees.insert(to.to_string(), node);
        }
        if let Some(department) = self.works_in.remove(from) {
            self.works_in.insert(to.to_string(), department);
        }
        self.manages = std::mem::take(&mut self.manages)
            .into_iter()
            .map(|(m, s)| {
                let m = if m == from { to.to_string() } else { m };
                let s = if s == from { to.to_string() } else { s };
                (m, s)
            })
            .collect();
    }
}

/// In-memory mock implementation of DirectoryStore for testing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    graph: RwLock<MemoryGraph>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a store error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn has_employee(&self, name: &str) -> bool {
        self.graph.read().await.employees.contains_key(name)
    }

    pub async fn has_department(&self, name: &str) -> bool {
        self.graph.read().await.departments.contains(name)
    }

    pub async fn manages(&self, manager: &str, subordinate: &str) -> bool {
        self.graph
            .read()
            .await
            .manages
            .contains(&(manager.to_string(), subordinate.to_string()))
    }

    pub async fn employee_count(&self) -> usize {
        self.graph.read().await.employees.len()
    }

    fn check_available(&self) -> DirectoryResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(DirectoryError::store("memory store unavailable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn ping(&self) -> DirectoryResult<()> {
        self.check_available()
    }

    async fn list_employees(
        &self,
        query: &ListQuery<EmployeeField>,
    ) -> DirectoryResult<Vec<EmployeeRecord>> {
        self.check_available()?;
        let graph = self.graph.read().await;

        let mut records: Vec<EmployeeRecord> = graph
            .employees
            .keys()
            .filter(|name| graph.works_in.contains_key(*name))
            .filter_map(|name| graph.record(name))
            .filter(|record| query.filter.matches(record))
            .collect();
        records.sort_by(|a, b| query.sort.compare(a, b));
        Ok(records)
    }

    async fn create_employee(&self, employee: &NewEmployee) -> DirectoryResult<()> {
        self.check_available()?;
        let mut graph = self.graph.write().await;

        if graph.find_normalized(&employee.name).is_some() {
            return Err(DirectoryError::employee_exists(&employee.name));
        }
        if employee.relation == Relation::Manages {
            if let Some(missing) = employee
                .subordinates
                .iter()
                .find(|s| !graph.employees.contains_key(s.as_str()))
            {
                return Err(DirectoryError::employee_not_found(missing));
            }
        }

        graph.departments.insert(employee.department.clone());
        graph.employees.insert(
            employee.name.clone(),
            EmployeeNode {
                position: employee.position.clone(),
                salary: Some(employee.salary),
            },
        );
        graph
            .works_in
            .insert(employee.name.clone(), employee.department.clone());
        for subordinate in &employee.subordinates {
            graph
                .manages
                .insert((employee.name.clone(), subordinate.clone()));
        }
        Ok(())
    }

    async fn update_employee(
        &self,
        name: &str,
        update: &EmployeeUpdate,
    ) -> DirectoryResult<EmployeeRecord> {
        self.check_available()?;
        let mut graph = self.graph.write().await;

        let current = graph
            .find_normalized(name)
            .ok_or_else(|| DirectoryError::employee_not_found(name))?;
        if let Some(new_name) = &update.name {
            if let Some(other) = graph.find_normalized(new_name) {
                if other != current {
                    return Err(DirectoryError::employee_exists(new_name));
                }
            }
        }

        if let Some(node) = graph.employees.get_mut(&current) {
            if let Some(position) = &update.position {
                node.position = position.clone();
            }
            if let Some(salary) = update.salary {
                node.salary = Some(salary);
            }
        }
        if let Some(department) = &update.department {
            graph.departments.insert(department.clone());
            graph.works_in.insert(current.clone(), department.clone());
        }
        let target = match &update.name {
            Some(new_name) => {
                graph.rename(&current, new_name);
                new_name.clone()
            }
            None => current,
        };

        graph
            .record(&target)
            .ok_or_else(|| DirectoryError::employee_not_found(name))
    }

    async fn delete_employee(&self, name: &str) -> DirectoryResult<DeleteOutcome> {
        self.check_available()?;
        let mut graph = self.graph.write().await;

        let current = graph
            .find_normalized(name)
            .ok_or_else(|| DirectoryError::employee_not_found(name))?;
        let node = graph.employees.remove(&current);
        let department = graph.works_in.remove(&current);
        graph
            .manages
            .retain(|(m, s)| m != &current && s != &current);

        let mut removed_department = None;
        let was_manager = node.is_some_and(|n| n.position == MANAGER_POSITION);
        if let Some(department) = department {
            if was_manager && graph.occupants(&department).is_empty() {
                graph.departments.remove(&department);
                removed_department = Some(department);
            }
        }

        Ok(DeleteOutcome {
            employee: current,
            removed_department,
        })
    }

    async fn list_subordinates(&self, manager: &str) -> DirectoryResult<Vec<EmployeeSummary>> {
        self.check_available()?;
        let graph = self.graph.read().await;

        Ok(graph
            .manages
            .iter()
            .filter(|(m, _)| m == manager)
            .filter_map(|(_, s)| graph.summary(s))
            .collect())
    }

    async fn department_info(&self, department: &str) -> DirectoryResult<Option<DepartmentInfo>> {
        self.check_available()?;
        let graph = self.graph.read().await;

        if !graph.departments.contains(department) {
            return Ok(None);
        }
        let occupants = graph.occupants(department);
        let managers = occupants
            .iter()
            .filter(|e| {
                graph
                    .employees
                    .get(e.as_str())
                    .is_some_and(|n| n.position == MANAGER_POSITION)
            })
            .map(|e| e.to_string())
            .collect();

        Ok(Some(DepartmentInfo {
            department_name: department.to_string(),
            department_employee_count: occupants.len() as i64,
            managers,
        }))
    }

    async fn list_departments(
        &self,
        query: &ListQuery<DepartmentField>,
    ) -> DirectoryResult<Vec<DepartmentSummary>> {
        self.check_available()?;
        let graph = self.graph.read().await;

        let mut summaries: Vec<DepartmentSummary> = graph
            .departments
            .iter()
            .map(|d| DepartmentSummary {
                department_name: d.clone(),
                employee_count: graph.occupants(d).len() as i64,
            })
            .filter(|summary| query.filter.matches(summary))
            .collect();
        summaries.sort_by(|a, b| query.sort.compare(a, b));
        Ok(summaries)
    }

    async fn list_department_employees(
        &self,
        department: &str,
    ) -> DirectoryResult<Vec<EmployeeSummary>> {
        self.check_available()?;
        let graph = self.graph.read().await;

        Ok(graph
            .occupants(department)
            .into_iter()
            .filter_map(|e| graph.summary(e))
            .collect())
    }
}
