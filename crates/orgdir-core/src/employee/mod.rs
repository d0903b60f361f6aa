//! Employee operations.

pub mod model;

use serde_json::{Map, Value};
use tracing::info;

use crate::error::{DirectoryError, DirectoryResult};
use crate::filter::{EmployeeField, ListQuery};
use crate::store::DirectoryStore;
use model::{
    CreateEmployeeRequest, DeleteOutcome, EmployeeRecord, EmployeeSummary, EmployeeUpdate,
    NewEmployee,
};

/// List employees with their department, optionally filtered and sorted.
pub async fn list_employees(
    store: &dyn DirectoryStore,
    filter: Option<&str>,
    sort: Option<&str>,
) -> DirectoryResult<Vec<EmployeeRecord>> {
    let query = ListQuery::<EmployeeField>::parse(filter, sort)?;
    store.list_employees(&query).await
}

/// Create an employee from a request body.
pub async fn create_employee(
    store: &dyn DirectoryStore,
    request: CreateEmployeeRequest,
) -> DirectoryResult<NewEmployee> {
    let employee = request.validate()?;
    store.create_employee(&employee).await?;

    info!(
        name = %employee.name,
        department = %employee.department,
        relation = employee.relation.as_str(),
        subordinates = employee.subordinates.len(),
        "Employee created"
    );
    Ok(employee)
}

/// Update allow-listed attributes of an employee.
pub async fn update_employee(
    store: &dyn DirectoryStore,
    name: &str,
    attributes: &Map<String, Value>,
) -> DirectoryResult<EmployeeRecord> {
    let name = required_name(name)?;
    let update = EmployeeUpdate::from_attributes(attributes)?;
    let record = store.update_employee(name, &update).await?;

    info!(name, updated = %record.employee, "Employee updated");
    Ok(record)
}

/// Delete an employee and, for a manager, their department once empty.
pub async fn delete_employee(
    store: &dyn DirectoryStore,
    name: &str,
) -> DirectoryResult<DeleteOutcome> {
    let name = required_name(name)?;
    let outcome = store.delete_employee(name).await?;

    info!(
        name = %outcome.employee,
        removed_department = ?outcome.removed_department,
        "Employee deleted"
    );
    Ok(outcome)
}

/// List the employees directly managed by `manager`.
pub async fn list_subordinates(
    store: &dyn DirectoryStore,
    manager: &str,
) -> DirectoryResult<Vec<EmployeeSummary>> {
    store.list_subordinates(manager.trim()).await
}

fn required_name(name: &str) -> DirectoryResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DirectoryError::validation("Employee name must not be empty"));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::department;
    use crate::store::memory::MemoryStore;
    use serde_json::json;

    fn works_in(name: &str, position: &str, department: &str, salary: i64) -> CreateEmployeeRequest {
        serde_json::from_value(json!({
            "name": name, "position": position, "department": department,
            "salary": salary, "relation": "WORKS_IN"
        }))
        .unwrap()
    }

    fn manages(name: &str, department: &str, employees: &[&str]) -> CreateEmployeeRequest {
        serde_json::from_value(json!({
            "name": name, "position": "manager", "department": department,
            "salary": 10000, "relation": "MANAGES", "employees": employees
        }))
        .unwrap()
    }

    fn attrs(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_created_employee_is_listed_once() {
        let store = MemoryStore::new();
        create_employee(&store, works_in("Ann Lee", "manager", "R&D", 9000))
            .await
            .unwrap();

        let employees = list_employees(&store, None, None).await.unwrap();
        let matches: Vec<_> = employees.iter().filter(|e| e.employee == "Ann Lee").collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].department, "R&D");
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts_without_changes() {
        let store = MemoryStore::new();
        create_employee(&store, works_in("Ann Lee", "dev", "R&D", 9000))
            .await
            .unwrap();

        let err = create_employee(&store, works_in("AnnLee", "dev", "Sales", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Conflict(_)));
        assert_eq!(store.employee_count().await, 1);
        assert!(!store.has_department("Sales").await);
    }

    #[tokio::test]
    async fn test_manages_with_unknown_subordinate_is_atomic() {
        let store = MemoryStore::new();
        create_employee(&store, works_in("Bob", "dev", "R&D", 100))
            .await
            .unwrap();

        let err = create_employee(&store, manages("Ann", "Ops", &["Bob", "Ghost"]))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound(_)));
        assert!(!store.has_employee("Ann").await);
        assert!(!store.has_department("Ops").await);
        assert!(!store.manages("Ann", "Bob").await);
    }

    #[tokio::test]
    async fn test_manages_creates_edges_and_department() {
        let store = MemoryStore::new();
        create_employee(&store, works_in("Bob", "dev", "R&D", 100))
            .await
            .unwrap();
        create_employee(&store, works_in("Cy", "dev", "R&D", 200))
            .await
            .unwrap();
        create_employee(&store, manages("Ann", "R&D", &["Bob", "Cy"]))
            .await
            .unwrap();

        let subordinates = list_subordinates(&store, "Ann").await.unwrap();
        let names: Vec<&str> = subordinates.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Cy"]);
        assert!(list_subordinates(&store, "Bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_salary_keeps_other_attributes() {
        let store = MemoryStore::new();
        create_employee(&store, works_in("Ann Lee", "dev", "R&D", 9000))
            .await
            .unwrap();

        let record = update_employee(&store, "AnnLee", &attrs(json!({"salary": 9500})))
            .await
            .unwrap();
        assert_eq!(record.salary.map(|s| s.amount()), Some(9500.0));

        let employees = list_employees(&store, Some("employee=Ann Lee"), None)
            .await
            .unwrap();
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].salary.map(|s| s.amount()), Some(9500.0));
        assert_eq!(employees[0].position, "dev");
        assert_eq!(employees[0].department, "R&D");
    }

    #[tokio::test]
    async fn test_update_unknown_and_disallowed() {
        let store = MemoryStore::new();
        let err = update_employee(&store, "Nobody", &attrs(json!({"salary": 1})))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound(_)));

        create_employee(&store, works_in("Ann", "dev", "R&D", 1))
            .await
            .unwrap();
        let err = update_employee(&store, "Ann", &attrs(json!({"is_admin": true})))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Validation(_)));
    }

    #[tokio::test]
    async fn test_rename_onto_existing_name_conflicts() {
        let store = MemoryStore::new();
        create_employee(&store, works_in("Ann", "dev", "R&D", 1))
            .await
            .unwrap();
        create_employee(&store, works_in("Bob", "dev", "R&D", 1))
            .await
            .unwrap();

        let err = update_employee(&store, "Bob", &attrs(json!({"name": "Ann"})))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Conflict(_)));

        let record = update_employee(&store, "Bob", &attrs(json!({"name": "Robert", "department": "Ops"})))
            .await
            .unwrap();
        assert_eq!(record.employee, "Robert");
        assert_eq!(record.department, "Ops");
        assert!(store.has_department("Ops").await);
    }

    #[tokio::test]
    async fn test_delete_last_manager_removes_department() {
        let store = MemoryStore::new();
        create_employee(&store, works_in("Ann Lee", "manager", "R&D", 9000))
            .await
            .unwrap();

        let outcome = delete_employee(&store, "Ann Lee").await.unwrap();
        assert_eq!(outcome.removed_department.as_deref(), Some("R&D"));
        assert!(!store.has_employee("Ann Lee").await);
        assert!(!store.has_department("R&D").await);
    }

    #[tokio::test]
    async fn test_delete_matches_name_ignoring_spaces() {
        let store = MemoryStore::new();
        create_employee(&store, works_in("Ann Lee", "dev", "R&D", 9000))
            .await
            .unwrap();

        let outcome = delete_employee(&store, "AnnLee").await.unwrap();
        assert_eq!(outcome.employee, "Ann Lee");
        assert_eq!(outcome.removed_department, None);
        assert!(!store.has_employee("Ann Lee").await);
        assert_eq!(store.employee_count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_manager_keeps_occupied_department() {
        let store = MemoryStore::new();
        create_employee(&store, works_in("Bob", "dev", "R&D", 100))
            .await
            .unwrap();
        create_employee(&store, manages("Ann", "R&D", &["Bob"]))
            .await
            .unwrap();

        let outcome = delete_employee(&store, "Ann").await.unwrap();
        assert_eq!(outcome.removed_department, None);
        assert!(store.has_department("R&D").await);
        assert!(!store.manages("Ann", "Bob").await);

        let info = department::get_department_info(&store, "R&D").await.unwrap();
        assert_eq!(info.department_employee_count, 1);
        assert!(info.managers.is_empty());
    }

    #[tokio::test]
    async fn test_delete_non_manager_keeps_empty_department() {
        let store = MemoryStore::new();
        create_employee(&store, works_in("Bob", "dev", "R&D", 100))
            .await
            .unwrap();
        delete_employee(&store, "Bob").await.unwrap();
        assert!(store.has_department("R&D").await);
    }

    #[tokio::test]
    async fn test_delete_unknown_and_blank() {
        let store = MemoryStore::new();
        assert!(matches!(
            delete_employee(&store, "Ghost").await.unwrap_err(),
            DirectoryError::NotFound(_)
        ));
        assert!(matches!(
            delete_employee(&store, "  ").await.unwrap_err(),
            DirectoryError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_list_employees_filter_and_sort() {
        let store = MemoryStore::new();
        create_employee(&store, works_in("Ann", "manager", "R&D", 9000))
            .await
            .unwrap();
        create_employee(&store, works_in("Bob", "dev", "R&D", 4000))
            .await
            .unwrap();
        create_employee(&store, works_in("Cy", "dev", "Sales", 6000))
            .await
            .unwrap();

        let rich = list_employees(&store, Some("salary>5000"), Some("-salary"))
            .await
            .unwrap();
        let names: Vec<&str> = rich.iter().map(|e| e.employee.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Cy"]);

        let err = list_employees(&store, Some("1=1; DROP"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Validation(_)));
    }
}
