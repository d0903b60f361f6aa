//! Department queries.

pub mod model;

use crate::employee::model::EmployeeSummary;
use crate::error::{DirectoryError, DirectoryResult};
use crate::filter::{DepartmentField, ListQuery};
use crate::store::DirectoryStore;
use model::{DepartmentInfo, DepartmentSummary};

/// Get the employee count and managers of a department.
pub async fn get_department_info(
    store: &dyn DirectoryStore,
    department: &str,
) -> DirectoryResult<DepartmentInfo> {
    store
        .department_info(department.trim())
        .await?
        .ok_or_else(|| DirectoryError::department_not_found(department))
}

/// List departments with their employee counts.
pub async fn list_departments(
    store: &dyn DirectoryStore,
    filter: Option<&str>,
    sort: Option<&str>,
) -> DirectoryResult<Vec<DepartmentSummary>> {
    let query = ListQuery::<DepartmentField>::parse(filter, sort)?;
    store.list_departments(&query).await
}

/// List the employees working in a department.
pub async fn list_department_employees(
    store: &dyn DirectoryStore,
    department: &str,
) -> DirectoryResult<Vec<EmployeeSummary>> {
    store.list_department_employees(department.trim()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employee::{self, model::CreateEmployeeRequest};
    use crate::store::memory::MemoryStore;
    use serde_json::json;

    async fn seed(store: &MemoryStore) {
        for (name, position, department) in [
            ("Ann Lee", "manager", "R&D"),
            ("Bob", "dev", "R&D"),
            ("Cy", "manager", "Sales"),
        ] {
            let request: CreateEmployeeRequest = serde_json::from_value(json!({
                "name": name, "position": position, "department": department,
                "salary": 9000, "relation": "WORKS_IN"
            }))
            .unwrap();
            employee::create_employee(store, request).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_department_info() {
        let store = MemoryStore::new();
        seed(&store).await;

        let info = get_department_info(&store, "R&D").await.unwrap();
        assert_eq!(info.department_name, "R&D");
        assert_eq!(info.department_employee_count, 2);
        assert_eq!(info.managers, vec!["Ann Lee".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_department_is_not_found() {
        let store = MemoryStore::new();
        let err = get_department_info(&store, "Nowhere").await.unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_departments_filter_and_sort() {
        let store = MemoryStore::new();
        seed(&store).await;

        let all = list_departments(&store, None, Some("employee_count:desc"))
            .await
            .unwrap();
        assert_eq!(
            all,
            vec![
                DepartmentSummary { department_name: "R&D".into(), employee_count: 2 },
                DepartmentSummary { department_name: "Sales".into(), employee_count: 1 },
            ]
        );

        let small = list_departments(&store, Some("employee_count<2"), None)
            .await
            .unwrap();
        assert_eq!(small.len(), 1);
        assert_eq!(small[0].department_name, "Sales");

        assert!(list_departments(&store, Some("department = x; DROP"), None)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_department_roster() {
        let store = MemoryStore::new();
        seed(&store).await;

        let roster = list_department_employees(&store, "R&D").await.unwrap();
        let names: Vec<&str> = roster.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Ann Lee", "Bob"]);
        assert!(list_department_employees(&store, "Nowhere")
            .await
            .unwrap()
            .is_empty());
    }
}
