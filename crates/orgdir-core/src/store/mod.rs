//! Persistence boundary for directory operations.
//!
//! A [`DirectoryStore`] owns transaction boundaries: every method is one
//! logical unit that either applies fully or leaves the graph untouched.
//! Conflict and not-found checks that guard a write are made inside the
//! same transaction as the write.

#[cfg(any(test, feature = "test-util"))]
pub mod memory;

use async_trait::async_trait;

use crate::department::model::{DepartmentInfo, DepartmentSummary};
use crate::employee::model::{
    DeleteOutcome, EmployeeRecord, EmployeeSummary, EmployeeUpdate, NewEmployee,
};
use crate::error::DirectoryResult;
use crate::filter::{DepartmentField, EmployeeField, ListQuery};

/// Abstract interface for all organization graph operations.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Check that the store answers queries.
    async fn ping(&self) -> DirectoryResult<()>;

    /// List employees joined with their department.
    async fn list_employees(
        &self,
        query: &ListQuery<EmployeeField>,
    ) -> DirectoryResult<Vec<EmployeeRecord>>;

    /// Insert an employee, its department if new, and any MANAGES edges.
    ///
    /// Fails with `Conflict` when the normalized name is taken and with
    /// `NotFound` when a subordinate does not exist.
    async fn create_employee(&self, employee: &NewEmployee) -> DirectoryResult<()>;

    /// Apply `update` to the employee whose normalized name matches `name`.
    async fn update_employee(
        &self,
        name: &str,
        update: &EmployeeUpdate,
    ) -> DirectoryResult<EmployeeRecord>;

    /// Remove the employee whose normalized name matches `name`, with all
    /// its relationships. A manager's department goes with them when no
    /// one else works there.
    async fn delete_employee(&self, name: &str) -> DirectoryResult<DeleteOutcome>;

    /// Employees one MANAGES hop from `manager`.
    async fn list_subordinates(&self, manager: &str) -> DirectoryResult<Vec<EmployeeSummary>>;

    /// `None` when the department does not exist.
    async fn department_info(&self, department: &str) -> DirectoryResult<Option<DepartmentInfo>>;

    async fn list_departments(
        &self,
        query: &ListQuery<DepartmentField>,
    ) -> DirectoryResult<Vec<DepartmentSummary>>;

    async fn list_department_employees(
        &self,
        department: &str,
    ) -> DirectoryResult<Vec<EmployeeSummary>>;
}
