//! Department domain models.

use serde::{Deserialize, Serialize};

use crate::filter::{DepartmentField, FieldValue, Record};

/// Summary of a single department, as returned by `GET /department/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentInfo {
    pub department_name: String,
    pub department_employee_count: i64,
    /// Names of employees in the department whose position is "manager".
    pub managers: Vec<String>,
}

/// A department listing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentSummary {
    pub department_name: String,
    pub employee_count: i64,
}

impl Record<DepartmentField> for DepartmentSummary {
    fn field(&self, field: DepartmentField) -> FieldValue<'_> {
        match field {
            DepartmentField::Department => FieldValue::Text(&self.department_name),
            DepartmentField::EmployeeCount => FieldValue::Number(Some(self.employee_count as f64)),
        }
    }
}
