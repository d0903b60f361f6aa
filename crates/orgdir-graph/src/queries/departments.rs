//! Department queries.

use neo4rs::Row;
use orgdir_core::department::model::{DepartmentInfo, DepartmentSummary};
use orgdir_core::employee::model::MANAGER_POSITION;
use orgdir_core::filter::{DepartmentField, ListQuery};
use orgdir_core::DirectoryResult;

use super::{compile_listing, field, Cypher};

/// Employee count and managers of one department. No rows when it does not exist.
pub fn info(department: &str) -> Cypher {
    Cypher::new(
        "MATCH (d:Department {name: $department})
         OPTIONAL MATCH (e:Employee)-[:WORKS_IN]->(d)
         WITH d, count(e) AS employee_count,
              collect(CASE WHEN e.position = $manager THEN e.name END) AS managers
         RETURN d.name AS department_name, employee_count, managers",
    )
    .text_param("department", department)
    .text_param("manager", MANAGER_POSITION)
}

/// Departments with their employee counts.
pub fn list(query: &ListQuery<DepartmentField>) -> Cypher {
    let compiled = compile_listing(query, DepartmentField::Department);
    let text = format!(
        "MATCH (d:Department)
         OPTIONAL MATCH (e:Employee)-[:WORKS_IN]->(d)
         WITH d.name AS department_name, count(e) AS employee_count{}
         RETURN department_name, employee_count{}",
        compiled.where_clause, compiled.order_clause
    );
    Cypher {
        text,
        params: compiled.params,
    }
}

/// Employees with a WORKS_IN edge into the department.
pub fn employees(department: &str) -> Cypher {
    Cypher::new(
        "MATCH (e:Employee)-[:WORKS_IN]->(d:Department {name: $department})
         RETURN e.name AS name, coalesce(e.position, '') AS position,
                toFloat(e.salary) AS salary
         ORDER BY name",
    )
    .text_param("department", department)
}

/// Delete the department if nobody works in it any more.
pub fn delete_if_empty(department: &str) -> Cypher {
    Cypher::new(
        "MATCH (d:Department {name: $department})
         OPTIONAL MATCH (other:Employee)-[:WORKS_IN]->(d)
         WITH d, count(other) AS remaining
         WHERE remaining = 0
         DETACH DELETE d
         RETURN count(*) AS removed",
    )
    .text_param("department", department)
}

pub fn parse_info(row: &Row) -> DirectoryResult<DepartmentInfo> {
    let mut managers: Vec<String> = field(row, "managers")?;
    managers.sort();
    Ok(DepartmentInfo {
        department_name: field(row, "department_name")?,
        department_employee_count: field(row, "employee_count")?,
        managers,
    })
}

pub fn parse_summary(row: &Row) -> DirectoryResult<DepartmentSummary> {
    Ok(DepartmentSummary {
        department_name: field(row, "department_name")?,
        employee_count: field(row, "employee_count")?,
    })
}
