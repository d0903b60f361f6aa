//! Employee queries.
//!
//! Name lookups for update, delete and the duplicate check compare
//! `replace(e.name, ' ', '')` against the normalized key.

use neo4rs::Row;
use orgdir_core::employee::model::{
    normalize_name, EmployeeRecord, EmployeeSummary, EmployeeUpdate, NewEmployee,
};
use orgdir_core::filter::{EmployeeField, ListQuery};
use orgdir_core::DirectoryResult;

use super::{compile_listing, field, salary_field, Cypher};

/// List employees joined with their department.
pub fn list(query: &ListQuery<EmployeeField>) -> Cypher {
    let compiled = compile_listing(query, EmployeeField::Employee);
    let text = format!(
        "MATCH (e:Employee)-[:WORKS_IN]->(d:Department)
         WITH e.name AS employee, coalesce(e.position, '') AS position,
              toFloat(e.salary) AS salary, d.name AS department{}
         RETURN employee, position, salary, department{}",
        compiled.where_clause, compiled.order_clause
    );
    Cypher {
        text,
        params: compiled.params,
    }
}

/// Find the stored name of the employee matching `name` after normalization.
pub fn find_by_normalized_name(name: &str) -> Cypher {
    Cypher::new(
        "MATCH (e:Employee)
         WHERE replace(e.name, ' ', '') = $key
         OPTIONAL MATCH (e)-[:WORKS_IN]->(d:Department)
         RETURN e.name AS name, e.position AS position, d.name AS department
         ORDER BY name
         LIMIT 1",
    )
    .text_param("key", normalize_name(name))
}

/// Find another employee whose normalized name equals `name`'s.
pub fn find_other_by_normalized_name(name: &str, current: &str) -> Cypher {
    Cypher::new(
        "MATCH (e:Employee)
         WHERE replace(e.name, ' ', '') = $key AND e.name <> $current
         RETURN e.name AS name
         LIMIT 1",
    )
    .text_param("key", normalize_name(name))
    .text_param("current", current)
}

/// Return the first listed name with no Employee node.
pub fn first_missing(names: &[String]) -> Cypher {
    Cypher::new(
        "UNWIND $names AS name
         OPTIONAL MATCH (s:Employee {name: name})
         WITH name, s
         WHERE s IS NULL
         RETURN name
         LIMIT 1",
    )
    .list_param("names", names.to_vec())
}

/// Create the employee and attach it to its department, creating the department if absent.
pub fn create(employee: &NewEmployee) -> Cypher {
    Cypher::new(
        "MERGE (d:Department {name: $department})
         CREATE (e:Employee {name: $name, position: $position, salary: $salary})-[:WORKS_IN]->(d)",
    )
    .text_param("department", employee.department.as_str())
    .text_param("name", employee.name.as_str())
    .text_param("position", employee.position.as_str())
    .number_param("salary", employee.salary.amount())
}

/// Link a manager to each subordinate. Returns the number of linked subordinates.
pub fn link_subordinates(manager: &str, subordinates: &[String]) -> Cypher {
    Cypher::new(
        "MATCH (m:Employee {name: $manager})
         UNWIND $subordinates AS subordinate
         MATCH (s:Employee {name: subordinate})
         MERGE (m)-[:MANAGES]->(s)
         RETURN count(DISTINCT s) AS linked",
    )
    .text_param("manager", manager)
    .list_param("subordinates", subordinates.to_vec())
}

/// Replace the employee's WORKS_IN edge.
pub fn move_to_department(name: &str, department: &str) -> Cypher {
    Cypher::new(
        "MATCH (e:Employee {name: $name})
         OPTIONAL MATCH (e)-[w:WORKS_IN]->()
         DELETE w
         WITH DISTINCT e
         MERGE (d:Department {name: $department})
         CREATE (e)-[:WORKS_IN]->(d)",
    )
    .text_param("name", name)
    .text_param("department", department)
}

/// Set the scalar attributes present in `update`. `None` when there are none.
///
/// The SET list is assembled from fixed fragments, one per allow-listed
/// attribute.
pub fn set_attributes(name: &str, update: &EmployeeUpdate) -> Option<Cypher> {
    let mut assignments = Vec::new();
    let mut cypher = Cypher::new(String::new()).text_param("current", name);

    if let Some(position) = &update.position {
        assignments.push("e.position = $position");
        cypher = cypher.text_param("position", position.as_str());
    }
    if let Some(salary) = update.salary {
        assignments.push("e.salary = $salary");
        cypher = cypher.number_param("salary", salary.amount());
    }
    if let Some(new_name) = &update.name {
        assignments.push("e.name = $new_name");
        cypher = cypher.text_param("new_name", new_name.as_str());
    }

    if assignments.is_empty() {
        return None;
    }
    cypher.text = format!(
        "MATCH (e:Employee {{name: $current}}) SET {}",
        assignments.join(", ")
    );
    Some(cypher)
}

/// Fetch one employee with their department.
pub fn get(name: &str) -> Cypher {
    Cypher::new(
        "MATCH (e:Employee {name: $name})
         OPTIONAL MATCH (e)-[:WORKS_IN]->(d:Department)
         RETURN e.name AS employee, coalesce(e.position, '') AS position,
                toFloat(e.salary) AS salary, coalesce(d.name, '') AS department
         LIMIT 1",
    )
    .text_param("name", name)
}

/// Remove the employee and every relationship it has.
pub fn delete(name: &str) -> Cypher {
    Cypher::new("MATCH (e:Employee {name: $name}) DETACH DELETE e").text_param("name", name)
}

/// Employees one MANAGES hop from the manager.
pub fn subordinates(manager: &str) -> Cypher {
    Cypher::new(
        "MATCH (m:Employee {name: $manager})-[:MANAGES]->(e:Employee)
         RETURN DISTINCT e.name AS name, coalesce(e.position, '') AS position,
                toFloat(e.salary) AS salary
         ORDER BY name",
    )
    .text_param("manager", manager)
}

pub fn parse_record(row: &Row) -> DirectoryResult<EmployeeRecord> {
    Ok(EmployeeRecord {
        employee: field(row, "employee")?,
        position: field(row, "position")?,
        salary: salary_field(row, "salary")?,
        department: field(row, "department")?,
    })
}

pub fn parse_summary(row: &Row) -> DirectoryResult<EmployeeSummary> {
    Ok(EmployeeSummary {
        name: field(row, "name")?,
        position: field(row, "position")?,
        salary: salary_field(row, "salary")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgdir_core::employee::model::Salary;
    use crate::queries::Param;

    #[test]
    fn test_lookup_uses_normalized_key() {
        let cypher = find_by_normalized_name(" Ann Lee");
        assert!(cypher.text.contains("replace(e.name, ' ', '') = $key"));
        assert_eq!(cypher.params, vec![("key".to_string(), Param::Text("AnnLee".to_string()))]);
    }

    #[test]
    fn test_set_attributes_uses_fixed_fragments() {
        let update = EmployeeUpdate {
            salary: Salary::new(9500.0),
            position: Some("lead".to_string()),
            ..Default::default()
        };
        let cypher = set_attributes("Ann Lee", &update).unwrap();
        assert_eq!(
            cypher.text,
            "MATCH (e:Employee {name: $current}) SET e.position = $position, e.salary = $salary"
        );
        assert!(!cypher.text.contains("lead"));
        assert_eq!(cypher.params.len(), 3);
    }

    #[test]
    fn test_set_attributes_without_scalars() {
        let update = EmployeeUpdate {
            department: Some("Ops".to_string()),
            ..Default::default()
        };
        assert!(set_attributes("Ann", &update).is_none());
    }

    #[test]
    fn test_list_places_filter_after_projection() {
        let query = ListQuery::<EmployeeField>::parse(Some("position=manager"), None).unwrap();
        let cypher = list(&query);
        let with = cypher.text.find("WITH").unwrap();
        let filter = cypher.text.find("WHERE position = $f0").unwrap();
        let ret = cypher.text.find("RETURN").unwrap();
        assert!(with < filter && filter < ret);
        assert!(cypher.text.ends_with("ORDER BY employee ASC"));
    }
}
