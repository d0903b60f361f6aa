//! Directory status command.

use anyhow::Result;
use colored::Colorize;

use super::Neo4jArgs;

/// Show employee, department and relationship counts.
pub async fn execute(neo4j: &Neo4jArgs) -> Result<()> {
    let client = neo4j.connect().await?;

    println!("{}", "Organization Directory Status".bold());
    println!("{}", "─".repeat(40));

    let counts = client.get_counts().await?;
    println!("  Employees:     {}", counts.employees.to_string().cyan());
    println!("  Departments:   {}", counts.departments.to_string().cyan());
    println!("  Relationships: {}", counts.relationships.to_string().cyan());

    println!("{}", "─".repeat(40));

    Ok(())
}
