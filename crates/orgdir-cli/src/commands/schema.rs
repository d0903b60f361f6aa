//! Schema command.

use anyhow::Result;
use colored::Colorize;

use super::Neo4jArgs;

pub async fn execute(neo4j: &Neo4jArgs) -> Result<()> {
    let client = neo4j.connect().await?;
    let applied = orgdir_graph::schema::initialize_schema(&client).await?;

    println!(
        "{} {} constraint statements applied",
        "✓".green().bold(),
        applied
    );
    Ok(())
}
