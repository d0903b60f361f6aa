//! Web server command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use orgdir_graph::GraphStore;
use std::path::PathBuf;
use std::sync::Arc;

use super::Neo4jArgs;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value = "5000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (defaults to ./orgdir-serve.log)
    #[arg(long, requires = "log")]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs, neo4j: &Neo4jArgs) -> Result<()> {
    let client = neo4j.connect().await?;
    let store = Arc::new(GraphStore::new(client));

    println!();
    println!("  {} {}", "Orgdir".cyan().bold(), "API Server".bold());
    println!();
    println!("  {}      http://{}:{}", "API".green(), args.host, args.port);
    println!("  {}    {}", "Neo4j".green(), neo4j.neo4j_uri);
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    orgdir_web::run_server(store, &args.host, args.port).await?;

    Ok(())
}
