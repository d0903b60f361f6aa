//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use orgdir_graph::{GraphClient, GraphConfig};

pub mod schema;
pub mod serve;
pub mod status;

/// Organization directory service backed by Neo4j
#[derive(Parser)]
#[command(name = "orgdir")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub neo4j: Neo4jArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Neo4j connection settings, shared by every command.
#[derive(Args)]
pub struct Neo4jArgs {
    /// Bolt URI of the Neo4j server
    #[arg(long, env = "NEO4J_URI", default_value = "bolt://localhost:7687", global = true)]
    pub neo4j_uri: String,

    /// Neo4j user
    #[arg(long, env = "NEO4J_USERNAME", default_value = "neo4j", global = true)]
    pub neo4j_user: String,

    /// Neo4j password
    #[arg(long, env = "NEO4J_PASSWORD", default_value = "", hide_env_values = true, global = true)]
    pub neo4j_password: String,

    /// Neo4j database name
    #[arg(long, env = "NEO4J_DATABASE", default_value = "neo4j", global = true)]
    pub neo4j_database: String,

    /// Maximum pooled Neo4j connections
    #[arg(long, default_value = "16", global = true)]
    pub max_connections: usize,
}

impl Neo4jArgs {
    pub fn config(&self) -> GraphConfig {
        GraphConfig {
            uri: self.neo4j_uri.clone(),
            user: self.neo4j_user.clone(),
            password: self.neo4j_password.clone(),
            database: self.neo4j_database.clone(),
            max_connections: self.max_connections,
        }
    }

    pub async fn connect(&self) -> Result<GraphClient> {
        let config = self.config();
        tracing::debug!(uri = %config.uri, database = %config.database, "Connecting to Neo4j");
        GraphClient::connect(&config).await
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve(serve::ServeArgs),

    /// Create the uniqueness constraints in Neo4j
    Schema,

    /// Show employee, department and relationship counts
    Status,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(args) => serve::execute(args, &self.neo4j).await,
            Commands::Schema => schema::execute(&self.neo4j).await,
            Commands::Status => status::execute(&self.neo4j).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["orgdir", "serve", "--neo4j-password", "secret"]).unwrap();
        let config = cli.neo4j.config();
        assert_eq!(config.password, "secret");
        assert_eq!(config.max_connections, 16);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.host, "127.0.0.1");
                assert_eq!(args.port, 5000);
                assert!(!args.log);
            }
            _ => panic!("expected serve"),
        }
    }
}
