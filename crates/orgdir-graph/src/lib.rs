//! # Orgdir Graph
//!
//! Neo4j integration for the organization directory.
//!
//! Provides the connection client, schema constraints, Cypher compilation
//! of allow-list filters, and a transactional [`GraphStore`] implementing
//! `orgdir_core::DirectoryStore`.

pub mod client;
pub mod queries;
pub mod schema;
pub mod store;

pub use client::{GraphClient, GraphConfig, GraphCounts};
pub use store::GraphStore;
