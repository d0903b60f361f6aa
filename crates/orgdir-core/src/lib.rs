//! Orgdir Core Library
//!
//! Domain models and directory operations for the organization directory:
//! employees, departments and the management relationships between them.
//!
//! Operations validate their input and delegate persistence to a
//! [`DirectoryStore`], which owns transaction boundaries.

pub mod department;
pub mod employee;
pub mod error;
pub mod filter;
pub mod store;

pub use error::{DirectoryError, DirectoryResult};
pub use store::DirectoryStore;
