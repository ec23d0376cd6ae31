//! Read-only access to the employee roster database.
//!
//! The roster (`employes` table with `nom`, `prenom`, `grade`, `statut`) is
//! owned by another tool; this crate never writes to it nor migrates it.

pub mod connection;
pub mod repositories;

pub use connection::{connect_read_only, connect_with_settings, DbPool};
pub use repositories::{
    EmployeeDirectory, InMemoryEmployeeDirectory, RepositoryError, SqlEmployeeDirectory,
};
