use async_trait::async_trait;
use thiserror::Error;

use coffre_core::domain::employee::EmployeeRecord;

pub mod employee;
pub mod memory;

pub use employee::SqlEmployeeDirectory;
pub use memory::InMemoryEmployeeDirectory;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Employees whose status is active, queried fresh on every call.
    async fn list_active(&self) -> Result<Vec<EmployeeRecord>, RepositoryError>;
}
