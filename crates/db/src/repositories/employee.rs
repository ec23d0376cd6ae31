use async_trait::async_trait;
use tracing::debug;

use coffre_core::domain::employee::EmployeeRecord;

use super::{EmployeeDirectory, RepositoryError};
use crate::DbPool;

const ACTIVE_STATUS: &str = "actif";

pub struct SqlEmployeeDirectory {
    pool: DbPool,
}

impl SqlEmployeeDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeDirectory for SqlEmployeeDirectory {
    async fn list_active(&self) -> Result<Vec<EmployeeRecord>, RepositoryError> {
        let rows: Vec<(Option<String>, Option<String>, Option<String>)> = sqlx::query_as(
            "SELECT nom, prenom, grade FROM employes WHERE statut = ? ORDER BY nom, prenom",
        )
        .bind(ACTIVE_STATUS)
        .fetch_all(&self.pool)
        .await?;

        debug!(
            event_name = "roster.employees.listed",
            active_count = rows.len(),
            "queried active employees"
        );

        Ok(rows
            .into_iter()
            .map(|(last_name, first_name, grade)| EmployeeRecord {
                last_name: last_name.unwrap_or_default(),
                first_name: first_name.unwrap_or_default(),
                grade: grade.unwrap_or_default(),
            })
            .collect())
    }
}
