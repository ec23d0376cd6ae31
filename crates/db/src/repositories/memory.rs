use coffre_core::domain::employee::EmployeeRecord;

use super::{EmployeeDirectory, RepositoryError};

/// Fixed roster for tests and for running the gateway without a database.
#[derive(Default)]
pub struct InMemoryEmployeeDirectory {
    employees: Vec<EmployeeRecord>,
}

impl InMemoryEmployeeDirectory {
    pub fn new(employees: Vec<EmployeeRecord>) -> Self {
        Self { employees }
    }
}

#[async_trait::async_trait]
impl EmployeeDirectory for InMemoryEmployeeDirectory {
    async fn list_active(&self) -> Result<Vec<EmployeeRecord>, RepositoryError> {
        Ok(self.employees.clone())
    }
}

#[cfg(test)]
mod tests {
    use coffre_core::domain::employee::EmployeeRecord;

    use crate::repositories::{EmployeeDirectory, InMemoryEmployeeDirectory};

    fn employee(last_name: &str) -> EmployeeRecord {
        EmployeeRecord {
            last_name: last_name.to_string(),
            first_name: "Jo".to_string(),
            grade: "Recrue".to_string(),
        }
    }

    #[tokio::test]
    async fn in_memory_directory_lists_its_fixed_roster() {
        let directory = InMemoryEmployeeDirectory::new(vec![employee("Martin"), employee("Petit")]);
        assert_eq!(
            directory.list_active().await.expect("list"),
            vec![employee("Martin"), employee("Petit")]
        );
        assert!(InMemoryEmployeeDirectory::default().list_active().await.expect("list").is_empty());
    }
}
