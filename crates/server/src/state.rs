use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use coffre_core::config::WarehouseConfig;
use coffre_core::{
    ApplicationError, InventoryEvent, InventoryFile, InventoryStore, SalesLedger, StorageError,
};
use coffre_db::EmployeeDirectory;

/// Everything the handlers share. Mutations on each store are serialized by
/// its lock.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Mutex<SalesLedger>>,
    pub inventory: Arc<RwLock<InventoryStore>>,
    pub inventory_file: Option<InventoryFile>,
    pub employees: Arc<dyn EmployeeDirectory>,
    pub warehouses: WarehouseConfig,
}

impl AppState {
    pub fn new(
        ledger: SalesLedger,
        inventory: InventoryStore,
        inventory_file: Option<InventoryFile>,
        employees: Arc<dyn EmployeeDirectory>,
        warehouses: WarehouseConfig,
    ) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
            inventory: Arc::new(RwLock::new(inventory)),
            inventory_file,
            employees,
            warehouses,
        }
    }

    pub async fn apply_movement(&self, event: &InventoryEvent) -> u32 {
        self.inventory.write().await.apply_event(event)
    }

    /// Runs the weekly reset when due. Failures are logged; the request
    /// carries on against the unchanged ledger.
    pub async fn auto_reset_if_due(&self, now: DateTime<Local>) {
        let mut ledger = self.ledger.lock().await;
        let cleared = ledger.len();
        match ledger.auto_reset_if_due(now) {
            Ok(true) => info!(
                event_name = "gateway.ledger.auto_reset",
                cleared,
                reset_at = %now.to_rfc3339(),
                "weekly sales reset applied"
            ),
            Ok(false) => {}
            Err(error) => warn!(
                event_name = "gateway.ledger.auto_reset_failed",
                error = %error,
                "weekly sales reset could not be persisted"
            ),
        }
    }

    /// Writes the inventory snapshot if one is configured. Returns whether a
    /// file was written.
    pub async fn snapshot_inventory(&self) -> Result<bool, StorageError> {
        let Some(file) = &self.inventory_file else {
            return Ok(false);
        };
        let store = self.inventory.read().await.clone();
        file.save(&store)?;
        Ok(true)
    }

    pub async fn flush(&self) -> Result<(), ApplicationError> {
        self.ledger.lock().await.flush()?;
        self.snapshot_inventory().await?;
        Ok(())
    }

    pub fn spawn_snapshot_task(&self, every: Duration) -> Option<JoinHandle<()>> {
        if self.inventory_file.is_none() || every.is_zero() {
            return None;
        }

        let state = self.clone();
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(error) = state.snapshot_inventory().await {
                    warn!(
                        event_name = "gateway.inventory.snapshot_failed",
                        error = %error,
                        "periodic inventory snapshot failed"
                    );
                }
            }
        }))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use chrono::{DateTime, Local, TimeZone};
    use tempfile::TempDir;

    use coffre_core::config::AppConfig;
    use coffre_core::{
        EmployeeRecord, InventoryFile, InventoryStore, LedgerFile, LedgerPolicy, SalesLedger,
        WeeklySchedule,
    };
    use coffre_db::InMemoryEmployeeDirectory;

    use super::AppState;

    pub const PASSWORD: &str = "reset06";

    pub fn opened_at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 7, 9, 10, 0, 0).single().expect("unambiguous local time")
    }

    pub fn employee(last_name: &str, first_name: &str, grade: &str) -> EmployeeRecord {
        EmployeeRecord {
            last_name: last_name.to_owned(),
            first_name: first_name.to_owned(),
            grade: grade.to_owned(),
        }
    }

    pub fn state_in(dir: &TempDir, schedule: Option<WeeklySchedule>) -> AppState {
        let ledger = SalesLedger::open(
            LedgerFile::new(dir.path().join("ventes.json")),
            LedgerPolicy { admin_password: PASSWORD.to_owned().into(), schedule },
            opened_at(),
        )
        .expect("open ledger");

        AppState::new(
            ledger,
            InventoryStore::new(),
            Some(InventoryFile::new(dir.path().join("coffres.json"))),
            Arc::new(InMemoryEmployeeDirectory::new(vec![employee("Martin", "Luc", "Chef")])),
            AppConfig::default().warehouses,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use tempfile::TempDir;

    use super::fixtures::{employee, opened_at, state_in, PASSWORD};
    use super::AppState;
    use coffre_core::config::AppConfig;
    use coffre_core::{
        InventoryAction, InventoryEvent, InventoryFile, InventoryStore, LedgerFile, LedgerPolicy,
        SaleRecord, SaleEvent, SalesLedger, WarehouseId, WeeklySchedule,
    };
    use coffre_db::InMemoryEmployeeDirectory;

    fn deposit(quantity: u32) -> InventoryEvent {
        InventoryEvent {
            player: "Bob".to_owned(),
            warehouse_id: WarehouseId::new("garage"),
            item: "Pneu".to_owned(),
            quantity,
            action: InventoryAction::Deposit,
        }
    }

    #[tokio::test]
    async fn flush_writes_inventory_snapshot() {
        let dir = TempDir::new().expect("tempdir");
        let state = state_in(&dir, None);
        state.apply_movement(&deposit(4)).await;

        state.flush().await.expect("flush");

        let reloaded = InventoryFile::new(dir.path().join("coffres.json")).load().expect("load");
        assert_eq!(reloaded.quantity(&WarehouseId::new("garage"), "Pneu"), Some(4));
        assert!(dir.path().join("ventes.json").exists());
    }

    #[tokio::test]
    async fn auto_reset_clears_ledger_once_boundary_passes() {
        let dir = TempDir::new().expect("tempdir");
        let state = state_in(&dir, Some(WeeklySchedule::default()));
        state
            .ledger
            .lock()
            .await
            .append(SaleRecord::from_event(SaleEvent {
                seller: "Alice".to_owned(),
                item: "Emmental".to_owned(),
                quantity: 3,
                price: None,
            }))
            .expect("append");

        state.auto_reset_if_due(opened_at() + Duration::days(1)).await;
        assert_eq!(state.ledger.lock().await.len(), 1);

        state.auto_reset_if_due(opened_at() + Duration::days(5)).await;
        assert!(state.ledger.lock().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_task_writes_inventory_each_interval() {
        let dir = TempDir::new().expect("tempdir");
        let snapshot = InventoryFile::new(dir.path().join("coffres.json"));
        let state = state_in(&dir, None);
        state.apply_movement(&deposit(7)).await;

        let task = state
            .spawn_snapshot_task(std::time::Duration::from_secs(60))
            .expect("snapshot task for a configured path");

        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        assert!(!dir.path().join("coffres.json").exists(), "no snapshot before the first interval");

        tokio::time::sleep(std::time::Duration::from_secs(31)).await;
        let restored = snapshot.load().expect("first snapshot");
        assert_eq!(restored.quantity(&WarehouseId::new("garage"), "Pneu"), Some(7));

        state.apply_movement(&deposit(3)).await;
        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        let restored = snapshot.load().expect("second snapshot");
        assert_eq!(restored.quantity(&WarehouseId::new("garage"), "Pneu"), Some(10));

        task.abort();
    }

    #[tokio::test]
    async fn snapshot_task_needs_a_path_and_an_interval() {
        let dir = TempDir::new().expect("tempdir");
        let state = state_in(&dir, None);
        assert!(state.spawn_snapshot_task(std::time::Duration::ZERO).is_none());

        let ledger = SalesLedger::open(
            LedgerFile::new(dir.path().join("ventes.json")),
            LedgerPolicy { admin_password: PASSWORD.to_owned().into(), schedule: None },
            opened_at(),
        )
        .expect("open ledger");
        let memory_only = AppState::new(
            ledger,
            InventoryStore::new(),
            None,
            Arc::new(InMemoryEmployeeDirectory::new(vec![employee("Martin", "Luc", "Chef")])),
            AppConfig::default().warehouses,
        );
        assert!(memory_only.spawn_snapshot_task(std::time::Duration::from_secs(60)).is_none());
    }
}
