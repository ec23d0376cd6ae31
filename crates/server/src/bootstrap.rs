use std::sync::Arc;

use chrono::Local;
use coffre_core::config::{AppConfig, ConfigError};
use coffre_core::{InventoryFile, InventoryStore, LedgerFile, LedgerPolicy, SalesLedger, StorageError};
use coffre_db::{connect_read_only, SqlEmployeeDirectory};
use thiserror::Error;
use tracing::info;

use crate::state::AppState;

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("sales ledger could not be loaded: {0}")]
    Ledger(#[source] StorageError),
    #[error("inventory snapshot could not be loaded: {0}")]
    Inventory(#[source] StorageError),
    #[error("roster database url is invalid: {0}")]
    Roster(#[source] sqlx::Error),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting gateway bootstrap");

    let ledger = SalesLedger::open(
        LedgerFile::new(&config.storage.ledger_path),
        LedgerPolicy {
            admin_password: config.ledger.admin_password.clone(),
            schedule: config.ledger.schedule(),
        },
        Local::now(),
    )
    .map_err(BootstrapError::Ledger)?;
    info!(
        event_name = "system.bootstrap.ledger_loaded",
        path = %config.storage.ledger_path.display(),
        sales = ledger.len(),
        last_reset = %ledger.last_reset().to_rfc3339(),
        "sales ledger loaded"
    );

    let inventory_file = config.storage.inventory_path.as_ref().map(InventoryFile::new);
    let inventory = match &inventory_file {
        Some(file) => file.load().map_err(BootstrapError::Inventory)?,
        None => InventoryStore::new(),
    };
    info!(
        event_name = "system.bootstrap.inventory_loaded",
        snapshot = inventory_file.is_some(),
        warehouses = inventory.read().len(),
        "inventory loaded"
    );

    let roster_pool = connect_read_only(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .map_err(BootstrapError::Roster)?;

    let state = AppState::new(
        ledger,
        inventory,
        inventory_file,
        Arc::new(SqlEmployeeDirectory::new(roster_pool)),
        config.warehouses.clone(),
    );

    Ok(Application { config, state })
}
