use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::inventory::{InventoryAction, InventoryEvent, WarehouseId};
use crate::errors::DomainError;
use crate::storage::{self, StorageError};

pub type WarehouseStock = BTreeMap<String, u32>;
pub type InventorySnapshot = BTreeMap<WarehouseId, WarehouseStock>;

/// Per-warehouse item counters. Quantities never go below zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InventoryStore {
    warehouses: InventorySnapshot,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(warehouses: InventorySnapshot) -> Self {
        Self { warehouses }
    }

    /// Applies one movement and returns the resulting quantity.
    pub fn apply(
        &mut self,
        warehouse: &WarehouseId,
        item: &str,
        quantity: u32,
        action: InventoryAction,
    ) -> u32 {
        let stock = self.warehouses.entry(warehouse.clone()).or_default();
        let current = stock.entry(item.to_owned()).or_insert(0);
        *current = match action {
            InventoryAction::Deposit => current.saturating_add(quantity),
            InventoryAction::Withdraw => current.saturating_sub(quantity),
        };
        *current
    }

    pub fn apply_event(&mut self, event: &InventoryEvent) -> u32 {
        self.apply(&event.warehouse_id, &event.item, event.quantity, event.action)
    }

    pub fn read(&self) -> &InventorySnapshot {
        &self.warehouses
    }

    pub fn read_warehouse(&self, warehouse: &WarehouseId) -> Option<&WarehouseStock> {
        self.warehouses.get(warehouse)
    }

    pub fn quantity(&self, warehouse: &WarehouseId, item: &str) -> Option<u32> {
        self.warehouses.get(warehouse).and_then(|stock| stock.get(item)).copied()
    }

    /// Removes one item entry, dropping the warehouse once it holds nothing.
    pub fn delete(&mut self, warehouse: &WarehouseId, item: &str) -> Result<u32, DomainError> {
        let not_found = || DomainError::NotFound(format!("item `{item}` dans `{warehouse}`"));

        let stock = self.warehouses.get_mut(warehouse).ok_or_else(not_found)?;
        let removed = stock.remove(item).ok_or_else(not_found)?;
        if stock.is_empty() {
            self.warehouses.remove(warehouse);
        }
        Ok(removed)
    }
}

/// JSON mirror of the inventory, rewritten wholesale on each save.
#[derive(Clone, Debug)]
pub struct InventoryFile {
    path: PathBuf,
}

impl InventoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<InventoryStore, StorageError> {
        let snapshot = storage::read_json::<InventorySnapshot>(&self.path)?;
        Ok(snapshot.map(InventoryStore::from_snapshot).unwrap_or_default())
    }

    pub fn save(&self, store: &InventoryStore) -> Result<(), StorageError> {
        storage::write_json(&self.path, store.read())
    }
}
