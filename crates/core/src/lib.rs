pub mod config;
pub mod domain;
pub mod errors;
pub mod inventory;
pub mod ledger;
pub mod parser;
pub mod storage;

pub use domain::employee::EmployeeRecord;
pub use domain::inventory::{InventoryAction, InventoryEvent, InventoryMovement, WarehouseId};
pub use domain::sale::{SaleEvent, SaleRecord};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use inventory::{InventoryFile, InventorySnapshot, InventoryStore, WarehouseStock};
pub use ledger::{LedgerError, LedgerFile, LedgerPolicy, SalesLedger, WeeklySchedule};
pub use parser::{parse_event, parse_inventory, parse_sale, ParsedEvent};
pub use storage::StorageError;
