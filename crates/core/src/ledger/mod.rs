//! Append-only sales ledger mirrored to a JSON file, with manual and weekly
//! resets.

mod file;
mod schedule;

use chrono::{DateTime, Local};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::domain::sale::SaleRecord;
use crate::errors::DomainError;
use crate::storage::StorageError;

pub use file::{parse_reset_marker, LedgerDocument, LedgerFile};
pub use schedule::WeeklySchedule;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Clone, Debug)]
pub struct LedgerPolicy {
    pub admin_password: SecretString,
    /// `None` disables automatic resets.
    pub schedule: Option<WeeklySchedule>,
}

pub struct SalesLedger {
    sales: Vec<SaleRecord>,
    last_reset: DateTime<Local>,
    file: LedgerFile,
    policy: LedgerPolicy,
}

impl SalesLedger {
    /// Loads the ledger from `file`, starting empty with `now` as reset marker
    /// when the file does not exist yet.
    pub fn open(
        file: LedgerFile,
        policy: LedgerPolicy,
        now: DateTime<Local>,
    ) -> Result<Self, StorageError> {
        let (sales, last_reset) = match file.load()? {
            Some(document) => {
                let last_reset = match document.last_reset.as_deref() {
                    Some(raw) => parse_reset_marker(raw)?,
                    None => now,
                };
                (document.sales, last_reset)
            }
            None => (Vec::new(), now),
        };

        Ok(Self { sales, last_reset, file, policy })
    }

    pub fn records(&self) -> &[SaleRecord] {
        &self.sales
    }

    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }

    pub fn last_reset(&self) -> DateTime<Local> {
        self.last_reset
    }

    pub fn file(&self) -> &LedgerFile {
        &self.file
    }

    /// Appends and rewrites the file. A failed write leaves memory untouched.
    pub fn append(&mut self, record: SaleRecord) -> Result<usize, StorageError> {
        self.sales.push(record);
        if let Err(error) = self.file.save(&self.sales, &self.last_reset) {
            self.sales.pop();
            return Err(error);
        }
        Ok(self.sales.len())
    }

    pub fn reset(&mut self, password: &str, now: DateTime<Local>) -> Result<usize, LedgerError> {
        if password != self.policy.admin_password.expose_secret() {
            return Err(DomainError::Unauthorized.into());
        }
        Ok(self.clear(now)?)
    }

    /// Clears the ledger when `now` has crossed the next weekly boundary since
    /// the last reset. Returns whether a reset happened.
    pub fn auto_reset_if_due(&mut self, now: DateTime<Local>) -> Result<bool, StorageError> {
        let Some(schedule) = self.policy.schedule else {
            return Ok(false);
        };
        if !schedule.is_due(&self.last_reset, &now) {
            return Ok(false);
        }

        self.clear(now)?;
        Ok(true)
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.file.save(&self.sales, &self.last_reset)
    }

    fn clear(&mut self, now: DateTime<Local>) -> Result<usize, StorageError> {
        self.file.save(&[], &now)?;
        let cleared = self.sales.len();
        self.sales.clear();
        self.last_reset = now;
        Ok(cleared)
    }
}
