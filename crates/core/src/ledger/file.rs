use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::domain::sale::SaleRecord;
use crate::storage::{self, StorageError};

/// On-disk shape of the ledger: every sale plus the last reset marker.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerDocument {
    #[serde(rename = "ventes", default)]
    pub sales: Vec<SaleRecord>,
    #[serde(rename = "derniere_reset", default)]
    pub last_reset: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LedgerFile {
    path: PathBuf,
}

impl LedgerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<LedgerDocument>, StorageError> {
        storage::read_json(&self.path)
    }

    pub fn save(
        &self,
        sales: &[SaleRecord],
        last_reset: &DateTime<Local>,
    ) -> Result<(), StorageError> {
        #[derive(Serialize)]
        struct Borrowed<'a> {
            ventes: &'a [SaleRecord],
            derniere_reset: String,
        }

        storage::write_json(
            &self.path,
            &Borrowed { ventes: sales, derniere_reset: last_reset.to_rfc3339() },
        )
    }
}

/// Accepts RFC 3339 markers and the naive ISO markers older deployments wrote,
/// reading the latter as local time.
pub fn parse_reset_marker(raw: &str) -> Result<DateTime<Local>, StorageError> {
    let trimmed = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Local));
    }

    let naive = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|_| StorageError::Timestamp(trimmed.to_owned()))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| StorageError::Timestamp(trimmed.to_owned()))
}
