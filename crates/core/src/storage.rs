use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not read `{path}`: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write `{path}`: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("could not decode `{path}`: {source}")]
    Decode { path: PathBuf, source: serde_json::Error },
    #[error("could not encode state for `{path}`: {source}")]
    Encode { path: PathBuf, source: serde_json::Error },
    #[error("invalid reset timestamp `{0}`")]
    Timestamp(String),
}

/// Reads a JSON document, returning `None` when the file does not exist yet.
pub fn read_json<T>(path: &Path) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
{
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(StorageError::Read { path: path.to_path_buf(), source }),
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Decode { path: path.to_path_buf(), source })
}

/// Replaces the whole file with the pretty-printed document. The write goes to
/// a sibling temp file first so readers never observe a truncated document.
pub fn write_json<T>(path: &Path, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
{
    let encoded = serde_json::to_vec_pretty(value)
        .map_err(|source| StorageError::Encode { path: path.to_path_buf(), source })?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|source| StorageError::Write { path: path.to_path_buf(), source })?;
    }

    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);

    fs::write(&staging, encoded)
        .and_then(|()| fs::rename(&staging, path))
        .map_err(|source| StorageError::Write { path: path.to_path_buf(), source })
}
