use thiserror::Error;

use crate::ledger::LedgerError;
use crate::storage::StorageError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("invalid quantity `{0}`")]
    InvalidQuantity(String),
    #[error("invalid action `{0}`")]
    InvalidAction(String),
    #[error("warehouse `{0}` is not in the allow-list")]
    UnknownWarehouse(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("admin password mismatch")]
    Unauthorized,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("employee directory failure: {0}")]
    Directory(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String },
    #[error("forbidden: {message}")]
    Forbidden { message: String },
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String },
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl InterfaceError {
    /// Message safe to hand back to dashboard and webhook callers.
    pub fn user_message(&self) -> String {
        match self {
            Self::BadRequest { message } | Self::NotFound { message } => message.clone(),
            Self::Forbidden { .. } => "Mot de passe incorrect".to_owned(),
            Self::ServiceUnavailable { .. } => {
                "service temporairement indisponible".to_owned()
            }
            Self::Internal { .. } => "erreur interne".to_owned(),
        }
    }
}

impl From<StorageError> for ApplicationError {
    fn from(value: StorageError) -> Self {
        Self::Persistence(value.to_string())
    }
}

impl From<LedgerError> for ApplicationError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::Domain(error) => Self::Domain(error),
            LedgerError::Storage(error) => error.into(),
        }
    }
}

impl From<DomainError> for InterfaceError {
    fn from(value: DomainError) -> Self {
        ApplicationError::from(value).into()
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(DomainError::MissingField(_)) => {
                Self::BadRequest { message: "donnée manquante".to_owned() }
            }
            ApplicationError::Domain(DomainError::InvalidQuantity(_)) => {
                Self::BadRequest { message: "quantité invalide".to_owned() }
            }
            ApplicationError::Domain(DomainError::InvalidAction(_)) => {
                Self::BadRequest { message: "action invalide".to_owned() }
            }
            ApplicationError::Domain(DomainError::UnknownWarehouse(warehouse)) => {
                Self::BadRequest { message: format!("entrepôt inconnu: {warehouse}") }
            }
            ApplicationError::Domain(DomainError::NotFound(what)) => {
                Self::NotFound { message: format!("{what} introuvable") }
            }
            ApplicationError::Domain(DomainError::Unauthorized) => {
                Self::Forbidden { message: "admin password mismatch".to_owned() }
            }
            ApplicationError::Persistence(message) | ApplicationError::Directory(message) => {
                Self::ServiceUnavailable { message }
            }
            ApplicationError::Configuration(message) => Self::Internal { message },
        }
    }
}
