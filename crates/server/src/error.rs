use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use coffre_core::{ApplicationError, DomainError, InterfaceError, LedgerError, StorageError};
use coffre_db::RepositoryError;

/// Handler error rendered as `{"erreur": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(InterfaceError::BadRequest { message: message.into() })
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::Forbidden { .. } => StatusCode::FORBIDDEN,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<InterfaceError> for ApiError {
    fn from(value: InterfaceError) -> Self {
        Self(value)
    }
}

impl From<ApplicationError> for ApiError {
    fn from(value: ApplicationError) -> Self {
        Self(value.into())
    }
}

impl From<DomainError> for ApiError {
    fn from(value: DomainError) -> Self {
        Self(value.into())
    }
}

impl From<LedgerError> for ApiError {
    fn from(value: LedgerError) -> Self {
        ApplicationError::from(value).into()
    }
}

impl From<StorageError> for ApiError {
    fn from(value: StorageError) -> Self {
        ApplicationError::from(value).into()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Directory(value.to_string()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(
                event_name = "gateway.request.failed",
                status = status.as_u16(),
                error = %self.0,
                "request failed"
            );
        }
        (status, Json(json!({ "erreur": self.0.user_message() }))).into_response()
    }
}
