use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

impl HealthCheck {
    fn ready(detail: String) -> Self {
        Self { status: "ready", detail }
    }

    fn degraded(detail: String) -> Self {
        Self { status: "degraded", detail }
    }

    fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub ledger: HealthCheck,
    pub roster: HealthCheck,
    pub checked_at: String,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let ledger = ledger_check(&state).await;
    let roster = roster_check(&state).await;
    let ready = ledger.is_ready() && roster.is_ready();

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck::ready("coffre-server runtime initialized".to_string()),
        ledger,
        roster,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn ledger_check(state: &AppState) -> HealthCheck {
    let ledger = state.ledger.lock().await;
    let path = ledger.file().path();

    if path.is_file() {
        return HealthCheck::ready(format!("{} sales in `{}`", ledger.len(), path.display()));
    }

    let parent_exists = path
        .parent()
        .map_or(true, |parent| parent.as_os_str().is_empty() || parent.is_dir());
    if parent_exists {
        HealthCheck::ready(format!("`{}` will be created on first sale", path.display()))
    } else {
        HealthCheck::degraded(format!("directory of `{}` does not exist", path.display()))
    }
}

async fn roster_check(state: &AppState) -> HealthCheck {
    match state.employees.list_active().await {
        Ok(employees) => HealthCheck::ready(format!("{} active employees", employees.len())),
        Err(error) => HealthCheck::degraded(format!("roster query failed: {error}")),
    }
}
