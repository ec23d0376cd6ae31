//! Gateway routes.
//!
//! Dashboard endpoints:
//! - `GET    /api/employes`                    : active employees
//! - `GET    /api/ventes`                      : sales ledger
//! - `POST   /api/ventes/reset`                : password-gated ledger reset
//! - `GET    /api/coffres`                     : every warehouse
//! - `GET    /api/coffres/{warehouse}`         : one warehouse
//! - `DELETE /api/coffres/{warehouse}/{item}`  : drop one item entry
//! - `POST   /api/save`                        : flush ledger and inventory to disk
//!
//! Webhooks fed by the chat listener and the in-game bots:
//! - `POST /webhook`        : inventory movement
//! - `POST /webhook/ventes` : sale

use axum::{
    extract::{rejection::JsonRejection, Path, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tracing::info;

use coffre_core::{
    DomainError, EmployeeRecord, InventorySnapshot, SaleRecord, WarehouseId, WarehouseStock,
};

use crate::error::ApiError;
use crate::health;
use crate::payload;
use crate::state::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

fn message(text: impl Into<String>) -> Json<MessageBody> {
    Json(MessageBody { message: text.into() })
}

fn json_body(request: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    request.map(|Json(body)| body).map_err(|_| ApiError::bad_request("corps JSON invalide"))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health::health))
        .route("/api/employes", get(list_employees))
        .route("/api/ventes", get(list_sales))
        .route("/api/ventes/reset", post(reset_sales))
        .route("/api/coffres", get(list_warehouses))
        .route("/api/coffres/{warehouse}", get(read_warehouse))
        .route("/api/coffres/{warehouse}/{item}", delete(delete_item))
        .route("/api/save", post(save))
        .route("/webhook", post(receive_movement))
        .route("/webhook/ventes", post(receive_sale))
        .layer(middleware::from_fn_with_state(state.clone(), auto_reset))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn auto_reset(State(state): State<AppState>, request: Request, next: Next) -> Response {
    state.auto_reset_if_due(Local::now()).await;
    next.run(request).await
}

async fn home() -> &'static str {
    "coffre-server en ligne"
}

pub async fn list_employees(
    State(state): State<AppState>,
) -> Result<Json<Vec<EmployeeRecord>>, ApiError> {
    Ok(Json(state.employees.list_active().await?))
}

pub async fn list_sales(State(state): State<AppState>) -> Json<Vec<SaleRecord>> {
    Json(state.ledger.lock().await.records().to_vec())
}

pub async fn reset_sales(
    State(state): State<AppState>,
    request: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let body = json_body(request)?;
    let password = body.get("password").and_then(Value::as_str).unwrap_or_default();

    let cleared = state.ledger.lock().await.reset(password, Local::now())?;
    info!(event_name = "gateway.ledger.reset", cleared, "sales ledger reset by admin");
    Ok(message("ventes réinitialisées"))
}

pub async fn list_warehouses(State(state): State<AppState>) -> Json<InventorySnapshot> {
    Json(state.inventory.read().await.read().clone())
}

pub async fn read_warehouse(
    State(state): State<AppState>,
    Path(warehouse): Path<String>,
) -> Result<Json<WarehouseStock>, ApiError> {
    let store = state.inventory.read().await;
    let stock = store
        .read_warehouse(&WarehouseId::new(warehouse.as_str()))
        .cloned()
        .ok_or_else(|| DomainError::NotFound(format!("entrepôt `{warehouse}`")))?;
    Ok(Json(stock))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path((warehouse, item)): Path<(String, String)>,
) -> Result<Json<MessageBody>, ApiError> {
    let removed =
        state.inventory.write().await.delete(&WarehouseId::new(warehouse.as_str()), &item)?;
    info!(
        event_name = "gateway.inventory.item_deleted",
        warehouse = %warehouse,
        item = %item,
        removed,
        "inventory entry deleted"
    );
    Ok(message(format!("{item} supprimé de {warehouse}")))
}

pub async fn save(State(state): State<AppState>) -> Result<Json<MessageBody>, ApiError> {
    state.flush().await?;
    info!(event_name = "gateway.state.saved", "ledger and inventory flushed on request");
    Ok(message("données sauvegardées"))
}

pub async fn receive_movement(
    State(state): State<AppState>,
    request: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let body = json_body(request)?;
    let event = payload::inventory_event(&body, &state.warehouses)?;
    let stock = state.apply_movement(&event).await;

    info!(
        event_name = "gateway.inventory.applied",
        warehouse = %event.warehouse_id,
        player = %event.player,
        action = %event.action,
        quantity = event.quantity,
        item = %event.item,
        stock,
        "[{}] {} a {} {}x {}",
        event.warehouse_id,
        event.player,
        event.action,
        event.quantity,
        event.item
    );
    Ok(message("coffre reçu"))
}

pub async fn receive_sale(
    State(state): State<AppState>,
    request: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let body = json_body(request)?;
    let record = payload::sale_record(&body, Local::now())?;

    let total = state.ledger.lock().await.append(record.clone())?;
    info!(
        event_name = "gateway.sale.recorded",
        warehouse = record.warehouse_id.as_deref().unwrap_or("unknown"),
        seller = %record.seller,
        quantity = record.quantity,
        item = %record.item,
        total,
        "[{}] {} → {}x {}",
        record.warehouse_id.as_deref().unwrap_or("?"),
        record.seller,
        record.quantity,
        record.item
    );
    Ok(message("vente reçue"))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::router;
    use crate::state::fixtures::{state_in, PASSWORD};
    use coffre_core::{LedgerFile, WeeklySchedule};

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |body| Body::from(body.to_string())))
            .expect("request");

        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let value = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        });
        (status, value)
    }

    fn movement(action: &str, quantity: u32) -> Value {
        json!({
            "joueur": "Bob",
            "job": "garage",
            "item_label": "Pneu",
            "quantite": quantity,
            "action": action
        })
    }

    fn sale(seller: &str) -> Value {
        json!({"vendeur": seller, "item_label": "Emmental", "quantite": 3, "montant_total": 150})
    }

    #[tokio::test]
    async fn home_answers_liveness() {
        let dir = TempDir::new().expect("tempdir");
        let app = router(state_in(&dir, None));

        let (status, body) = send(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!("coffre-server en ligne"));
    }

    #[tokio::test]
    async fn movements_accumulate_and_clamp_at_zero() {
        let dir = TempDir::new().expect("tempdir");
        let app = router(state_in(&dir, None));

        let (status, body) = send(&app, Method::POST, "/webhook", Some(movement("dépot", 10))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "coffre reçu"}));

        send(&app, Method::POST, "/webhook", Some(movement("retrait", 4))).await;
        let (_, stock) = send(&app, Method::GET, "/api/coffres/garage", None).await;
        assert_eq!(stock, json!({"Pneu": 6}));

        send(&app, Method::POST, "/webhook", Some(movement("retiré", 50))).await;
        let (_, all) = send(&app, Method::GET, "/api/coffres", None).await;
        assert_eq!(all, json!({"garage": {"Pneu": 0}}));
    }

    #[tokio::test]
    async fn invalid_movements_are_rejected_with_french_errors() {
        let dir = TempDir::new().expect("tempdir");
        let app = router(state_in(&dir, None));

        let (status, body) = send(&app, Method::POST, "/webhook", Some(movement("vol", 1))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"erreur": "action invalide"}));

        let (status, body) =
            send(&app, Method::POST, "/webhook", Some(json!({"joueur": "Bob"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"erreur": "donnée manquante"}));

        let (status, body) = send(&app, Method::POST, "/webhook", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"erreur": "corps JSON invalide"}));

        let (_, all) = send(&app, Method::GET, "/api/coffres", None).await;
        assert_eq!(all, json!({}));
    }

    #[tokio::test]
    async fn unknown_warehouse_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let app = router(state_in(&dir, None));

        let (status, body) = send(&app, Method::GET, "/api/coffres/kebab", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["erreur"].as_str().expect("message").contains("kebab"));
    }

    #[tokio::test]
    async fn deleting_items_removes_entries_and_reports_absent_ones() {
        let dir = TempDir::new().expect("tempdir");
        let app = router(state_in(&dir, None));
        send(&app, Method::POST, "/webhook", Some(movement("dépot", 2))).await;

        let (status, _) = send(&app, Method::DELETE, "/api/coffres/garage/Jante", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, all) = send(&app, Method::GET, "/api/coffres", None).await;
        assert_eq!(all, json!({"garage": {"Pneu": 2}}));

        let (status, _) = send(&app, Method::DELETE, "/api/coffres/garage/Pneu", None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, all) = send(&app, Method::GET, "/api/coffres", None).await;
        assert_eq!(all, json!({}));
    }

    #[tokio::test]
    async fn sales_are_persisted_one_by_one() {
        let dir = TempDir::new().expect("tempdir");
        let app = router(state_in(&dir, None));
        let file = LedgerFile::new(dir.path().join("ventes.json"));

        let (status, body) = send(&app, Method::POST, "/webhook/ventes", Some(sale("Alice"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "vente reçue"}));
        send(&app, Method::POST, "/webhook/ventes", Some(sale("Eve"))).await;

        let on_disk = file.load().expect("load").expect("document");
        let (_, in_memory) = send(&app, Method::GET, "/api/ventes", None).await;
        assert_eq!(on_disk.sales.len(), 2);
        assert_eq!(serde_json::to_value(&on_disk.sales).expect("encode"), in_memory);
        assert_eq!(in_memory[0]["vendeur"], json!("Alice"));
        assert_eq!(in_memory[0]["montant_total"], json!(150.0));
        assert!(in_memory[0]["date"].is_string());
    }

    #[tokio::test]
    async fn failed_ledger_write_is_unavailable_and_leaves_memory_unchanged() {
        let dir = TempDir::new().expect("tempdir");
        let app = router(state_in(&dir, None));
        std::fs::create_dir(dir.path().join("ventes.json.tmp")).expect("block staging file");

        let (status, body) = send(&app, Method::POST, "/webhook/ventes", Some(sale("Alice"))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({"erreur": "service temporairement indisponible"}));

        let (_, in_memory) = send(&app, Method::GET, "/api/ventes", None).await;
        assert_eq!(in_memory, json!([]));
    }

    #[tokio::test]
    async fn reset_requires_admin_password() {
        let dir = TempDir::new().expect("tempdir");
        let state = state_in(&dir, None);
        let app = router(state.clone());
        send(&app, Method::POST, "/webhook/ventes", Some(sale("Alice"))).await;
        let reset_before = state.ledger.lock().await.last_reset();

        let (status, body) =
            send(&app, Method::POST, "/api/ventes/reset", Some(json!({"password": "nope"}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({"erreur": "Mot de passe incorrect"}));
        assert_eq!(state.ledger.lock().await.len(), 1);

        let (status, body) =
            send(&app, Method::POST, "/api/ventes/reset", Some(json!({"password": PASSWORD}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "ventes réinitialisées"}));

        let document = LedgerFile::new(dir.path().join("ventes.json"))
            .load()
            .expect("load")
            .expect("document");
        assert!(document.sales.is_empty());
        assert!(state.ledger.lock().await.last_reset() > reset_before);
    }

    #[tokio::test]
    async fn overdue_weekly_reset_runs_before_the_request() {
        let dir = TempDir::new().expect("tempdir");
        let state = state_in(&dir, Some(WeeklySchedule::default()));
        let app = router(state.clone());
        state
            .ledger
            .lock()
            .await
            .append(serde_json::from_value(sale("Alice")).expect("record"))
            .expect("append");

        let (status, sales) = send(&app, Method::GET, "/api/ventes", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sales, json!([]));
    }

    #[tokio::test]
    async fn save_writes_inventory_snapshot() {
        let dir = TempDir::new().expect("tempdir");
        let app = router(state_in(&dir, None));
        send(&app, Method::POST, "/webhook", Some(movement("dépot", 7))).await;

        let (status, _) = send(&app, Method::POST, "/api/save", None).await;
        assert_eq!(status, StatusCode::OK);

        let raw = std::fs::read_to_string(dir.path().join("coffres.json")).expect("snapshot");
        let snapshot: Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(snapshot, json!({"garage": {"Pneu": 7}}));
    }

    #[tokio::test]
    async fn employees_use_roster_field_names() {
        let dir = TempDir::new().expect("tempdir");
        let app = router(state_in(&dir, None));

        let (status, body) = send(&app, Method::GET, "/api/employes", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"nom": "Martin", "prenom": "Luc", "grade": "Chef"}]));
    }
}
