//! Webhook bodies. Field names follow the in-game bots, which have sent
//! several spellings over time (`job`/`entrepot`, `item_label`/`item`).

use chrono::{DateTime, Local};
use serde_json::Value;

use coffre_core::config::WarehouseConfig;
use coffre_core::domain::coerce;
use coffre_core::{DomainError, InventoryAction, InventoryEvent, SaleRecord, WarehouseId};

fn first_text(body: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| coerce::text(body.get(*key)))
}

fn required_text(body: &Value, keys: &[&'static str]) -> Result<String, DomainError> {
    first_text(body, keys).ok_or(DomainError::MissingField(keys[0]))
}

fn required_quantity(body: &Value) -> Result<u32, DomainError> {
    let raw = match body.get("quantite") {
        None | Some(Value::Null) => return Err(DomainError::MissingField("quantite")),
        Some(Value::String(text)) if text.trim().is_empty() => {
            return Err(DomainError::MissingField("quantite"))
        }
        Some(raw) => raw,
    };
    coerce::quantity(raw).ok_or_else(|| DomainError::InvalidQuantity(raw.to_string()))
}

pub fn inventory_event(
    body: &Value,
    warehouses: &WarehouseConfig,
) -> Result<InventoryEvent, DomainError> {
    let player = required_text(body, &["joueur"])?;
    let warehouse = required_text(body, &["job", "entrepot"])?;
    let item = required_text(body, &["item_label", "item"])?;
    let quantity = required_quantity(body)?;
    let action = required_text(body, &["action"])?.parse::<InventoryAction>()?;

    if warehouses.enforce_at_gateway && !warehouses.allows(&warehouse) {
        return Err(DomainError::UnknownWarehouse(warehouse));
    }

    Ok(InventoryEvent { player, warehouse_id: WarehouseId::new(warehouse), item, quantity, action })
}

/// Builds a ledger entry; `date` falls back to the receive time.
pub fn sale_record(body: &Value, received_at: DateTime<Local>) -> Result<SaleRecord, DomainError> {
    let seller = required_text(body, &["vendeur"])?;
    let item = required_text(body, &["item_label", "item"])?;
    let quantity = required_quantity(body)?;
    let amount = |key: &str| body.get(key).and_then(coerce::amount);

    let mut record = SaleRecord::default();
    record.seller = seller;
    record.item = item;
    record.item_id = first_text(body, &["item_id"]);
    record.quantity = quantity;
    record.total_amount = amount("montant_total");
    record.company_share = amount("montant_societe");
    record.warehouse_id = first_text(body, &["job", "entrepot"]);
    record.timestamp = first_text(body, &["date"]).or_else(|| Some(received_at.to_rfc3339()));
    Ok(record)
}
