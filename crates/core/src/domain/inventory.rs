use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarehouseId(pub String);

impl WarehouseId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WarehouseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryAction {
    Deposit,
    Withdraw,
}

impl InventoryAction {
    /// Verb used in the chat logs and in listener payloads.
    pub fn as_log_verb(&self) -> &'static str {
        match self {
            Self::Deposit => "déposé",
            Self::Withdraw => "retiré",
        }
    }
}

impl FromStr for InventoryAction {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "dépot" | "dépôt" | "depot" | "déposé" | "depose" | "deposit" => Ok(Self::Deposit),
            "retrait" | "retiré" | "retire" | "withdraw" => Ok(Self::Withdraw),
            other => Err(DomainError::InvalidAction(other.to_owned())),
        }
    }
}

impl fmt::Display for InventoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_log_verb())
    }
}

/// Movement read from a chat log line, before the warehouse is known.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryMovement {
    pub player: String,
    pub item: String,
    pub quantity: u32,
    pub action: InventoryAction,
}

impl InventoryMovement {
    pub fn into_event(self, warehouse_id: WarehouseId) -> InventoryEvent {
        InventoryEvent {
            player: self.player,
            warehouse_id,
            item: self.item,
            quantity: self.quantity,
            action: self.action,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEvent {
    pub player: String,
    pub warehouse_id: WarehouseId,
    pub item: String,
    pub quantity: u32,
    pub action: InventoryAction,
}

#[cfg(test)]
mod tests {
    use super::{InventoryAction, InventoryMovement, WarehouseId};
    use crate::errors::DomainError;

    #[test]
    fn action_accepts_gateway_and_listener_spellings() {
        for raw in ["dépot", "dépôt", "déposé", "Deposit"] {
            assert_eq!(raw.parse::<InventoryAction>(), Ok(InventoryAction::Deposit), "{raw}");
        }
        for raw in ["retrait", "retiré", "WITHDRAW"] {
            assert_eq!(raw.parse::<InventoryAction>(), Ok(InventoryAction::Withdraw), "{raw}");
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert_eq!(
            "vol".parse::<InventoryAction>(),
            Err(DomainError::InvalidAction("vol".to_owned()))
        );
    }

    #[test]
    fn movement_binds_to_warehouse() {
        let event = InventoryMovement {
            player: "Bob".to_owned(),
            item: "Tomate".to_owned(),
            quantity: 5,
            action: InventoryAction::Deposit,
        }
        .into_event(WarehouseId::new("kebab"));

        assert_eq!(event.warehouse_id.as_str(), "kebab");
        assert_eq!(event.quantity, 5);
    }
}
