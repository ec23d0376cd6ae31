//! Extraction of inventory and sale events from chat log embeds.
//!
//! Inventory lines look like `**Bob** a déposé 5x Tomate` (the emphasis around
//! the player is optional) and sales like
//! `Vente de 3x Emmental pour 150$ par Alice.`. Every pattern is anchored at
//! the start of the text and unmatched text yields `None`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::domain::inventory::{InventoryAction, InventoryMovement};
use crate::domain::sale::SaleEvent;

static EMPHASIZED_MOVEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\*\*(.+?)\*\* a (déposé|retiré) (\d+)x (.+)").expect("valid movement pattern")
});

static PLAIN_MOVEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?) a (déposé|retiré) (\d+)x (.+)").expect("valid movement pattern")
});

static SALE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Vente de (\d+)x (.+?) pour (\d+)\$ par (.+?)\.").expect("valid sale pattern")
});

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParsedEvent {
    Inventory(InventoryMovement),
    Sale(SaleEvent),
}

pub fn parse_event(text: &str) -> Option<ParsedEvent> {
    parse_inventory(text)
        .map(ParsedEvent::Inventory)
        .or_else(|| parse_sale(text).map(ParsedEvent::Sale))
}

pub fn parse_inventory(text: &str) -> Option<InventoryMovement> {
    let captures = EMPHASIZED_MOVEMENT.captures(text).or_else(|| PLAIN_MOVEMENT.captures(text))?;

    let player = captures[1].trim_matches(|ch: char| ch == ' ' || ch == '*');
    let action = match &captures[2] {
        "déposé" => InventoryAction::Deposit,
        _ => InventoryAction::Withdraw,
    };
    let quantity = captures[3].parse::<u32>().ok()?;
    let item = captures[4].trim();

    if player.is_empty() || item.is_empty() {
        return None;
    }

    Some(InventoryMovement { player: player.to_owned(), item: item.to_owned(), quantity, action })
}

pub fn parse_sale(text: &str) -> Option<SaleEvent> {
    let captures = SALE.captures(text)?;

    let quantity = captures[1].parse::<u32>().ok()?;
    let item = trimmed(&captures, 2)?;
    let price = captures[3].parse::<u64>().ok();
    let seller = trimmed(&captures, 4)?;

    Some(SaleEvent { seller, item, quantity, price })
}

fn trimmed(captures: &Captures<'_>, index: usize) -> Option<String> {
    let value = captures.get(index)?.as_str().trim();
    (!value.is_empty()).then(|| value.to_owned())
}
