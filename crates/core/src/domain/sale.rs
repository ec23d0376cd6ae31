use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::domain::coerce;

/// Sale read from the sales log channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleEvent {
    pub seller: String,
    pub item: String,
    pub quantity: u32,
    pub price: Option<u64>,
}

/// One entry of the sales ledger. Field names on the wire and on disk are the
/// ones the dashboards already consume.
///
/// Entries read back from a ledger file keep the JSON object they were stored
/// as and serialize to it unchanged; the typed fields are a lenient view over
/// it. Equality only looks at the typed view.
#[derive(Clone, Debug, Default)]
pub struct SaleRecord {
    pub seller: String,
    pub item: String,
    pub item_id: Option<String>,
    pub quantity: u32,
    pub total_amount: Option<Decimal>,
    pub company_share: Option<Decimal>,
    pub warehouse_id: Option<String>,
    pub timestamp: Option<String>,
    stored: Option<Map<String, Value>>,
}

#[derive(Serialize)]
struct SaleFields<'a> {
    vendeur: &'a str,
    item: &'a str,
    item_id: Option<&'a str>,
    quantite: u32,
    montant_total: Option<Decimal>,
    montant_societe: Option<Decimal>,
    job: Option<&'a str>,
    date: Option<&'a str>,
}

impl SaleRecord {
    pub fn from_event(event: SaleEvent) -> Self {
        Self {
            seller: event.seller,
            item: event.item,
            quantity: event.quantity,
            total_amount: event.price.map(Decimal::from),
            ..Self::default()
        }
    }

    fn from_stored(stored: Map<String, Value>) -> Self {
        let text = |key: &str| coerce::text(stored.get(key));
        let amount = |key: &str| stored.get(key).and_then(coerce::amount);

        Self {
            seller: text("vendeur").unwrap_or_default(),
            item: text("item").unwrap_or_default(),
            item_id: text("item_id"),
            quantity: stored.get("quantite").and_then(coerce::quantity).unwrap_or_default(),
            total_amount: amount("montant_total"),
            company_share: amount("montant_societe"),
            warehouse_id: text("job"),
            timestamp: text("date"),
            stored: Some(stored),
        }
    }

    /// Whether this entry came from a ledger file rather than a request.
    pub fn is_stored(&self) -> bool {
        self.stored.is_some()
    }

    fn fields(&self) -> SaleFields<'_> {
        SaleFields {
            vendeur: &self.seller,
            item: &self.item,
            item_id: self.item_id.as_deref(),
            quantite: self.quantity,
            montant_total: self.total_amount,
            montant_societe: self.company_share,
            job: self.warehouse_id.as_deref(),
            date: self.timestamp.as_deref(),
        }
    }
}

impl PartialEq for SaleRecord {
    fn eq(&self, other: &Self) -> bool {
        self.seller == other.seller
            && self.item == other.item
            && self.item_id == other.item_id
            && self.quantity == other.quantity
            && self.total_amount == other.total_amount
            && self.company_share == other.company_share
            && self.warehouse_id == other.warehouse_id
            && self.timestamp == other.timestamp
    }
}

impl Eq for SaleRecord {}

impl Serialize for SaleRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.stored {
            Some(stored) => stored.serialize(serializer),
            None => self.fields().serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SaleRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Object(stored) => Ok(Self::from_stored(stored)),
            other => Err(de::Error::custom(format!("sale entry must be an object, got {other}"))),
        }
    }
}
