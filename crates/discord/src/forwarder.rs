use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use coffre_core::{InventoryEvent, SaleEvent};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ForwardError {
    #[error("gateway request failed: {0}")]
    Transport(String),
    #[error("gateway rejected event with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Body of `POST /webhook`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InventoryPayload<'a> {
    pub joueur: &'a str,
    pub entrepot: &'a str,
    pub item: &'a str,
    pub quantite: u32,
    pub action: &'static str,
}

impl<'a> From<&'a InventoryEvent> for InventoryPayload<'a> {
    fn from(event: &'a InventoryEvent) -> Self {
        Self {
            joueur: &event.player,
            entrepot: event.warehouse_id.as_str(),
            item: &event.item,
            quantite: event.quantity,
            action: event.action.as_log_verb(),
        }
    }
}

/// Body of `POST /webhook/ventes`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SalePayload<'a> {
    pub vendeur: &'a str,
    pub quantite: u32,
    pub item: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub montant_total: Option<u64>,
}

impl<'a> From<&'a SaleEvent> for SalePayload<'a> {
    fn from(sale: &'a SaleEvent) -> Self {
        Self {
            vendeur: &sale.seller,
            quantite: sale.quantity,
            item: &sale.item,
            montant_total: sale.price,
        }
    }
}

/// Delivers parsed events to the gateway. Returns the HTTP status on success.
#[async_trait]
pub trait EventForwarder: Send + Sync {
    async fn forward_inventory(&self, event: &InventoryEvent) -> Result<u16, ForwardError>;
    async fn forward_sale(&self, sale: &SaleEvent) -> Result<u16, ForwardError>;
}

pub struct HttpForwarder {
    client: reqwest::Client,
    base_url: String,
}

impl HttpForwarder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }

    pub fn inventory_url(&self) -> String {
        format!("{}/webhook", self.base_url)
    }

    pub fn sales_url(&self) -> String {
        format!("{}/webhook/ventes", self.base_url)
    }

    async fn post<T>(&self, url: String, body: &T) -> Result<u16, ForwardError>
    where
        T: Serialize + Sync,
    {
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|error| ForwardError::Transport(error.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(status.as_u16());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ForwardError::Rejected { status: status.as_u16(), body })
    }
}

#[async_trait]
impl EventForwarder for HttpForwarder {
    async fn forward_inventory(&self, event: &InventoryEvent) -> Result<u16, ForwardError> {
        self.post(self.inventory_url(), &InventoryPayload::from(event)).await
    }

    async fn forward_sale(&self, sale: &SaleEvent) -> Result<u16, ForwardError> {
        self.post(self.sales_url(), &SalePayload::from(sale)).await
    }
}
