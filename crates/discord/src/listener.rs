use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use coffre_core::{parse_inventory, parse_sale, WarehouseId};

use crate::events::{ChannelRoute, ChannelRules, ChatMessage, IgnoreReason};
use crate::forwarder::EventForwarder;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    Processed(EmbedTally),
    Ignored(IgnoreReason),
}

/// Outcome counts for the embeds of one message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmbedTally {
    pub forwarded: usize,
    pub unparsed: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: &ChatMessage) -> HandlerResult;
}

/// Routes log-channel messages to the parser and forwards what it recognizes.
pub struct ChatListener {
    rules: ChannelRules,
    forwarder: Arc<dyn EventForwarder>,
}

impl ChatListener {
    pub fn new(rules: ChannelRules, forwarder: Arc<dyn EventForwarder>) -> Self {
        Self { rules, forwarder }
    }

    async fn forward_inventory(
        &self,
        message: &ChatMessage,
        warehouse: &WarehouseId,
        text: &str,
        tally: &mut EmbedTally,
    ) {
        let Some(movement) = parse_inventory(text) else {
            info!(
                event_name = "listener.embed.unparsed",
                message_id = %message.message_id,
                warehouse = %warehouse,
                text,
                "no inventory pattern recognized"
            );
            tally.unparsed += 1;
            return;
        };

        let event = movement.into_event(warehouse.clone());
        match self.forwarder.forward_inventory(&event).await {
            Ok(status) => {
                info!(
                    event_name = "listener.inventory.forwarded",
                    message_id = %message.message_id,
                    warehouse = %warehouse,
                    player = %event.player,
                    item = %event.item,
                    quantity = event.quantity,
                    action = %event.action,
                    status,
                    "inventory event forwarded"
                );
                tally.forwarded += 1;
            }
            Err(error) => {
                warn!(
                    event_name = "listener.inventory.forward_failed",
                    message_id = %message.message_id,
                    warehouse = %warehouse,
                    error = %error,
                    "failed to forward inventory event"
                );
                tally.failed += 1;
            }
        }
    }

    async fn forward_sale(&self, message: &ChatMessage, text: &str, tally: &mut EmbedTally) {
        let Some(sale) = parse_sale(text) else {
            info!(
                event_name = "listener.embed.unparsed",
                message_id = %message.message_id,
                text,
                "no sale pattern recognized"
            );
            tally.unparsed += 1;
            return;
        };

        match self.forwarder.forward_sale(&sale).await {
            Ok(status) => {
                info!(
                    event_name = "listener.sale.forwarded",
                    message_id = %message.message_id,
                    seller = %sale.seller,
                    item = %sale.item,
                    quantity = sale.quantity,
                    status,
                    "sale forwarded"
                );
                tally.forwarded += 1;
            }
            Err(error) => {
                warn!(
                    event_name = "listener.sale.forward_failed",
                    message_id = %message.message_id,
                    error = %error,
                    "failed to forward sale"
                );
                tally.failed += 1;
            }
        }
    }
}

#[async_trait]
impl MessageHandler for ChatListener {
    async fn handle(&self, message: &ChatMessage) -> HandlerResult {
        let route = self.rules.route(message);
        if let ChannelRoute::Ignored(reason) = route {
            debug!(
                event_name = "listener.message.ignored",
                message_id = %message.message_id,
                channel_id = %message.channel_id,
                reason = reason.label(),
                "message ignored"
            );
            return HandlerResult::Ignored(reason);
        }

        let mut tally = EmbedTally::default();
        for embed in &message.embeds {
            let Some(text) = embed.description.as_deref().filter(|text| !text.trim().is_empty())
            else {
                tally.skipped += 1;
                continue;
            };

            match &route {
                ChannelRoute::Warehouse(warehouse) => {
                    self.forward_inventory(message, warehouse, text, &mut tally).await;
                }
                ChannelRoute::Sales => self.forward_sale(message, text, &mut tally).await,
                ChannelRoute::Ignored(_) => {}
            }
        }

        HandlerResult::Processed(tally)
    }
}
