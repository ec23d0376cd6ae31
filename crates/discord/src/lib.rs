//! Discord chat-log listener
//!
//! Watches the `logs-*` channels of a guild and relays what the in-game bots
//! post there to the coffre gateway:
//! - **Gateway** (`gateway`) - WebSocket session with the Discord gateway
//! - **Runner** (`socket`) - message loop with reconnection logic
//! - **Routing** (`events`) - channel name to warehouse or sales feed
//! - **Listener** (`listener`) - embed parsing and forwarding
//! - **Forwarder** (`forwarder`) - HTTP client for `/webhook` and `/webhook/ventes`
//!
//! # Architecture
//!
//! ```text
//! Discord gateway → ListenerRunner → ChatListener → parser → HttpForwarder → coffre-server
//! ```

pub mod events;
pub mod forwarder;
pub mod gateway;
pub mod listener;
pub mod socket;

use std::sync::Arc;

use coffre_core::config::AppConfig;

pub use events::{ChannelRoute, ChannelRules, ChatMessage, Embed, IgnoreReason};
pub use forwarder::{EventForwarder, ForwardError, HttpForwarder};
pub use gateway::DiscordGatewayTransport;
pub use listener::{ChatListener, EmbedTally, HandlerResult, MessageHandler};
pub use socket::{GatewayTransport, ListenerRunner, ReconnectPolicy, TransportError};

/// Wires the gateway transport, listener and HTTP forwarder from configuration.
pub fn runner_from_config(config: &AppConfig) -> ListenerRunner {
    let transport =
        DiscordGatewayTransport::new(&config.discord.gateway_url, config.discord.token.clone());
    let forwarder = HttpForwarder::new(&config.discord.forward_url);
    let listener = ChatListener::new(
        ChannelRules::from_config(&config.discord, &config.warehouses),
        Arc::new(forwarder),
    );

    ListenerRunner::new(
        Arc::new(transport),
        Arc::new(listener),
        ReconnectPolicy::with_max_retries(config.discord.max_retries),
    )
}
