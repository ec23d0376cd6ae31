use coffre_core::config::{DiscordConfig, WarehouseConfig};
use coffre_core::WarehouseId;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Embed {
    pub description: Option<String>,
}

impl Embed {
    pub fn with_description(description: impl Into<String>) -> Self {
        Self { description: Some(description.into()) }
    }
}

/// A message as delivered by the gateway, reduced to what routing needs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatMessage {
    pub message_id: String,
    pub channel_id: String,
    pub channel_name: Option<String>,
    pub author_id: String,
    pub from_self: bool,
    pub embeds: Vec<Embed>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelRoute {
    Warehouse(WarehouseId),
    Sales,
    Ignored(IgnoreReason),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    OwnMessage,
    NoEmbeds,
    UnnamedChannel,
    NotLogChannel,
    UnknownChannel(String),
}

impl IgnoreReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OwnMessage => "own_message",
            Self::NoEmbeds => "no_embeds",
            Self::UnnamedChannel => "unnamed_channel",
            Self::NotLogChannel => "not_log_channel",
            Self::UnknownChannel(_) => "unknown_channel",
        }
    }
}

/// Channel naming rules: `<prefix><warehouse>` for stock logs and one fixed
/// channel for sales.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelRules {
    prefix: String,
    sales_channel: String,
    warehouses: Vec<String>,
}

impl ChannelRules {
    pub fn new(
        prefix: impl Into<String>,
        sales_channel: impl Into<String>,
        warehouses: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            prefix: prefix.into().to_lowercase(),
            sales_channel: sales_channel.into().to_lowercase(),
            warehouses: warehouses.into_iter().map(|name| name.into().to_lowercase()).collect(),
        }
    }

    pub fn from_config(discord: &DiscordConfig, warehouses: &WarehouseConfig) -> Self {
        Self::new(&discord.channel_prefix, &discord.sales_channel, warehouses.allowed.iter())
    }

    pub fn route_channel(&self, channel_name: &str) -> ChannelRoute {
        let name = channel_name.trim().to_lowercase();
        let Some(suffix) = name.strip_prefix(&self.prefix) else {
            return ChannelRoute::Ignored(IgnoreReason::NotLogChannel);
        };

        if self.warehouses.iter().any(|warehouse| warehouse == suffix) {
            ChannelRoute::Warehouse(WarehouseId::new(suffix))
        } else if name == self.sales_channel {
            ChannelRoute::Sales
        } else {
            ChannelRoute::Ignored(IgnoreReason::UnknownChannel(name))
        }
    }

    pub fn route(&self, message: &ChatMessage) -> ChannelRoute {
        if message.from_self {
            return ChannelRoute::Ignored(IgnoreReason::OwnMessage);
        }
        if message.embeds.is_empty() {
            return ChannelRoute::Ignored(IgnoreReason::NoEmbeds);
        }
        match message.channel_name.as_deref() {
            Some(name) => self.route_channel(name),
            None => ChannelRoute::Ignored(IgnoreReason::UnnamedChannel),
        }
    }
}
