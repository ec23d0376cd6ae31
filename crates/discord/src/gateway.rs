//! Discord gateway client.
//!
//! Speaks just enough of gateway v10 to receive guild messages: HELLO,
//! IDENTIFY, heartbeats, and the dispatch events that carry channel names and
//! message embeds. Anything that ends the session (RECONNECT, INVALID_SESSION,
//! a close frame, a missed heartbeat ack) surfaces as a `TransportError` so the
//! runner reconnects with back-off.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use crate::events::{ChatMessage, Embed};
use crate::socket::{GatewayTransport, TransportError};

pub const DEFAULT_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

const INTENT_GUILDS: u64 = 1 << 0;
const INTENT_GUILD_MESSAGES: u64 = 1 << 9;
const INTENT_MESSAGE_CONTENT: u64 = 1 << 15;
pub const LISTENER_INTENTS: u64 = INTENT_GUILDS | INTENT_GUILD_MESSAGES | INTENT_MESSAGE_CONTENT;

const OP_DISPATCH: u8 = 0;
const OP_HEARTBEAT: u8 = 1;
const OP_IDENTIFY: u8 = 2;
const OP_RECONNECT: u8 = 7;
const OP_INVALID_SESSION: u8 = 9;
const OP_HELLO: u8 = 10;
const OP_HEARTBEAT_ACK: u8 = 11;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Deserialize)]
struct GatewayPayload {
    op: u8,
    #[serde(default)]
    d: Value,
    #[serde(default)]
    s: Option<u64>,
    #[serde(default)]
    t: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayAction {
    Hello { heartbeat_interval_ms: u64 },
    HeartbeatRequested,
    HeartbeatAcknowledged,
    Message(ChatMessage),
    Ready { user_id: String },
    Nothing,
}

/// Session state decoded from the gateway stream. Channel names survive
/// reconnects; the sequence number does not.
#[derive(Debug, Default)]
pub struct GatewayDecoder {
    sequence: Option<u64>,
    bot_user_id: Option<String>,
    channel_names: HashMap<String, String>,
}

impl GatewayDecoder {
    pub fn sequence(&self) -> Option<u64> {
        self.sequence
    }

    pub fn channel_name(&self, channel_id: &str) -> Option<&str> {
        self.channel_names.get(channel_id).map(String::as_str)
    }

    fn start_session(&mut self) {
        self.sequence = None;
    }

    pub fn decode(&mut self, raw: &str) -> Result<GatewayAction, TransportError> {
        let payload: GatewayPayload = serde_json::from_str(raw)
            .map_err(|error| TransportError::Receive(format!("malformed gateway payload: {error}")))?;

        if payload.s.is_some() {
            self.sequence = payload.s;
        }

        match payload.op {
            OP_DISPATCH => Ok(self.dispatch(payload.t.as_deref().unwrap_or_default(), &payload.d)),
            OP_HEARTBEAT => Ok(GatewayAction::HeartbeatRequested),
            OP_HEARTBEAT_ACK => Ok(GatewayAction::HeartbeatAcknowledged),
            OP_HELLO => {
                let heartbeat_interval_ms =
                    payload.d.get("heartbeat_interval").and_then(Value::as_u64).ok_or_else(
                        || TransportError::Receive("hello without heartbeat interval".to_owned()),
                    )?;
                Ok(GatewayAction::Hello { heartbeat_interval_ms })
            }
            OP_RECONNECT => Err(TransportError::Receive("gateway requested reconnect".to_owned())),
            OP_INVALID_SESSION => Err(TransportError::Receive("gateway invalidated session".to_owned())),
            _ => Ok(GatewayAction::Nothing),
        }
    }

    fn dispatch(&mut self, event_type: &str, data: &Value) -> GatewayAction {
        match event_type {
            "READY" => match string_at(data, &["user", "id"]) {
                Some(user_id) => {
                    self.bot_user_id = Some(user_id.clone());
                    GatewayAction::Ready { user_id }
                }
                None => GatewayAction::Nothing,
            },
            "GUILD_CREATE" => {
                for channel in data.get("channels").and_then(Value::as_array).into_iter().flatten() {
                    self.remember_channel(channel);
                }
                GatewayAction::Nothing
            }
            "CHANNEL_CREATE" | "CHANNEL_UPDATE" => {
                self.remember_channel(data);
                GatewayAction::Nothing
            }
            "CHANNEL_DELETE" => {
                if let Some(id) = string_at(data, &["id"]) {
                    self.channel_names.remove(&id);
                }
                GatewayAction::Nothing
            }
            "MESSAGE_CREATE" => self.message(data).map_or(GatewayAction::Nothing, GatewayAction::Message),
            _ => GatewayAction::Nothing,
        }
    }

    fn remember_channel(&mut self, channel: &Value) {
        if let (Some(id), Some(name)) = (string_at(channel, &["id"]), string_at(channel, &["name"])) {
            self.channel_names.insert(id, name);
        }
    }

    fn message(&self, data: &Value) -> Option<ChatMessage> {
        let channel_id = string_at(data, &["channel_id"])?;
        let author_id = string_at(data, &["author", "id"]).unwrap_or_default();
        let embeds = data
            .get("embeds")
            .and_then(Value::as_array)
            .map(|embeds| {
                embeds
                    .iter()
                    .map(|embed| Embed { description: string_at(embed, &["description"]) })
                    .collect()
            })
            .unwrap_or_default();

        Some(ChatMessage {
            message_id: string_at(data, &["id"]).unwrap_or_default(),
            channel_name: self.channel_names.get(&channel_id).cloned(),
            from_self: self.bot_user_id.as_deref() == Some(author_id.as_str()),
            channel_id,
            author_id,
            embeds,
        })
    }
}

fn string_at(value: &Value, path: &[&str]) -> Option<String> {
    path.iter()
        .try_fold(value, |current, key| current.get(key))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

struct Session {
    socket: WsStream,
    heartbeat: Interval,
    awaiting_ack: bool,
}

#[derive(Default)]
struct GatewayState {
    session: Option<Session>,
    decoder: GatewayDecoder,
}

enum Step {
    Heartbeat,
    Frame(Option<Result<Message, tokio_tungstenite::tungstenite::Error>>),
}

pub struct DiscordGatewayTransport {
    url: String,
    token: SecretString,
    intents: u64,
    state: Mutex<GatewayState>,
}

impl DiscordGatewayTransport {
    pub fn new(url: impl Into<String>, token: SecretString) -> Self {
        Self {
            url: url.into(),
            token,
            intents: LISTENER_INTENTS,
            state: Mutex::new(GatewayState::default()),
        }
    }

    fn identify(&self) -> Message {
        Message::Text(
            json!({
                "op": OP_IDENTIFY,
                "d": {
                    "token": self.token.expose_secret(),
                    "intents": self.intents,
                    "properties": {
                        "os": std::env::consts::OS,
                        "browser": "coffre",
                        "device": "coffre"
                    }
                }
            })
            .to_string(),
        )
    }
}

fn heartbeat(sequence: Option<u64>) -> Message {
    Message::Text(json!({ "op": OP_HEARTBEAT, "d": sequence }).to_string())
}

async fn send(socket: &mut WsStream, message: Message) -> Result<(), TransportError> {
    socket.send(message).await.map_err(|error| TransportError::Send(error.to_string()))
}

async fn await_hello(
    socket: &mut WsStream,
    decoder: &mut GatewayDecoder,
) -> Result<u64, TransportError> {
    while let Some(frame) = socket.next().await {
        match frame.map_err(|error| TransportError::Connect(error.to_string()))? {
            Message::Text(text) => {
                if let GatewayAction::Hello { heartbeat_interval_ms } = decoder.decode(&text)? {
                    return Ok(heartbeat_interval_ms);
                }
            }
            Message::Close(frame) => {
                return Err(TransportError::Connect(format!("closed before hello: {frame:?}")));
            }
            _ => {}
        }
    }
    Err(TransportError::Connect("stream ended before hello".to_owned()))
}

#[async_trait]
impl GatewayTransport for DiscordGatewayTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        state.decoder.start_session();

        let (mut socket, _response) = connect_async(self.url.as_str())
            .await
            .map_err(|error| TransportError::Connect(error.to_string()))?;

        let interval_ms = await_hello(&mut socket, &mut state.decoder).await?;
        send(&mut socket, self.identify()).await?;

        let period = Duration::from_millis(interval_ms.max(1));
        let mut heartbeat = interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            event_name = "listener.gateway.identified",
            heartbeat_interval_ms = interval_ms,
            intents = self.intents,
            "identified with discord gateway"
        );
        state.session = Some(Session { socket, heartbeat, awaiting_ack: false });
        Ok(())
    }

    async fn next_message(&self) -> Result<Option<ChatMessage>, TransportError> {
        let mut guard = self.state.lock().await;
        let GatewayState { session, decoder } = &mut *guard;
        let session = session
            .as_mut()
            .ok_or_else(|| TransportError::Receive("gateway not connected".to_owned()))?;

        loop {
            let step = tokio::select! {
                _ = session.heartbeat.tick() => Step::Heartbeat,
                frame = session.socket.next() => Step::Frame(frame),
            };

            match step {
                Step::Heartbeat => {
                    if session.awaiting_ack {
                        return Err(TransportError::Receive("heartbeat not acknowledged".to_owned()));
                    }
                    send(&mut session.socket, heartbeat(decoder.sequence())).await?;
                    session.awaiting_ack = true;
                }
                Step::Frame(None) => {
                    return Err(TransportError::Receive("gateway stream ended".to_owned()));
                }
                Step::Frame(Some(Err(error))) => {
                    return Err(TransportError::Receive(error.to_string()));
                }
                Step::Frame(Some(Ok(Message::Text(text)))) => match decoder.decode(&text)? {
                    GatewayAction::Message(message) => return Ok(Some(message)),
                    GatewayAction::HeartbeatRequested => {
                        send(&mut session.socket, heartbeat(decoder.sequence())).await?;
                    }
                    GatewayAction::HeartbeatAcknowledged => session.awaiting_ack = false,
                    GatewayAction::Ready { user_id } => {
                        info!(event_name = "listener.gateway.ready", user_id = %user_id, "gateway ready");
                    }
                    GatewayAction::Hello { .. } | GatewayAction::Nothing => {}
                },
                Step::Frame(Some(Ok(Message::Close(frame)))) => {
                    return Err(TransportError::Receive(format!("gateway closed: {frame:?}")));
                }
                Step::Frame(Some(Ok(_))) => {}
            }
        }
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        let Some(mut session) = self.state.lock().await.session.take() else {
            return Ok(());
        };
        debug!("closing gateway socket");
        session.socket.close(None).await.map_err(|error| TransportError::Disconnect(error.to_string()))
    }
}
