use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::events::ChatMessage;
use crate::listener::{HandlerResult, MessageHandler};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport failed to connect: {0}")]
    Connect(String),
    #[error("transport read failed: {0}")]
    Receive(String),
    #[error("transport send failed: {0}")]
    Send(String),
    #[error("transport disconnect failed: {0}")]
    Disconnect(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_retries: 10, base_delay_ms: 1_000, max_delay_ms: 60_000 }
    }
}

impl ReconnectPolicy {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self { max_retries, ..Self::default() }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// A source of chat messages. `next_message` yields `Ok(None)` only when the
/// stream ends on purpose; a dropped connection is an error.
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    async fn connect(&self) -> Result<(), TransportError>;
    async fn next_message(&self) -> Result<Option<ChatMessage>, TransportError>;
    async fn disconnect(&self) -> Result<(), TransportError>;
}

pub struct ListenerRunner {
    transport: Arc<dyn GatewayTransport>,
    handler: Arc<dyn MessageHandler>,
    reconnect_policy: ReconnectPolicy,
}

impl ListenerRunner {
    pub fn new(
        transport: Arc<dyn GatewayTransport>,
        handler: Arc<dyn MessageHandler>,
        reconnect_policy: ReconnectPolicy,
    ) -> Self {
        Self { transport, handler, reconnect_policy }
    }

    pub async fn start(&self) -> Result<()> {
        let mut attempt = 0_u32;

        loop {
            let mut delivered = 0_usize;
            let Err(transport_error) = self.connect_and_pump(attempt, &mut delivered).await else {
                return Ok(());
            };

            // A session that delivered messages was healthy; start the budget over.
            if delivered > 0 {
                attempt = 0;
            }

            warn!(
                event_name = "listener.transport.failed",
                attempt,
                max_retries = self.reconnect_policy.max_retries,
                delivered,
                error = %transport_error,
                "gateway transport failed"
            );

            if let Err(error) = self.transport.disconnect().await {
                debug!(error = %error, "disconnect after failure did not complete cleanly");
            }

            if attempt >= self.reconnect_policy.max_retries {
                warn!(
                    event_name = "listener.transport.retries_exhausted",
                    max_retries = self.reconnect_policy.max_retries,
                    "gateway retries exhausted; listener stopping"
                );
                return Err(transport_error.into());
            }

            let delay = self.reconnect_policy.backoff(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }

    async fn connect_and_pump(
        &self,
        attempt: u32,
        delivered: &mut usize,
    ) -> Result<(), TransportError> {
        info!(attempt, "opening gateway connection");
        self.transport.connect().await?;
        info!(event_name = "listener.transport.connected", attempt, "gateway connected");

        loop {
            let Some(message) = self.transport.next_message().await? else {
                info!(attempt, "gateway stream closed");
                self.transport.disconnect().await?;
                return Ok(());
            };
            *delivered += 1;

            debug!(
                event_name = "listener.message.received",
                message_id = %message.message_id,
                channel_id = %message.channel_id,
                channel_name = message.channel_name.as_deref().unwrap_or("unknown"),
                embeds = message.embeds.len(),
                "received chat message"
            );

            if let HandlerResult::Processed(tally) = self.handler.handle(&message).await {
                debug!(
                    message_id = %message.message_id,
                    forwarded = tally.forwarded,
                    unparsed = tally.unparsed,
                    failed = tally.failed,
                    "message processed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::{GatewayTransport, ListenerRunner, ReconnectPolicy, TransportError};
    use crate::events::{ChatMessage, IgnoreReason};
    use crate::listener::{HandlerResult, MessageHandler};

    #[derive(Default)]
    struct ScriptedTransport {
        state: Mutex<ScriptedState>,
    }

    #[derive(Default)]
    struct ScriptedState {
        connect_results: VecDeque<Result<(), TransportError>>,
        messages: VecDeque<Result<Option<ChatMessage>, TransportError>>,
        connect_attempts: usize,
        disconnect_calls: usize,
    }

    impl ScriptedTransport {
        fn with_script(
            connect_results: Vec<Result<(), TransportError>>,
            messages: Vec<Result<Option<ChatMessage>, TransportError>>,
        ) -> Self {
            Self {
                state: Mutex::new(ScriptedState {
                    connect_results: connect_results.into(),
                    messages: messages.into(),
                    ..ScriptedState::default()
                }),
            }
        }

        async fn connect_attempts(&self) -> usize {
            self.state.lock().await.connect_attempts
        }

        async fn disconnect_calls(&self) -> usize {
            self.state.lock().await.disconnect_calls
        }
    }

    #[async_trait]
    impl GatewayTransport for ScriptedTransport {
        async fn connect(&self) -> Result<(), TransportError> {
            let mut state = self.state.lock().await;
            state.connect_attempts += 1;
            state.connect_results.pop_front().unwrap_or(Ok(()))
        }

        async fn next_message(&self) -> Result<Option<ChatMessage>, TransportError> {
            let mut state = self.state.lock().await;
            state.messages.pop_front().unwrap_or(Ok(None))
        }

        async fn disconnect(&self) -> Result<(), TransportError> {
            self.state.lock().await.disconnect_calls += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingHandler {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MessageHandler for CountingHandler {
        async fn handle(&self, message: &ChatMessage) -> HandlerResult {
            self.seen.lock().await.push(message.message_id.clone());
            HandlerResult::Ignored(IgnoreReason::NoEmbeds)
        }
    }

    fn chat(id: &str) -> ChatMessage {
        ChatMessage { message_id: id.to_owned(), ..ChatMessage::default() }
    }

    fn instant_policy(max_retries: u32) -> ReconnectPolicy {
        ReconnectPolicy { max_retries, base_delay_ms: 0, max_delay_ms: 0 }
    }

    #[tokio::test]
    async fn reconnects_after_initial_connect_failure() {
        let transport = Arc::new(ScriptedTransport::with_script(
            vec![Err(TransportError::Connect("network down".to_owned())), Ok(())],
            vec![Ok(Some(chat("m-1"))), Ok(None)],
        ));
        let handler = Arc::new(CountingHandler::default());

        let runner = ListenerRunner::new(transport.clone(), handler.clone(), instant_policy(2));
        runner.start().await.expect("runner should finish");

        assert_eq!(transport.connect_attempts().await, 2);
        assert_eq!(*handler.seen.lock().await, vec!["m-1"]);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let transport = Arc::new(ScriptedTransport::with_script(
            vec![
                Err(TransportError::Connect("fail-1".to_owned())),
                Err(TransportError::Connect("fail-2".to_owned())),
                Err(TransportError::Connect("fail-3".to_owned())),
            ],
            vec![],
        ));

        let runner = ListenerRunner::new(
            transport.clone(),
            Arc::new(CountingHandler::default()),
            instant_policy(2),
        );

        let error = runner.start().await.expect_err("retries exhausted");
        assert!(error.to_string().contains("fail-3"));
        assert_eq!(transport.connect_attempts().await, 3);
        assert_eq!(transport.disconnect_calls().await, 3);
    }

    #[tokio::test]
    async fn healthy_session_resets_retry_budget() {
        let transport = Arc::new(ScriptedTransport::with_script(
            vec![Err(TransportError::Connect("boot".to_owned())), Ok(()), Ok(())],
            vec![
                Ok(Some(chat("m-1"))),
                Err(TransportError::Receive("gateway closed".to_owned())),
                Ok(Some(chat("m-2"))),
                Ok(None),
            ],
        ));
        let handler = Arc::new(CountingHandler::default());

        let runner = ListenerRunner::new(transport.clone(), handler.clone(), instant_policy(1));
        runner.start().await.expect("second session recovers");

        assert_eq!(transport.connect_attempts().await, 3);
        assert_eq!(*handler.seen.lock().await, vec!["m-1", "m-2"]);
    }

    #[test]
    fn backoff_doubles_up_to_ceiling() {
        let policy = ReconnectPolicy { max_retries: 5, base_delay_ms: 100, max_delay_ms: 500 };
        let delays: Vec<u128> = (0..4).map(|attempt| policy.backoff(attempt).as_millis()).collect();
        assert_eq!(delays, vec![100, 200, 400, 500]);
    }
}
