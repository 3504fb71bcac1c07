use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::events::{EventContext, EventDispatcher, InboundEvent};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport failed to connect: {0}")]
    Connect(String),
    #[error("transport read failed: {0}")]
    Receive(String),
    #[error("transport disconnect failed: {0}")]
    Disconnect(String),
}

/// Bounded exponential backoff between reconnect attempts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_retries: 5, base_delay_ms: 250, max_delay_ms: 5_000 }
    }
}

impl ReconnectPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let doubled = self.base_delay_ms.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(doubled.min(self.max_delay_ms))
    }
}

/// The chat-platform connection. Real bindings live outside this
/// repository; `next_event` hands back already-parsed inbound events and
/// `None` when the stream ends.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn connect(&self) -> Result<(), TransportError>;
    async fn next_event(&self) -> Result<Option<InboundEvent>, TransportError>;
    async fn disconnect(&self) -> Result<(), TransportError>;
}

/// Connects successfully and immediately reports a closed stream, keeping
/// the process runnable without a live chat binding.
#[derive(Default)]
pub struct NoopChatTransport;

#[async_trait]
impl ChatTransport for NoopChatTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn next_event(&self) -> Result<Option<InboundEvent>, TransportError> {
        Ok(None)
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Pulls events off the transport and feeds the dispatcher, reconnecting
/// on transport errors up to `max_retries` times. Exhaustion degrades to
/// a stopped runner, never a crashed process.
pub struct PollingRunner {
    transport: Arc<dyn ChatTransport>,
    dispatcher: Arc<EventDispatcher>,
    reconnect_policy: ReconnectPolicy,
}

impl PollingRunner {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        dispatcher: Arc<EventDispatcher>,
        reconnect_policy: ReconnectPolicy,
    ) -> Self {
        Self { transport, dispatcher, reconnect_policy }
    }

    pub async fn start(&self) -> Result<()> {
        let mut attempt = 0;
        loop {
            let Err(error) = self.pump(attempt).await else {
                return Ok(());
            };

            warn!(
                attempt,
                max_retries = self.reconnect_policy.max_retries,
                error = %error,
                "chat transport failed"
            );
            if attempt >= self.reconnect_policy.max_retries {
                warn!(
                    max_retries = self.reconnect_policy.max_retries,
                    "chat transport retries exhausted; runner stopping without crash"
                );
                return Ok(());
            }

            let delay = self.reconnect_policy.backoff(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }

    async fn pump(&self, attempt: u32) -> Result<(), TransportError> {
        self.transport.connect().await?;
        info!(attempt, "chat transport connected");

        let mut sequence: u64 = 0;
        loop {
            let Some(event) = self.transport.next_event().await? else {
                info!(attempt, "chat transport stream closed");
                self.transport.disconnect().await?;
                return Ok(());
            };

            sequence += 1;
            let context = EventContext { correlation_id: format!("evt-{attempt}-{sequence}") };
            info!(
                event_name = "ingress.chat.event_received",
                user_id = %event.user_id,
                correlation_id = %context.correlation_id,
                "received chat event"
            );

            let outcome = self.dispatcher.dispatch(event, &context).await;
            debug!(
                event_name = "ingress.chat.event_dispatched",
                correlation_id = %context.correlation_id,
                outcome = ?outcome,
                "dispatched chat event"
            );
        }
    }
}
