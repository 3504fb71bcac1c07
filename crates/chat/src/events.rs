use std::sync::Arc;

use blossom_core::{FlowEngine, FlowEvent, Reply, SessionStore, UserId};

use crate::commands::{flow_event_from_text, parse_selection};
use crate::outbound::{render_reply, MessageSink, OutboundMessage};

/// A discrete, already-parsed occurrence handed over by the transport.
/// The core never sees raw transport payloads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundEvent {
    pub user_id: UserId,
    pub kind: InboundKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundKind {
    Text(String),
    Selection(String),
    Photo(String),
    PaymentSucceeded,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Replied(usize),
    Ignored,
    Failed,
}

const APOLOGY_TEXT: &str =
    "Sorry, something went wrong on our side. Nothing was changed, please try again.";

/// Routes inbound events through the flow engine under the per-user
/// session lock, so events for one user are processed strictly one at a
/// time while different users proceed in parallel.
pub struct EventDispatcher {
    engine: Arc<FlowEngine>,
    sessions: Arc<SessionStore>,
    sink: Arc<dyn MessageSink>,
}

impl EventDispatcher {
    pub fn new(
        engine: Arc<FlowEngine>,
        sessions: Arc<SessionStore>,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        Self { engine, sessions, sink }
    }

    pub async fn dispatch(&self, event: InboundEvent, ctx: &EventContext) -> DispatchOutcome {
        let Some(flow_event) = lift_event(&event) else {
            return DispatchOutcome::Ignored;
        };

        let slot = self.sessions.acquire(event.user_id).await;
        let mut session = slot.lock().await;
        let state_before = session.state.tag();

        match self.engine.handle(&mut session, flow_event).await {
            Ok(replies) => {
                tracing::info!(
                    event_name = "flow.event_handled",
                    user_id = %event.user_id,
                    correlation_id = %ctx.correlation_id,
                    from_state = state_before,
                    to_state = session.state.tag(),
                    reply_count = replies.len(),
                    "conversation event handled"
                );
                if replies.is_empty() {
                    return DispatchOutcome::Ignored;
                }
                let count = replies.len();
                for reply in replies {
                    self.send(render_reply(event.user_id, reply), ctx).await;
                }
                DispatchOutcome::Replied(count)
            }
            Err(error) => {
                // The engine mutates the session only after its store
                // calls succeed, so the position is intact and the user
                // can simply retry.
                tracing::warn!(
                    event_name = "flow.event_failed",
                    user_id = %event.user_id,
                    correlation_id = %ctx.correlation_id,
                    state = state_before,
                    error = %error,
                    "conversation event failed; session left unchanged"
                );
                self.send(render_reply(event.user_id, Reply::text(APOLOGY_TEXT)), ctx).await;
                DispatchOutcome::Failed
            }
        }
    }

    async fn send(&self, message: OutboundMessage, ctx: &EventContext) {
        if let Err(error) = self.sink.deliver(message).await {
            tracing::warn!(
                event_name = "egress.delivery_failed",
                correlation_id = %ctx.correlation_id,
                error = %error,
                "outbound delivery failed"
            );
        }
    }
}

fn lift_event(event: &InboundEvent) -> Option<FlowEvent> {
    match &event.kind {
        InboundKind::Text(text) => Some(flow_event_from_text(text)),
        InboundKind::Selection(data) => parse_selection(data),
        InboundKind::Photo(image_ref) => Some(FlowEvent::PhotoSupplied(image_ref.clone())),
        InboundKind::PaymentSucceeded => Some(FlowEvent::PaymentSucceeded),
    }
}
