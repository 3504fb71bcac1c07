use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use blossom_core::{Reply, UserId};

use crate::commands::encode_choice_action;

/// What actually leaves the process: text plus rendered buttons. Layout
/// beyond label/payload is the transport collaborator's job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    pub user_id: UserId,
    pub text: String,
    pub buttons: Vec<Button>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub payload: ButtonPayload,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ButtonPayload {
    /// Raised back as a selection event when tapped.
    Callback(String),
    /// Opened externally; raises nothing.
    Url(String),
}

pub fn render_reply(user_id: UserId, reply: Reply) -> OutboundMessage {
    OutboundMessage {
        user_id,
        text: reply.text,
        buttons: reply
            .choices
            .into_iter()
            .map(|choice| Button {
                label: choice.label,
                payload: encode_choice_action(&choice.action),
            })
            .collect(),
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("message delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn deliver(&self, message: OutboundMessage) -> Result<(), SinkError>;
}

/// Swallows every message; the default when no live transport is bound.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMessageSink;

#[async_trait]
impl MessageSink for NoopMessageSink {
    async fn deliver(&self, _message: OutboundMessage) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Captures delivered messages for assertions.
#[derive(Default)]
pub struct RecordingMessageSink {
    messages: Mutex<Vec<OutboundMessage>>,
}

impl RecordingMessageSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<OutboundMessage> {
        self.messages.lock().await.clone()
    }
}

#[async_trait]
impl MessageSink for RecordingMessageSink {
    async fn deliver(&self, message: OutboundMessage) -> Result<(), SinkError> {
        self.messages.lock().await.push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use blossom_core::{Choice, ChoiceAction, Reply, UserId};

    use super::{render_reply, ButtonPayload};

    #[test]
    fn rendering_keeps_text_and_maps_choices_to_buttons() {
        let reply = Reply::with_choices(
            "Choose a bouquet size:",
            vec![
                Choice::new("Small", ChoiceAction::SelectCategory(blossom_core::Category::Small)),
                Choice::new("Checkout", ChoiceAction::OpenUrl("https://pay.test".to_owned())),
            ],
        );

        let message = render_reply(UserId(5), reply);

        assert_eq!(message.user_id, UserId(5));
        assert_eq!(message.text, "Choose a bouquet size:");
        assert_eq!(message.buttons.len(), 2);
        assert_eq!(message.buttons[0].label, "Small");
        assert_eq!(message.buttons[0].payload, ButtonPayload::Callback("size:small".to_owned()));
        assert_eq!(message.buttons[1].payload, ButtonPayload::Url("https://pay.test".to_owned()));
    }

    #[test]
    fn plain_replies_render_without_buttons() {
        let message = render_reply(UserId(5), blossom_core::Reply::text("You have no orders yet."));
        assert!(message.buttons.is_empty());
    }
}
