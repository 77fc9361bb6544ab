use chrono::{DateTime, Utc};

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a delivered message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Sender label used when the platform supplies no usable display name.
pub const ANONYMOUS_SENDER: &str = "user";

/// One inbound text message, owned by the gateway for one handling cycle.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    pub chat: ChatId,
    pub sender: UserId,
    pub display_name: Option<String>,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    /// Display name with the fixed fallback applied.
    pub fn sender_label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(ANONYMOUS_SENDER)
    }
}
