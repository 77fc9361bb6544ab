use std::sync::Arc;

use teloxide::prelude::*;

use orb_core::domain::{ChatId, InboundMessage, UserId};

use crate::router::AppState;

pub async fn handle_text(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text().map(|s| s.to_string()) else {
        return Ok(());
    };

    // Telegram always sets a first name for users; fall through to the
    // username when a channel or edge case leaves it blank.
    let display_name = if user.first_name.trim().is_empty() {
        user.username.clone()
    } else {
        Some(user.first_name.clone())
    };

    let inbound = InboundMessage {
        chat: ChatId(msg.chat.id.0),
        sender: UserId(user.id.0 as i64),
        display_name,
        text,
        received_at: msg.date,
    };

    state.relay.handle_message(&inbound).await;
    Ok(())
}
