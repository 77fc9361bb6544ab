//! Telegram update handlers.
//!
//! Routing is deliberately small: commands get their fixed replies, text
//! goes to the relay pipeline, every other update kind is ignored.

use std::sync::Arc;

use teloxide::prelude::*;

use crate::router::AppState;

mod commands;
mod text;

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(body) = msg.text() else {
        // Photos, voice notes, stickers and the rest are out of scope.
        return Ok(());
    };

    if body.starts_with('/') {
        return commands::handle_command(bot, msg).await;
    }

    text::handle_text(msg, state).await
}
