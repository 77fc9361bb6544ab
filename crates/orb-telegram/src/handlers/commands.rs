use teloxide::prelude::*;

use tracing::{debug, info, warn};

const START_REPLY: &str = "🤖 Hello! I am the customer support bot.\n\
Send me any message and I will answer!\n\
Use /help for the available commands.";

const HELP_REPLY: &str = "📋 Available commands:\n\
/start - start the conversation\n\
/help - show this help\n\n\
💬 Send any text message and I will answer with AI.";

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_command(bot: Bot, msg: Message) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let (cmd, _args) = parse_command(text);

    let reply = match cmd.as_str() {
        "start" => START_REPLY,
        "help" => HELP_REPLY,
        _ => {
            debug!("ignoring unknown command /{cmd}");
            return Ok(());
        }
    };

    info!("/{cmd} from chat {}", msg.chat.id.0);
    if let Err(e) = bot.send_message(msg.chat.id, reply).await {
        warn!("command reply failed: {e}");
    }
    Ok(())
}
