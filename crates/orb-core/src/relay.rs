//! Message relay pipeline (gateway-agnostic).
//!
//! Each inbound message runs one pass: acknowledge with a working
//! indicator, call the completion backend once, map failures onto fixed
//! fallback replies, deliver in size-bounded chunks, then log the exchange.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    completion::{CompletionError, CompletionPort},
    config::Config,
    domain::{ChatId, InboundMessage, MessageRef},
    errors::Error,
    exchange_log::{ExchangeLog, LogRecord},
    messaging::MessagingPort,
    replies, Result,
};

const LOG_PREVIEW_MAX: usize = 50;

pub struct RelayController {
    messenger: Arc<dyn MessagingPort>,
    completions: Arc<dyn CompletionPort>,
    log: Arc<ExchangeLog>,
    chunk_limit: usize,
}

impl RelayController {
    pub fn new(
        cfg: &Config,
        messenger: Arc<dyn MessagingPort>,
        completions: Arc<dyn CompletionPort>,
        log: Arc<ExchangeLog>,
    ) -> Self {
        Self {
            messenger,
            completions,
            log,
            chunk_limit: cfg.message_chunk_limit,
        }
    }

    /// Entry point for one inbound message; never returns an error.
    ///
    /// Faults that survive the per-step handling are caught here, answered
    /// with the fixed apology, and kept away from the dispatch loop.
    pub async fn handle_message(&self, msg: &InboundMessage) {
        if !should_relay(&msg.text) {
            return;
        }

        info!("message from {}: {}", msg.sender_label(), preview(&msg.text));

        match self.relay(msg).await {
            Ok(()) => info!("replied to {}", msg.sender_label()),
            Err(e) => {
                error!("relay failed for {}: {e}", msg.sender_label());
                let _ = self
                    .messenger
                    .send_text(msg.chat, replies::PIPELINE_APOLOGY)
                    .await;
            }
        }
    }

    async fn relay(&self, msg: &InboundMessage) -> Result<()> {
        let placeholder = self.acknowledge(msg.chat).await;
        let reply = self.resolve_reply(&msg.text).await;
        self.retract(placeholder).await;
        self.deliver(msg.chat, &reply).await?;
        self.record(msg, &reply);
        Ok(())
    }

    /// Best-effort working indicator. Its failure must never abort the run.
    async fn acknowledge(&self, chat: ChatId) -> Option<MessageRef> {
        match self.messenger.send_text(chat, replies::WORKING).await {
            Ok(m) => Some(m),
            Err(e) => {
                warn!("working indicator send failed: {e}");
                None
            }
        }
    }

    /// Exactly one completion call; failures collapse into fixed fallbacks.
    async fn resolve_reply(&self, text: &str) -> String {
        match self.completions.complete(text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("completion failed: {e}");
                fallback_reply(&e).to_string()
            }
        }
    }

    /// Best-effort placeholder cleanup; a leftover indicator is acceptable.
    async fn retract(&self, placeholder: Option<MessageRef>) {
        let Some(m) = placeholder else {
            return;
        };
        if let Err(e) = self.messenger.delete_message(m).await {
            warn!("working indicator delete failed: {e}");
        }
    }

    /// Send the reply in order, one chunk at a time. Individual chunk
    /// failures are swallowed; only a fully undelivered reply is an error.
    async fn deliver(&self, chat: ChatId, reply: &str) -> Result<()> {
        let chunks = chunk_text(reply, self.chunk_limit);
        let total = chunks.len();
        let mut delivered = 0usize;

        for chunk in chunks {
            match self.messenger.send_text(chat, &chunk).await {
                Ok(_) => delivered += 1,
                Err(e) => warn!("reply chunk send failed: {e}"),
            }
        }

        if delivered == 0 {
            return Err(Error::Delivery(format!(
                "no reply chunks delivered ({total} attempted)"
            )));
        }
        Ok(())
    }

    /// Append the exchange to the log. The log is best-effort; a failed
    /// append must not turn a delivered reply into an apology.
    fn record(&self, msg: &InboundMessage, reply: &str) {
        let record = LogRecord {
            timestamp: msg.received_at,
            sender: msg.sender_label(),
            text: &msg.text,
            reply,
        };
        if let Err(e) = self.log.append(&record) {
            warn!("exchange log append failed: {e}");
        }
    }
}

fn should_relay(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && !trimmed.starts_with('/')
}

fn fallback_reply(err: &CompletionError) -> &'static str {
    match err {
        CompletionError::Timeout(_) => replies::COMPLETION_TIMED_OUT,
        CompletionError::Transport(_) => replies::SERVICE_UNAVAILABLE,
        CompletionError::MalformedResponse(_) | CompletionError::Unexpected(_) => {
            replies::NO_ANSWER
        }
    }
}

/// Split `text` into ordered chunks of at most `max_chars` characters.
///
/// The platform ceiling counts characters, not bytes; concatenating the
/// chunks reproduces the input exactly.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut cur = String::new();
    let mut cur_len = 0usize;

    for ch in text.chars() {
        if cur_len == max_chars {
            chunks.push(std::mem::take(&mut cur));
            cur_len = 0;
        }
        cur.push(ch);
        cur_len += 1;
    }
    if !cur.is_empty() {
        chunks.push(cur);
    }
    chunks
}

fn preview(s: &str) -> String {
    if s.chars().count() <= LOG_PREVIEW_MAX {
        return s.to_string();
    }
    format!("{}...", s.chars().take(LOG_PREVIEW_MAX).collect::<String>())
}
