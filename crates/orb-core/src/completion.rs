use async_trait::async_trait;

/// Classified failure of a single completion call.
///
/// The relay maps every kind onto a fixed user-facing fallback; the detail
/// strings are for operators and logs, never for end users.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion timed out: {0}")]
    Timeout(String),

    #[error("completion transport error: {0}")]
    Transport(String),

    #[error("malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("unexpected completion failure: {0}")]
    Unexpected(String),
}

/// Chat-completion backend port.
///
/// One bounded call per inbound message. Implementations classify their own
/// failures into [`CompletionError`] and never retry; retry policy belongs
/// to the caller. A successful reply is always non-empty.
#[async_trait]
pub trait CompletionPort: Send + Sync {
    async fn complete(&self, user_text: &str) -> std::result::Result<String, CompletionError>;
}
