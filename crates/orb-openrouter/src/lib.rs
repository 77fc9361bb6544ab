//! OpenRouter adapter (chat completions).
//!
//! Implements the `orb-core` CompletionPort over the OpenRouter
//! chat-completions HTTP API. This crate stays silent: classification of
//! failures is its whole contract, reporting them is the caller's.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use orb_core::{
    completion::{CompletionError, CompletionPort},
    config::Config,
};

const BODY_SUMMARY_MAX: usize = 200;

#[derive(Clone, Debug)]
pub struct OpenRouterClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    referer: String,
    title: String,
    model: String,
    system_prompt: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

impl OpenRouterClient {
    pub fn new(cfg: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(cfg.completion_timeout)
            .build()
            .expect("reqwest client build");
        Self {
            http,
            base_url: cfg.completion_base_url.trim_end_matches('/').to_string(),
            api_key: cfg.openrouter_key.clone(),
            referer: cfg.webhook_url.clone(),
            title: cfg.app_title.clone(),
            model: cfg.completion_model.clone(),
            system_prompt: cfg.system_prompt.clone(),
            max_tokens: cfg.max_completion_tokens,
            temperature: cfg.completion_temperature,
        }
    }

    fn request_body<'a>(&'a self, user_text: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_text,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl CompletionPort for OpenRouterClient {
    async fn complete(&self, user_text: &str) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&self.request_body(user_text))
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = resp.status();
        let body = resp.text().await.map_err(classify_send_error)?;

        if !status.is_success() {
            return Err(CompletionError::Transport(format!(
                "backend returned {status}: {}",
                summarize(&body)
            )));
        }

        extract_reply(&body)
    }
}

fn classify_send_error(e: reqwest::Error) -> CompletionError {
    if e.is_timeout() {
        CompletionError::Timeout(format!("completion request timed out: {e}"))
    } else {
        CompletionError::Transport(format!("completion request failed: {e}"))
    }
}

/// Pull the first choice's message content out of a 2xx body.
///
/// A syntactically broken body is `Unexpected`; a well-formed body of the
/// wrong shape, with no choices, or with empty content is `MalformedResponse`.
fn extract_reply(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatResponse = serde_json::from_str(body).map_err(|e| match e.classify() {
        serde_json::error::Category::Data => {
            CompletionError::MalformedResponse(format!("{e}: {}", summarize(body)))
        }
        _ => CompletionError::Unexpected(format!("response body is not JSON: {e}")),
    })?;

    let Some(choice) = parsed.choices.into_iter().next() else {
        return Err(CompletionError::MalformedResponse(format!(
            "no completion choices: {}",
            summarize(body)
        )));
    };

    if choice.message.content.is_empty() {
        return Err(CompletionError::MalformedResponse(format!(
            "empty completion content: {}",
            summarize(body)
        )));
    }

    Ok(choice.message.content)
}

fn summarize(body: &str) -> String {
    body.chars().take(BODY_SUMMARY_MAX).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use orb_core::config::Transport;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::Duration;

    fn test_config() -> Config {
        // Avoid Config::load() env dependency: hand-roll config.
        Config {
            bot_token: "x".to_string(),
            openrouter_key: "secret-key".to_string(),
            webhook_url: "https://bot.example.test".to_string(),
            transport: Transport::Polling,
            port: 8000,
            restart_backoff: Duration::from_secs(5),
            max_restarts: None,
            message_chunk_limit: 4096,
            completion_base_url: "https://openrouter.test/api/v1/".to_string(),
            completion_model: "test/model".to_string(),
            system_prompt: "Be helpful.".to_string(),
            max_completion_tokens: 300,
            completion_temperature: 0.7,
            completion_timeout: Duration::from_secs(1),
            app_title: "Telegram Bot".to_string(),
            exchange_log_path: "/tmp/orb-unused.log".into(),
        }
    }

    fn client_for(base_url: &str, timeout: Duration) -> OpenRouterClient {
        let mut cfg = test_config();
        cfg.completion_base_url = base_url.to_string();
        cfg.completion_timeout = timeout;
        OpenRouterClient::new(&cfg)
    }

    // Drain one full request so closing the socket later cannot reset it
    // under the client mid-send.
    fn read_request(stream: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut chunk) {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }

        let header_end = buf.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;
        let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
        let content_length = headers
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);

        let mut body_read = buf.len() - header_end;
        while body_read < content_length {
            match stream.read(&mut chunk) {
                Ok(0) | Err(_) => return,
                Ok(n) => body_read += n,
            }
        }
    }

    /// Serve exactly one canned HTTP response on an ephemeral port.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                read_request(&mut stream);
                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        base
    }

    /// Accept one request and hold the connection open without answering.
    fn serve_stalled(hold: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                read_request(&mut stream);
                thread::sleep(hold);
            }
        });
        base
    }

    #[test]
    fn extracts_first_choice_content_verbatim() {
        let body = r#"{"choices":[{"message":{"content":"  Hi there "}},{"message":{"content":"second"}}]}"#;
        assert_eq!(extract_reply(body).unwrap(), "  Hi there ");
    }

    #[test]
    fn empty_choice_list_is_malformed() {
        let out = extract_reply(r#"{"choices":[]}"#);
        assert!(matches!(out, Err(CompletionError::MalformedResponse(_))));
    }

    #[test]
    fn missing_choices_field_is_malformed() {
        let out = extract_reply(r#"{"id":"gen-1","model":"test/model"}"#);
        assert!(matches!(out, Err(CompletionError::MalformedResponse(_))));
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let out = extract_reply(r#"{"choices":[{"text":"legacy completion"}]}"#);
        assert!(matches!(out, Err(CompletionError::MalformedResponse(_))));
    }

    #[test]
    fn empty_content_is_malformed() {
        let out = extract_reply(r#"{"choices":[{"message":{"content":""}}]}"#);
        assert!(matches!(out, Err(CompletionError::MalformedResponse(_))));
    }

    #[test]
    fn non_json_body_is_unexpected() {
        let out = extract_reply("<html>502 Bad Gateway</html>");
        assert!(matches!(out, Err(CompletionError::Unexpected(_))));
    }

    #[test]
    fn malformed_detail_carries_a_bounded_body_summary() {
        let noise = "z".repeat(BODY_SUMMARY_MAX * 3);
        let body = format!(r#"{{"choices":[],"noise":"{noise}"}}"#);
        match extract_reply(&body) {
            Err(CompletionError::MalformedResponse(detail)) => {
                assert!(detail.len() < body.len());
                assert!(detail.contains("no completion choices"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn request_body_puts_the_system_message_first() {
        let client = OpenRouterClient::new(&test_config());
        let body = serde_json::to_value(client.request_body("Hello")).unwrap();

        assert_eq!(body["model"], "test/model");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "Be helpful.");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Hello");
        assert_eq!(body["max_tokens"], 300);
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = OpenRouterClient::new(&test_config());
        assert_eq!(client.base_url, "https://openrouter.test/api/v1");
    }

    #[tokio::test]
    async fn success_reply_roundtrips_verbatim_over_http() {
        let base = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"content":"Hi there"}}]}"#,
        );
        let client = client_for(&base, Duration::from_secs(5));
        assert_eq!(client.complete("Hello").await.unwrap(), "Hi there");
    }

    #[tokio::test]
    async fn http_500_classifies_as_transport() {
        let base = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#);
        let client = client_for(&base, Duration::from_secs(5));

        match client.complete("Hello").await {
            Err(CompletionError::Transport(detail)) => assert!(detail.contains("500")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn stalled_backend_classifies_as_timeout() {
        let base = serve_stalled(Duration::from_secs(2));
        let client = client_for(&base, Duration::from_millis(250));

        assert!(matches!(
            client.complete("Hello").await,
            Err(CompletionError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn connection_refused_classifies_as_transport() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let client = client_for(&base, Duration::from_secs(5));
        assert!(matches!(
            client.complete("Hello").await,
            Err(CompletionError::Transport(_))
        ));
    }
}
