//! OpenAI Responses API client with structured output.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{
    output_schema, parse_structured_output, RemoteError, RemoteOutcome, SentimentModel,
    SCHEMA_NAME,
};
use crate::classifier::SentimentResult;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Default API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Settings for [`OpenAiModel`].
#[derive(Clone)]
pub struct OpenAiConfig {
    /// API key. `None` makes every call fail with `MissingCredential`.
    pub api_key: Option<String>,
    /// Model name.
    pub model: String,
    /// API base URL, without the `/responses` suffix.
    pub api_base: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiConfig {
    /// Sets the API key. Blank keys count as missing.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    /// Sets the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn responses_url(&self) -> String {
        format!("{}/responses", self.api_base.trim_end_matches('/'))
    }
}

/// Subset of the Responses API body that carries the model output.
#[derive(Debug, Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    OutputText {
        text: String,
    },
    Refusal {
        refusal: String,
    },
    #[serde(other)]
    Other,
}

/// Remote sentiment model backed by the OpenAI Responses API.
#[derive(Debug)]
pub struct OpenAiModel {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiModel {
    /// Creates a client from the given settings.
    pub fn new(config: OpenAiConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("feedback-sentiment/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(Self { config, client })
    }

    async fn request(
        &self,
        api_key: &str,
        text: &str,
        instructions: Option<&str>,
    ) -> Result<SentimentResult, RemoteError> {
        let body = build_request_body(&self.config.model, text, instructions);

        let response = self
            .client
            .post(self.config.responses_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message: truncate(&message, 200),
            });
        }

        let body: ResponsesBody = response.json().await?;
        extract_result(body)
    }
}

#[async_trait]
impl SentimentModel for OpenAiModel {
    async fn classify(&self, text: &str, instructions: Option<&str>) -> RemoteOutcome {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return RemoteOutcome::Failure(RemoteError::MissingCredential);
        };

        let start = Instant::now();
        let result = self.request(api_key, text, instructions).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(r) => debug!(
                model = %self.config.model,
                latency_ms,
                sentiment = %r.sentiment,
                rating = r.rating,
                "Remote classification succeeded"
            ),
            Err(e) => warn!(
                model = %self.config.model,
                latency_ms,
                error = %e,
                "Remote classification failed"
            ),
        }

        result.into()
    }

    fn name(&self) -> &str {
        &self.config.model
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }
}

/// Builds the Responses API request with a strict JSON schema output format.
fn build_request_body(model: &str, text: &str, instructions: Option<&str>) -> Value {
    let mut body = json!({
        "model": model,
        "input": text,
        "text": {
            "format": {
                "type": "json_schema",
                "name": SCHEMA_NAME,
                "strict": true,
                "schema": output_schema()
            }
        }
    });

    if let Some(instructions) = instructions {
        body["instructions"] = Value::String(instructions.to_string());
    }

    body
}

/// Pulls the first structured result out of the response output items.
fn extract_result(body: ResponsesBody) -> Result<SentimentResult, RemoteError> {
    for item in body.output.iter().filter(|item| item.kind == "message") {
        for part in &item.content {
            match part {
                ContentPart::OutputText { text } => return parse_structured_output(text),
                ContentPart::Refusal { refusal } => {
                    return Err(RemoteError::Refusal(refusal.clone()))
                }
                ContentPart::Other => {}
            }
        }
    }

    Err(RemoteError::EmptyOutput)
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Sentiment;

    fn body(value: Value) -> ResponsesBody {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn request_body_uses_strict_schema() {
        let body = build_request_body("gpt-4.1-mini", "Great service", Some("rate it"));
        assert_eq!(body["model"], "gpt-4.1-mini");
        assert_eq!(body["input"], "Great service");
        assert_eq!(body["instructions"], "rate it");
        assert_eq!(body["text"]["format"]["type"], "json_schema");
        assert_eq!(body["text"]["format"]["name"], SCHEMA_NAME);
        assert_eq!(body["text"]["format"]["strict"], true);
        assert_eq!(body["text"]["format"]["schema"], output_schema());
    }

    #[test]
    fn request_body_without_instructions() {
        let body = build_request_body("m", "text", None);
        assert!(body.get("instructions").is_none());
    }

    #[test]
    fn extracts_output_text() {
        let body = body(json!({
            "id": "resp_1",
            "output": [
                {"type": "reasoning", "summary": []},
                {
                    "type": "message",
                    "role": "assistant",
                    "content": [
                        {"type": "output_text", "text": "{\"sentiment\":\"positive\",\"rating\":4}", "annotations": []}
                    ]
                }
            ]
        }));

        let result = extract_result(body).unwrap();
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(result.rating, 4);
    }

    #[test]
    fn refusal_is_failure() {
        let body = body(json!({
            "output": [{
                "type": "message",
                "content": [{"type": "refusal", "refusal": "I can't help with that"}]
            }]
        }));

        assert!(matches!(extract_result(body), Err(RemoteError::Refusal(_))));
    }

    #[test]
    fn empty_output_is_failure() {
        assert!(matches!(
            extract_result(body(json!({"output": []}))),
            Err(RemoteError::EmptyOutput)
        ));
        assert!(matches!(
            extract_result(body(json!({}))),
            Err(RemoteError::EmptyOutput)
        ));
    }

    #[test]
    fn malformed_output_text_is_failure() {
        let body = body(json!({
            "output": [{
                "type": "message",
                "content": [{"type": "output_text", "text": "{\"sentiment\":\"great\",\"rating\":5}"}]
            }]
        }));

        assert!(matches!(extract_result(body), Err(RemoteError::Malformed(_))));
    }

    #[test]
    fn responses_url_handles_trailing_slash() {
        let config = OpenAiConfig::default().with_api_base("http://localhost:9000/v1/");
        assert_eq!(config.responses_url(), "http://localhost:9000/v1/responses");
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = OpenAiConfig::default().with_api_key(Some("   ".to_string()));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = OpenAiConfig::default().with_api_key(Some("sk-secret".to_string()));
        let printed = format!("{:?}", config);
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé...");
        assert_eq!(truncate("hi", 10), "hi");
    }

    #[test]
    fn missing_credential_fails_without_request() {
        let model = OpenAiModel::new(OpenAiConfig::default()).unwrap();
        assert!(!model.is_configured());

        let outcome = tokio_test::block_on(model.classify("Great service", None));
        assert!(matches!(
            outcome,
            RemoteOutcome::Failure(RemoteError::MissingCredential)
        ));
    }

    #[tokio::test]
    async fn unreachable_service_is_failure() {
        let config = OpenAiConfig::default()
            .with_api_key(Some("sk-test".to_string()))
            .with_api_base("http://127.0.0.1:1/v1")
            .with_timeout(Duration::from_secs(2));
        let model = OpenAiModel::new(config).unwrap();

        let outcome = model.classify("Great service", None).await;
        assert!(matches!(outcome, RemoteOutcome::Failure(_)));
    }

    /// One-connection HTTP stub on an ephemeral port. Reads the whole
    /// request, then writes `reply` and closes, or holds the socket open
    /// without answering when `reply` is `None`.
    async fn local_service(reply: Option<String>) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }

            match reply {
                Some(reply) => {
                    socket.write_all(reply.as_bytes()).await.unwrap();
                    socket.shutdown().await.ok();
                }
                None => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    drop(socket);
                }
            }
        });

        format!("http://{}/v1", addr)
    }

    fn request_complete(request: &[u8]) -> bool {
        let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&request[..end]).to_ascii_lowercase();
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() >= end + 4 + content_length
    }

    fn http_reply(status_line: &str, content_type: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            content_type,
            body.len(),
            body
        )
    }

    fn model_for(api_base: String, timeout: Duration) -> OpenAiModel {
        let config = OpenAiConfig::default()
            .with_api_key(Some("sk-test".to_string()))
            .with_api_base(api_base)
            .with_timeout(timeout);
        OpenAiModel::new(config).unwrap()
    }

    #[tokio::test]
    async fn silent_service_times_out() {
        let api_base = local_service(None).await;
        let model = model_for(api_base, Duration::from_secs(1));

        let outcome = model.classify("Great service", None).await;
        assert!(matches!(
            outcome,
            RemoteOutcome::Failure(RemoteError::Timeout)
        ));
    }

    #[tokio::test]
    async fn server_error_status_is_failure() {
        let reply = http_reply(
            "500 Internal Server Error",
            "application/json",
            r#"{"error":{"message":"upstream exploded"}}"#,
        );
        let api_base = local_service(Some(reply)).await;
        let model = model_for(api_base, Duration::from_secs(5));

        match model.classify("Great service", None).await {
            RemoteOutcome::Failure(RemoteError::Status { status, message }) => {
                assert_eq!(status, 500);
                assert!(message.contains("upstream exploded"));
            }
            other => panic!("expected status failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn structured_reply_is_success() {
        let body = json!({
            "id": "resp_local",
            "object": "response",
            "output": [{
                "type": "message",
                "role": "assistant",
                "content": [{
                    "type": "output_text",
                    "text": "{\"sentiment\":\"positive\",\"rating\":4}",
                    "annotations": []
                }]
            }]
        })
        .to_string();
        let api_base = local_service(Some(http_reply("200 OK", "application/json", &body))).await;
        let model = model_for(api_base, Duration::from_secs(5));

        match model.classify("Great service", Some("rate it")).await {
            RemoteOutcome::Success(result) => {
                assert_eq!(result.sentiment, Sentiment::Positive);
                assert_eq!(result.rating, 4);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }
}
