//! Groq chat-completions client.
//!
//! Talks to the OpenAI-compatible `POST {base_url}/chat/completions` endpoint.
//! One request per call: failures are mapped onto [`ChatbotError`] and
//! returned to the caller, never retried here.

mod wire;

use std::time::{Duration, Instant};

use reqwest::Client;
use tecnobot_shared::{
    ApiKey, ChatbotError, Completion, CompletionProvider, CompletionRequest, GroqConfig, Result,
};
use tracing::{debug, info, instrument};
use url::Url;

use wire::{ChatCompletionBody, ChatCompletionResponse};

/// Default timeout in seconds for a completion request.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// User-Agent string for completion requests.
const USER_AGENT: &str = concat!("TecnoBot/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Client options
// ---------------------------------------------------------------------------

/// Connection settings for [`GroqClient`].
#[derive(Debug, Clone)]
pub struct GroqOptions {
    /// Base URL of the API, e.g. `https://api.groq.com/openai/v1`.
    pub base_url: Url,
    /// Timeout for the whole request in seconds.
    pub timeout_secs: u64,
}

impl Default for GroqOptions {
    fn default() -> Self {
        GroqOptions::from(&GroqConfig::default())
    }
}

impl From<&GroqConfig> for GroqOptions {
    fn from(config: &GroqConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout_secs: if config.timeout_secs == 0 {
                DEFAULT_TIMEOUT_SECS
            } else {
                config.timeout_secs
            },
        }
    }
}

// ---------------------------------------------------------------------------
// GroqClient
// ---------------------------------------------------------------------------

/// HTTP client for the hosted completion endpoint.
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    endpoint: String,
    api_key: ApiKey,
}

impl std::fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key)
            .finish()
    }
}

impl GroqClient {
    /// Build a client for `api_key` with the given options.
    pub fn new(api_key: ApiKey, opts: &GroqOptions) -> Result<Self> {
        Ok(Self {
            client: build_client(opts)?,
            endpoint: completions_url(&opts.base_url),
            api_key,
        })
    }

    /// The full URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, request: &CompletionRequest) -> Result<Completion> {
        let body = ChatCompletionBody::from(request);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatbotError::Network(describe_transport_error(&e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ChatbotError::Network(format!("failed to read body: {e}")))?;

        if !status.is_success() {
            return Err(ChatbotError::Api {
                status: status.as_u16(),
                message: wire::error_message(&text),
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| ChatbotError::Response(format!("invalid completion JSON: {e}")))?;

        parsed.into_completion(request.model.as_str())
    }
}

impl CompletionProvider for GroqClient {
    #[instrument(skip_all, fields(model = %request.model, messages = request.messages.len()))]
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let started = Instant::now();
        debug!(endpoint = %self.endpoint, "sending completion request");

        let completion = self.send(request).await?;

        info!(
            latency_ms = started.elapsed().as_millis() as u64,
            prompt_tokens = completion.prompt_tokens,
            completion_tokens = completion.completion_tokens,
            "completion received"
        );
        Ok(completion)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `{base_url}/chat/completions`, tolerating a trailing slash on the base.
fn completions_url(base_url: &Url) -> String {
    format!("{}/chat/completions", base_url.as_str().trim_end_matches('/'))
}

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &GroqOptions) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| ChatbotError::Network(format!("failed to build HTTP client: {e}")))
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("could not connect: {e}")
    } else {
        format!("request failed: {e}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tecnobot_shared::{Message, ModelSelection, SamplingParams};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CompletionRequest {
        CompletionRequest::new(
            ModelSelection::Llama3_70b,
            vec![Message::system("persona"), Message::user("¿Cuál es el horario?")],
            SamplingParams::default(),
        )
    }

    fn client_for(server: &MockServer, timeout_secs: u64) -> GroqClient {
        let opts = GroqOptions {
            base_url: Url::parse(&server.uri()).unwrap(),
            timeout_secs,
        };
        GroqClient::new(ApiKey::new("gsk_test"), &opts).unwrap()
    }

    #[test]
    fn test_completions_url() {
        let base = Url::parse("https://api.groq.com/openai/v1").unwrap();
        assert_eq!(
            completions_url(&base),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        let slashed = Url::parse("http://localhost:8080/").unwrap();
        assert_eq!(completions_url(&slashed), "http://localhost:8080/chat/completions");
    }

    #[test]
    fn test_debug_hides_key() {
        let client = GroqClient::new(ApiKey::new("gsk_secret"), &GroqOptions::default()).unwrap();
        let dbg = format!("{client:?}");
        assert!(!dbg.contains("gsk_secret"));
        assert!(dbg.contains("api.groq.com"));
    }

    #[tokio::test]
    async fn test_complete_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer gsk_test"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3-70b-8192",
                "max_tokens": 1024,
                "messages": [
                    {"role": "system", "content": "persona"},
                    {"role": "user", "content": "¿Cuál es el horario?"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "model": "llama3-70b-8192",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Las clases son de 8 a 18hs."},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 120, "completion_tokens": 12, "total_tokens": 132}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 5);
        let completion = client.complete(&request()).await.unwrap();

        assert_eq!(completion.text, "Las clases son de 8 a 18hs.");
        assert_eq!(completion.model, "llama3-70b-8192");
        assert_eq!(completion.prompt_tokens, Some(120));
        assert_eq!(completion.completion_tokens, Some(12));
    }

    #[tokio::test]
    async fn test_api_error_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Invalid API Key", "type": "invalid_request_error"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 5);
        let err = client.complete(&request()).await.unwrap_err();

        match err {
            ChatbotError::Api { status, ref message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API Key");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert!(err.is_dispatch());
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, 5);
        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, ChatbotError::Response(_)));
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, 5);
        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, ChatbotError::Response(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(3))
                    .set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, 1);
        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, ChatbotError::Network(_)), "got {err:?}");
    }
}
