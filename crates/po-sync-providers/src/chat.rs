// crates/po-sync-providers/src/chat.rs
// ============================================================================
// Module: HTTP Chat Translator
// Description: Translator capability over a chat-completion HTTP endpoint.
// Purpose: Drive an external model provider with strict request semantics.
// Dependencies: po-sync-core, reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! The chat translator POSTs one JSON completion request per string to a
//! configured endpoint. The instruction is fixed: preserve punctuation,
//! numbers, symbols, and formatting exactly, and return only the translated
//! text. The client-level timeout is the capability's single cancellation
//! point; a timed-out request surfaces as [`TranslateError::Timeout`] and is
//! handled like any other per-item failure upstream.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use po_sync_core::TranslateError;
use po_sync_core::Translator;
use reqwest::Client;
use reqwest::Url;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fixed system instruction sent with every translation request.
const SYSTEM_PROMPT: &str = "You are a professional software catalogue translator. \
     Translate text while exactly preserving punctuation, numbers, symbols, and formatting. \
     Never add or remove quotes or other characters. Return only the translated text.";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the chat translator.
///
/// # Invariants
/// - `endpoint` must parse as an absolute URL.
/// - `timeout_ms` applies to the full request lifecycle and is the only
///   cancellation point.
/// - The API key is read from the environment variable named by
///   `api_key_env`; a missing key degrades to unauthenticated requests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatTranslatorConfig {
    /// Completion endpoint URL.
    pub endpoint: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// User agent string for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Returns the default API key environment variable name.
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// Returns the default request timeout in milliseconds.
const fn default_timeout_ms() -> u64 {
    30_000
}

/// Returns the default user agent.
fn default_user_agent() -> String {
    concat!("po-sync/", env!("CARGO_PKG_VERSION")).to_string()
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Outbound completion request body.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    /// Model identifier.
    model: &'a str,
    /// System and user messages.
    messages: Vec<ChatMessage<'a>>,
}

/// One chat message in the request body.
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    /// Message role, `system` or `user`.
    role: &'a str,
    /// Message content.
    content: String,
}

/// Completion response body.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    /// Completion choices; the first is used.
    choices: Vec<ChatChoice>,
}

/// One completion choice.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    /// The completed message.
    message: ChatChoiceMessage,
}

/// Message payload of a completion choice.
#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    /// Completed text content.
    content: String,
}

// ============================================================================
// SECTION: Translator Implementation
// ============================================================================

/// Translator capability over a chat-completion HTTP endpoint.
///
/// # Invariants
/// - One request per `translate` call; no batching at this layer.
/// - Responses are used verbatim; the provider owns formatting fidelity.
#[derive(Debug)]
pub struct ChatTranslator {
    /// Provider configuration.
    config: ChatTranslatorConfig,
    /// Parsed completion endpoint.
    endpoint: Url,
    /// Optional bearer token resolved from the environment.
    api_key: Option<String>,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl ChatTranslator {
    /// Creates a chat translator with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError`] when the endpoint URL is invalid or the
    /// HTTP client cannot be created.
    pub fn new(config: ChatTranslatorConfig) -> Result<Self, TranslateError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|_| TranslateError::Provider("invalid endpoint url".to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|_| TranslateError::Provider("http client build failed".to_string()))?;
        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            tracing::warn!(
                env = %config.api_key_env,
                "api key not set; requests will be unauthenticated"
            );
        }
        Ok(Self {
            config,
            endpoint,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl Translator for ChatTranslator {
    async fn translate(&self, text: &str, language_name: &str) -> Result<String, TranslateError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!(
                        "Translate the following to {language_name} exactly as requested:\n\n{text}"
                    ),
                },
            ],
        };
        let mut request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }
        let response = request.send().await.map_err(map_request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::Provider(format!(
                "translation endpoint returned status {status}"
            )));
        }
        let completion: ChatResponse = response.json().await.map_err(map_request_error)?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| TranslateError::Provider("empty completion".to_string()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps reqwest failures into the capability error taxonomy.
fn map_request_error(error: reqwest::Error) -> TranslateError {
    if error.is_timeout() {
        TranslateError::Timeout
    } else {
        TranslateError::Provider("http request failed".to_string())
    }
}
