//! # Completion service client
//!
//! Talks to a hosted generative model that answers with schema-constrained
//! JSON. The module is split in two halves:
//! - `send`: builds the wire request and performs the HTTP call
//! - `receive`: decodes the service envelope back into the model's text
//!
//! ## Architecture
//!
//! ```text
//! CompletionRequest → send.rs (HTTP POST) → receive.rs (envelope → text) → caller
//! ```
//!
//! Callers depend on the [`CompletionService`] trait, so the review workflow
//! can run against any backend, including scripted ones in tests.

pub mod receive;
pub mod send;

pub use receive::*;
pub use send::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Missing required environment variables: {0}")]
    MissingVariable(String),
    #[error("Completion service is not configured: {0}")]
    Unconfigured(String),
    #[error("Invalid API URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
    #[error("Request timeout - the API took too long to respond")]
    Timeout,
    #[error("Connection error - unable to reach the API")]
    Connect,
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Request blocked by the service: {0}")]
    Blocked(String),
    #[error("Response truncated - the model hit its output token limit")]
    Truncated,
    #[error("API returned empty response")]
    EmptyResponse,
    #[error("Malformed response: {0}")]
    MalformedPayload(String),
}

pub type LlmResult<T> = Result<T, LlmError>;

/// Connection settings for the completion service.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    pub model: String,
    pub api_key: String,
    pub api_url: String,
    pub request_timeout_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Loads settings from the process environment, reading `.env` first when present.
    ///
    /// # Environment Variables
    /// - `API_KEY` (or `GEMINI_API_KEY`): credential passed to the service
    /// - `MODEL`: optional, defaults to `gemini-2.5-flash`
    /// - `API_URL`: optional, defaults to the public Generative Language endpoint
    /// - `REQUEST_TIMEOUT_SECS`: optional, defaults to 30
    pub fn from_env() -> LlmResult<Self> {
        dotenv::dotenv().ok();
        validate_environment()?;

        let api_key = std::env::var("API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .map_err(|_| LlmError::MissingVariable("API_KEY".to_string()))?;

        let config = Self {
            model: std::env::var("MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            api_key,
            api_url: std::env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LlmResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(LlmError::MissingVariable("API_KEY".to_string()));
        }
        let parsed = url::Url::parse(&self.api_url).map_err(|e| LlmError::InvalidUrl {
            url: self.api_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(LlmError::InvalidUrl {
                url: self.api_url.clone(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }
        Ok(())
    }
}

/// Validates that the required environment variables are set
///
/// # Returns
/// * `LlmResult<()>` - Ok if a credential is present, Err naming what is missing
pub fn validate_environment() -> LlmResult<()> {
    let has_key = ["API_KEY", "GEMINI_API_KEY"]
        .iter()
        .any(|var| std::env::var(var).map(|v| !v.trim().is_empty()).unwrap_or(false));

    if has_key {
        Ok(())
    } else {
        Err(LlmError::MissingVariable("API_KEY (or GEMINI_API_KEY)".to_string()))
    }
}

/// One schema-constrained completion.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub response_schema: serde_json::Value,
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the raw text the model produced for `request`.
    async fn complete(&self, request: &CompletionRequest) -> LlmResult<String>;
}
