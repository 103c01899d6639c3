use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::llm::receive::{service_error_message, GenerateContentResponse};
use crate::llm::{CompletionRequest, CompletionService, Config, LlmError, LlmResult};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: serde_json::Value,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    pub fn from_completion(request: &CompletionRequest) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(request.prompt.clone()),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: request.response_schema.clone(),
            },
        }
    }
}

/// Client for the Generative Language `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    config: Config,
}

impl GeminiClient {
    pub fn new(config: Config) -> LlmResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| LlmError::ClientBuild(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> LlmResult<Self> {
        Self::new(Config::from_env()?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl CompletionService for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> LlmResult<String> {
        let model = if request.model.trim().is_empty() {
            self.config.model.as_str()
        } else {
            request.model.as_str()
        };
        let body = GenerateContentRequest::from_completion(request);

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = status.as_u16(), "Completion request rejected");
            return Err(status_error(status.as_u16(), &error_text));
        }

        let envelope: GenerateContentResponse = response.json().await.map_err(|e| {
            LlmError::MalformedPayload(format!("Failed to parse API response as JSON: {}", e))
        })?;

        let text = envelope.into_text()?;
        debug!(chars = text.len(), "Completion received");
        Ok(text)
    }
}

/// Stand-in used when no credential is configured; every request fails with
/// the configuration error so the assistant shows it as an error card.
pub struct UnconfiguredService {
    reason: String,
}

impl UnconfiguredService {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl CompletionService for UnconfiguredService {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    async fn complete(&self, _request: &CompletionRequest) -> LlmResult<String> {
        Err(LlmError::Unconfigured(self.reason.clone()))
    }
}

fn transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else if e.is_connect() {
        LlmError::Connect
    } else {
        LlmError::Network(e.to_string())
    }
}

/// Maps a non-success status to an error, keeping the service's own message when it sent one.
pub fn status_error(status: u16, body: &str) -> LlmError {
    let detail = service_error_message(body).unwrap_or_else(|| body.trim().to_string());
    let message = match status {
        400 => format!("Bad request - {}", detail),
        401 | 403 => format!("Authentication failed - check your API key ({})", detail),
        429 => format!("Rate limit exceeded - too many requests ({})", detail),
        500..=599 => format!("Server error: {}", detail),
        _ => detail,
    };
    LlmError::Http { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use mockito::{Matcher, Server};

    fn client_for(url: String) -> GeminiClient {
        let mut config = Config::new("test-key");
        config.api_url = url;
        config.request_timeout_secs = 5;
        GeminiClient::new(config).unwrap()
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gemini-2.5-flash".to_string(),
            prompt: "Review this".to_string(),
            response_schema: json!({"type": "ARRAY"}),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GenerateContentRequest::from_completion(&request())).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Review this");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "ARRAY");
    }

    #[test]
    fn test_status_error_mapping() {
        let err = status_error(429, r#"{"error": {"message": "Quota exhausted"}}"#);
        assert!(matches!(&err, LlmError::Http { status: 429, .. }));
        assert!(err.to_string().contains("Quota exhausted"));
        assert!(err.to_string().contains("Rate limit"));

        let err = status_error(503, "upstream down");
        assert!(err.to_string().contains("Server error: upstream down"));

        let err = status_error(401, "{}");
        assert!(err.to_string().contains("Authentication failed"));
    }

    const ENDPOINT: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    #[tokio::test]
    async fn test_complete_round_trip() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", ENDPOINT)
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{"role": "user", "parts": [{"text": "Review this"}]}],
                "generationConfig": {"responseMimeType": "application/json"}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"candidates": [{"content": {"parts": [{"text": "[]"}]}}]}).to_string())
            .create_async()
            .await;

        let text = client_for(format!("{}/v1beta", server.url()))
            .complete(&request())
            .await
            .unwrap();
        assert_eq!(text, "[]");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_surfaces_service_errors() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", ENDPOINT)
            .match_header("x-goog-api-key", "test-key")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(json!({"error": {"code": 400, "message": "API key not valid."}}).to_string())
            .create_async()
            .await;

        let err = client_for(format!("{}/v1beta", server.url()))
            .complete(&request())
            .await
            .unwrap_err();
        assert!(matches!(&err, LlmError::Http { status: 400, .. }));
        assert!(err.to_string().contains("API key not valid."));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_rejects_non_json_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", ENDPOINT)
            .with_status(200)
            .with_body("definitely not json")
            .create_async()
            .await;

        let err = client_for(format!("{}/v1beta", server.url()))
            .complete(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn test_unconfigured_service_reports_reason() {
        let service = UnconfiguredService::new("Missing required environment variables: API_KEY");
        let err = service.complete(&request()).await.unwrap_err();
        assert!(matches!(&err, LlmError::Unconfigured(_)));
        assert!(err.to_string().contains("API_KEY"));
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v1beta", listener.local_addr().unwrap());
        drop(listener);

        let err = client_for(url).complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Connect | LlmError::Network(_)));
    }
}
