//! Gemini LLM Provider
//!
//! Implementation of `LlmProvider` over the Generative Language REST API
//! (`models/{model}:generateContent`).

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{split_system, Message, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, TokenUsage},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Environment variable holding the API key
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Gemini provider configuration
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// API key; `None` makes every request fail with `MissingCredential`
    pub api_key: Option<String>,

    /// API base URL
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".into(),
            timeout_secs: 60,
        }
    }
}

impl GeminiConfig {
    pub fn from_env() -> Self {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        let base_url = std::env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| Self::default().base_url);

        Self {
            api_key,
            base_url,
            ..Default::default()
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

// ============================================================================
// Provider
// ============================================================================

/// Gemini LLM provider
pub struct GeminiProvider {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create from configuration
    pub fn from_config(config: GeminiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(GeminiConfig::from_env())
    }

    pub const fn has_credential(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    /// Convert agent messages to a Gemini request body
    fn build_request(messages: &[Message], options: &GenerationOptions) -> GenerateContentRequest {
        let (system, turns) = split_system(messages);

        let contents = turns
            .into_iter()
            .map(|m| Content {
                role: Some(
                    match m.role {
                        Role::Assistant => "model",
                        Role::User | Role::System => "user",
                    }
                    .into(),
                ),
                parts: vec![Part { text: Some(m.content.clone()) }],
            })
            .collect();

        GenerateContentRequest {
            system_instruction: system.map(|text| Content {
                role: None,
                parts: vec![Part { text: Some(text) }],
            }),
            contents,
            generation_config: GenerationConfig {
                temperature: options.temperature,
                top_p: options.top_p,
                max_output_tokens: options.max_tokens,
                stop_sequences: options.stop_sequences.clone(),
            },
        }
    }

    /// Convert a Gemini response to an agent completion
    fn convert_completion(response: GenerateContentResponse, model: &str) -> Result<Completion> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::EmptyResponse("Gemini returned no candidates".into()))?;

        let content: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(AgentError::EmptyResponse(format!(
                "Gemini candidate had no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(Completion {
            content,
            model: model.to_string(),
            usage: response.usage_metadata.map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            }),
            finish_reason: candidate.finish_reason.map(|r| match r.as_str() {
                "STOP" => FinishReason::Stop,
                "MAX_TOKENS" => FinishReason::Length,
                "SAFETY" | "BLOCKLIST" | "PROHIBITED_CONTENT" => FinishReason::ContentFilter,
                _ => FinishReason::Other(r),
            }),
        })
    }

    /// Map a non-success HTTP status and body to an agent error
    fn status_error(status: StatusCode, body: &str) -> AgentError {
        let detail = serde_json::from_str::<ErrorEnvelope>(body).map_or_else(
            |_| body.trim().to_string(),
            |env| match env.error.status {
                Some(s) => format!("{s}: {}", env.error.message),
                None => env.error.message,
            },
        );
        let detail = format!("HTTP {}: {detail}", status.as_u16());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(detail),
            StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(detail),
            s if s.is_server_error() => AgentError::ProviderUnavailable(detail),
            _ => AgentError::Provider(detail),
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AgentError::MissingCredential(API_KEY_VAR.into()))?;

        let request = Self::build_request(messages, options);
        tracing::debug!(model = %options.model, "Sending Gemini generateContent request");

        let response = self
            .client
            .post(self.endpoint(&options.model))
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        let completion = Self::convert_completion(parsed, &options.model)?;

        if let Some(usage) = &completion.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Gemini usage"
            );
        }
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = GeminiConfig::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.base_url, "https://generativelanguage.googleapis.com");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_request_shape() {
        let messages = vec![Message::system("You are a blogger."), Message::user("Metrics...")];
        let opts = GenerationOptions::default();

        let body = serde_json::to_value(GeminiProvider::build_request(&messages, &opts)).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are a blogger.");
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Metrics...");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
        assert!(body["generationConfig"].get("stopSequences").is_none());
    }

    #[test]
    fn test_endpoint_uses_model() {
        let provider = GeminiProvider::from_config(GeminiConfig {
            base_url: "http://localhost:9000/".into(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            provider.endpoint("gemini-pro"),
            "http://localhost:9000/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn test_convert_completion_joins_parts() {
        let raw = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "IBIT saw "}, {"text": "inflows."}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 40, "candidatesTokenCount": 12, "totalTokenCount": 52}
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();

        let completion = GeminiProvider::convert_completion(parsed, "m").unwrap();
        assert_eq!(completion.content, "IBIT saw inflows.");
        assert_eq!(completion.finish_reason, Some(FinishReason::Stop));
        assert_eq!(completion.usage.unwrap().total_tokens, 52);
    }

    #[test]
    fn test_convert_completion_without_candidates() {
        let parsed: GenerateContentResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        let err = GeminiProvider::convert_completion(parsed, "m").unwrap_err();
        assert!(matches!(err, AgentError::EmptyResponse(_)));
    }

    #[test]
    fn test_status_mapping() {
        let body = r#"{"error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}}"#;
        let err = GeminiProvider::status_error(StatusCode::FORBIDDEN, body);
        assert!(matches!(err, AgentError::Auth(ref m) if m.contains("PERMISSION_DENIED")));

        let err = GeminiProvider::status_error(StatusCode::TOO_MANY_REQUESTS, "quota");
        assert!(matches!(err, AgentError::RateLimited(_)));

        let err = GeminiProvider::status_error(StatusCode::SERVICE_UNAVAILABLE, "");
        assert!(matches!(err, AgentError::ProviderUnavailable(_)));

        let err = GeminiProvider::status_error(StatusCode::BAD_REQUEST, "bad");
        assert!(matches!(err, AgentError::Provider(_)));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let provider = GeminiProvider::from_config(GeminiConfig {
            base_url: "http://127.0.0.1:9".into(),
            ..Default::default()
        })
        .unwrap();

        let err = provider
            .prompt("sys", "user", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::MissingCredential(ref v) if v == API_KEY_VAR));
    }
}
