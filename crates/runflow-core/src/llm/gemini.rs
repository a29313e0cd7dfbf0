//! Google Gemini client.
//!
//! Calls `POST {base}/models/{model}:generateContent?key=...` once per
//! request. There is no streaming, retry or timeout.
//!
//! ## Configuration
//!
//! - `GEMINI_API_KEY` (or `API_KEY`): API key from Google AI Studio
//! - `RUNFLOW_MODEL`: model name, `gemini-2.5-flash` by default
//! - `RUNFLOW_API_BASE`: endpoint base URL, mostly useful for tests

use std::env;
use std::fmt;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{FunctionDeclaration, ModelClient, ModelRequest, ModelResponse};
use crate::error::{Result, RunflowError};

const API_KEY_ENV: &str = "GEMINI_API_KEY";
const FALLBACK_API_KEY_ENV: &str = "API_KEY";
const MODEL_ENV: &str = "RUNFLOW_MODEL";
const API_BASE_ENV: &str = "RUNFLOW_API_BASE";

/// Default model to use
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Base URL for the Gemini API
pub const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        text: String,
    },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: FunctionCall,
    },
    /// Parts this client does not use (thoughts, inline data, ...)
    Other(Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize)]
struct Tool {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "totalTokenCount")]
    total: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

/// [`ModelClient`] backed by the Gemini REST API.
pub struct GeminiClient {
    api_key: String,
    client: Client,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a client with an API key, the default model and endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: API_BASE_URL.to_string(),
        }
    }

    /// Create a client from the environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when neither `GEMINI_API_KEY` nor
    /// `API_KEY` is set.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var(API_KEY_ENV)
            .or_else(|_| env::var(FALLBACK_API_KEY_ENV))
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| RunflowError::Configuration {
                message: format!("{API_KEY_ENV} environment variable not set"),
            })?;

        let mut client = Self::new(api_key);
        if let Ok(model) = env::var(MODEL_ENV) {
            client = client.with_model(model);
        }
        if let Ok(base) = env::var(API_BASE_ENV) {
            client = client.with_base_url(base);
        }
        Ok(client)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    fn build_request(request: &ModelRequest) -> GeminiRequest {
        let contents = request
            .contents
            .iter()
            .map(|m| GeminiContent {
                role: Some(m.role.as_str().to_string()),
                parts: vec![ContentPart::Text {
                    text: m.text.clone(),
                }],
            })
            .collect();

        let system_instruction = request.system_instruction.as_ref().map(|s| GeminiContent {
            role: None,
            parts: vec![ContentPart::Text { text: s.clone() }],
        });

        let generation_config = if request.temperature.is_some()
            || request.response_mime_type.is_some()
            || request.response_schema.is_some()
        {
            Some(GenerationConfig {
                temperature: request.temperature,
                response_mime_type: request.response_mime_type.clone(),
                response_schema: request.response_schema.clone(),
            })
        } else {
            None
        };

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(vec![Tool {
                function_declarations: request.tools.clone(),
            }])
        };

        GeminiRequest {
            contents,
            system_instruction,
            generation_config,
            tools,
        }
    }

    /// Turn the first candidate into a response, preferring function calls.
    fn extract_response(response: GeminiResponse) -> Result<ModelResponse> {
        let candidate = response
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| RunflowError::model("No candidates in Gemini response"))?;

        if let Some(reason) = &candidate.finish_reason {
            debug!("Gemini finish reason: {reason}");
        }

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

        let mut text = String::new();
        for part in parts {
            match part {
                ContentPart::FunctionCall { function_call } => {
                    return Ok(ModelResponse::FunctionCall {
                        name: function_call.name,
                        args: function_call.args,
                    });
                }
                ContentPart::Text { text: t } => text.push_str(&t),
                ContentPart::Other(_) => {}
            }
        }

        if text.is_empty() {
            return Err(RunflowError::model("No content in Gemini response"));
        }
        Ok(ModelResponse::Text(text))
    }

    /// Map a non-success status to an error, surfacing quota messages.
    fn map_api_error(status: u16, response_text: &str) -> RunflowError {
        let message = serde_json::from_str::<GeminiResponse>(response_text)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| response_text.to_string(), |e| e.message);

        match status {
            429 => RunflowError::model(Self::extract_quota_message(&message)),
            _ => RunflowError::model(format!("Gemini API error ({status}): {message}")),
        }
    }

    /// Turn "Please retry in 6.4s." into a readable quota message.
    fn extract_quota_message(message: &str) -> String {
        const PREFIX: &str = "Please retry in ";
        let seconds = message.find(PREFIX).and_then(|pos| {
            let after = &message[pos + PREFIX.len()..];
            let end = after.find('s')?;
            after[..end].parse::<f64>().ok()
        });

        match seconds {
            Some(s) => format!(
                "Model quota exceeded. Please try again in {} seconds.",
                s.ceil() as u64
            ),
            None => "Model quota exceeded. Please wait a moment and try again.".to_string(),
        }
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse> {
        let body = Self::build_request(request);

        debug!(
            "Sending request to Gemini ({}, {} messages, {} tools)",
            self.model,
            request.contents.len(),
            request.tools.len()
        );

        let response = self
            .client
            .post(self.build_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| RunflowError::model(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| RunflowError::model(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            error!("Gemini API error: {status}");
            return Err(Self::map_api_error(status.as_u16(), &response_text));
        }

        let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
            error!("Failed to parse Gemini response: {e}");
            RunflowError::model(format!("Failed to parse Gemini response: {e}"))
        })?;

        if let Some(err) = parsed.error {
            return Err(RunflowError::model(format!(
                "Gemini API error: {}",
                err.message
            )));
        }

        if let Some(total) = parsed.usage_metadata.as_ref().and_then(|u| u.total) {
            debug!("Gemini used {total} tokens");
        }

        Self::extract_response(parsed)
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::llm::ModelMessage;

    #[test]
    fn test_request_wire_format() {
        let request = ModelRequest {
            system_instruction: Some("Tu es coach".to_string()),
            contents: vec![ModelMessage::user("Salut"), ModelMessage::model("Bonjour")],
            tools: vec![FunctionDeclaration {
                name: "update_week_schedule".to_string(),
                description: "Updates".to_string(),
                parameters: Some(json!({"type": "OBJECT"})),
            }],
            response_schema: None,
            response_mime_type: None,
            temperature: Some(0.3),
        };

        let body = serde_json::to_value(GeminiClient::build_request(&request)).unwrap();
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["system_instruction"]["parts"][0]["text"], "Tu es coach");
        assert_eq!(
            body["tools"][0]["function_declarations"][0]["name"],
            "update_week_schedule"
        );
        assert!(body["generation_config"]["response_schema"].is_null());
        assert!((body["generation_config"]["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_function_call_wins_over_text() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"role": "model", "parts": [
                {"text": "Je modifie"},
                {"functionCall": {"name": "update_week_schedule", "args": {"weekNumber": 1}}}
            ]}}]
        }))
        .unwrap();

        match GeminiClient::extract_response(response).unwrap() {
            ModelResponse::FunctionCall { name, args } => {
                assert_eq!(name, "update_week_schedule");
                assert_eq!(args["weekNumber"], 1);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn test_quota_message() {
        let msg = GeminiClient::extract_quota_message("Quota hit. Please retry in 6.4s.");
        assert_eq!(msg, "Model quota exceeded. Please try again in 7 seconds.");
    }
}
