//! Boundary to the generative language model.
//!
//! The coach and the plan generator talk to the model through the
//! [`ModelClient`] trait so that tests can script responses. The production
//! implementation is [`GeminiClient`], which calls Gemini's `generateContent`
//! endpoint over HTTP.
//!
//! A request carries an optional system instruction, the conversation, the
//! function declarations the model may call and, for structured output, a
//! response schema with its MIME type. The answer is either plain text or a
//! single function call.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::models::ChatRole;

/// One turn of the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ModelMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// A function the model may call instead of answering with text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    /// Parameters schema (OpenAPI subset understood by the model)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// Everything needed for one model call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelRequest {
    pub system_instruction: Option<String>,
    pub contents: Vec<ModelMessage>,
    pub tools: Vec<FunctionDeclaration>,
    pub response_schema: Option<Value>,
    pub response_mime_type: Option<String>,
    pub temperature: Option<f32>,
}

impl ModelRequest {
    /// Request with a single user message.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            contents: vec![ModelMessage::user(text)],
            ..Self::default()
        }
    }

    /// Ask for JSON output matching `schema`.
    pub fn with_json_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self.response_mime_type = Some("application/json".to_string());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// What the model answered.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    Text(String),
    FunctionCall { name: String, args: Value },
}

/// Asynchronous access to a generative model.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Perform one non-streaming call.
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse>;
}

#[async_trait]
impl<T: ModelClient + ?Sized> ModelClient for std::sync::Arc<T> {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse> {
        (**self).generate(request).await
    }
}
