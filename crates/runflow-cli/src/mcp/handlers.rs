//! MCP tool handlers implementation

use std::sync::Arc;

use log::debug;
use rmcp::{
    handler::server::tool::Parameters,
    model::{CallToolResult, Content},
    ErrorData,
};
use runflow_core::{params as core, ProgramStore, RunflowError};
use schemars::JsonSchema;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::errors::to_mcp_error;

/// Generic MCP wrapper for core parameter types
///
/// Deserializes transparently into the wrapped core type and borrows its JSON
/// schema, so the core parameter structs need no MCP-specific code.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

pub type WeekRef = McpParams<core::WeekRef>;
pub type ToggleSession = McpParams<core::ToggleSession>;
pub type History = McpParams<core::History>;
pub type TrainingLoad = McpParams<core::TrainingLoad>;
pub type UpdateWeekSchedule = McpParams<core::UpdateWeekSchedule>;

pub type McpResult = Result<CallToolResult, ErrorData>;

fn text_result(text: impl Into<String>) -> McpResult {
    Ok(CallToolResult::success(vec![Content::text(text.into())]))
}

/// Handler implementations for the MCP server
pub struct McpHandlers {
    store: Arc<Mutex<ProgramStore>>,
}

impl McpHandlers {
    pub fn new(store: Arc<Mutex<ProgramStore>>) -> Self {
        Self { store }
    }

    pub async fn show_program(&self) -> McpResult {
        debug!("show_program");

        let program = self
            .store
            .lock()
            .await
            .load()
            .await
            .map_err(|e| to_mcp_error("Failed to load program", &e))?
            .ok_or_else(|| {
                to_mcp_error("Failed to load program", &RunflowError::ProgramNotFound)
            })?;

        text_result(program.to_string())
    }

    pub async fn show_week(&self, Parameters(params): Parameters<WeekRef>) -> McpResult {
        debug!("show_week: {:?}", params);

        let view = self
            .store
            .lock()
            .await
            .show_week(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to show week", &e))?;

        text_result(view.to_string())
    }

    pub async fn program_summary(&self) -> McpResult {
        debug!("program_summary");

        let summary = self
            .store
            .lock()
            .await
            .summary()
            .await
            .map_err(|e| to_mcp_error("Failed to summarize program", &e))?;

        text_result(summary.to_string())
    }

    pub async fn toggle_session(
        &self,
        Parameters(params): Parameters<ToggleSession>,
    ) -> McpResult {
        debug!("toggle_session: {:?}", params);

        let result = self
            .store
            .lock()
            .await
            .toggle_session_result(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to toggle session", &e))?;

        text_result(result.to_string())
    }

    pub async fn history(&self, Parameters(params): Parameters<History>) -> McpResult {
        debug!("history: {:?}", params);

        let history = self
            .store
            .lock()
            .await
            .history(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to load history", &e))?;

        text_result(history.to_string())
    }

    pub async fn training_load(
        &self,
        Parameters(params): Parameters<TrainingLoad>,
    ) -> McpResult {
        debug!("training_load: {:?}", params);

        let report = self
            .store
            .lock()
            .await
            .training_load(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to compute training load", &e))?;

        text_result(report.to_string())
    }

    pub async fn update_week_schedule(
        &self,
        Parameters(params): Parameters<UpdateWeekSchedule>,
    ) -> McpResult {
        debug!("update_week_schedule: {:?}", params);

        let inner_params = params.as_ref();
        let update = self
            .store
            .lock()
            .await
            .update_week_schedule(inner_params)
            .await
            .map_err(|e| to_mcp_error("Failed to update week", &e))?;

        text_result(format!("✅ {}\n\n{update}", inner_params.reason))
    }
}
