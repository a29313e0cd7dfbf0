//! MCP server implementation for RunFlow
//!
//! Exposes the training program to AI assistants over the Model Context
//! Protocol: reading the program, ticking off sessions, the history and
//! training load, and the same week rewrite the coach performs.

use std::{future::Future, sync::Arc};

use anyhow::Result;
use log::{debug, error, info};
use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use runflow_core::ProgramStore;
use tokio::{
    signal::unix::{signal, SignalKind},
    sync::Mutex,
};

pub mod errors;
pub mod handlers;

pub use handlers::{
    History, McpResult, ToggleSession, TrainingLoad, UpdateWeekSchedule, WeekRef,
};

/// MCP server for RunFlow
#[derive(Clone)]
pub struct RunflowMcpServer {
    store: Arc<Mutex<ProgramStore>>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl RunflowMcpServer {
    pub fn new(store: ProgramStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            tool_router: Self::tool_router(),
        }
    }

    fn handlers(&self) -> handlers::McpHandlers {
        handlers::McpHandlers::new(self.store.clone())
    }

    #[tool(
        name = "show_program",
        description = "Display the whole training program: goal, level, progress and every week with its sessions (day, title, type, distance, session id, done or not). Use it to find the week position and session id needed by the other tools."
    )]
    async fn show_program(&self) -> McpResult {
        self.handlers().show_program().await
    }

    #[tool(
        name = "show_week",
        description = "Display one week of the program in detail, including each session's description, warm-up, main set and cool-down. 'week' is the 1-based position of the week in the program."
    )]
    async fn show_week(&self, params: Parameters<WeekRef>) -> McpResult {
        self.handlers().show_week(params).await
    }

    #[tool(
        name = "program_summary",
        description = "Summarize the program: goal, level, number of weeks, completed versus total sessions, progress percentage and total training load."
    )]
    async fn program_summary(&self) -> McpResult {
        self.handlers().program_summary().await
    }

    #[tool(
        name = "toggle_session",
        description = "Mark a session as done, or back to to-do if it was done. When marking it done, optionally record 'rpe' (perceived exertion, 1 to 10) and 'feedback' (how it felt). Marking a session to-do again keeps the recorded RPE and feedback."
    )]
    async fn toggle_session(&self, params: Parameters<ToggleSession>) -> McpResult {
        self.handlers().toggle_session(params).await
    }

    #[tool(
        name = "history",
        description = "List completed sessions, newest first, with the total count and estimated distance. Set runs_only=true to keep only run, interval and long sessions."
    )]
    async fn history(&self, params: Parameters<History>) -> McpResult {
        self.handlers().history(params).await
    }

    #[tool(
        name = "training_load",
        description = "Compute a session's training load: duration in minutes times RPE. Uses the RPE recorded on the session unless 'rpe' is given."
    )]
    async fn training_load(&self, params: Parameters<TrainingLoad>) -> McpResult {
        self.handlers().training_load(params).await
    }

    #[tool(
        name = "update_week_schedule",
        description = "Rewrite the sessions of one week. Provide the week number, a short reason shown to the runner, and the FULL list of 7 sessions (Monday to Sunday). Keep existing session ids when moving sessions: completion, RPE and feedback follow the id. Set replace=true to store the sessions exactly as given."
    )]
    async fn update_week_schedule(&self, params: Parameters<UpdateWeekSchedule>) -> McpResult {
        self.handlers().update_week_schedule(params).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for RunflowMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "runflow".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(r#"RunFlow holds a runner's training program and lets you follow and adjust it.

## Core Concepts
- **Program**: ordered weeks toward a goal race
- **Week**: addressed by its 1-based position; carries a week number and usually 7 sessions (Monday to Sunday)
- **Session**: one day (run, rest, interval, long, test, recovery, tempo) with a stable id such as `w0-s3`, and once done an RPE (1-10) and feedback

## Workflow Examples

### Logging a session
1. `show_program` or `show_week` to find the session id
2. `toggle_session` with the RPE and how it felt

### Adjusting a week
1. `show_week` to read the current sessions
2. `update_week_schedule` with all 7 sessions, keeping the ids of sessions you only move

### Reviewing training
- `history` for completed sessions and distance
- `training_load` for one session's load
- `program_summary` for overall progress"#.to_string()),
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: RunflowMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting RunFlow MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_lists_all_tools() {
        let router = RunflowMcpServer::tool_router();
        let mut names: Vec<String> = router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            [
                "history",
                "program_summary",
                "show_program",
                "show_week",
                "toggle_session",
                "training_load",
                "update_week_schedule",
            ]
        );
    }
}
