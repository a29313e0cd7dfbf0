//! RunFlow CLI Application
//!
//! Command-line front end for the training program store, the plan
//! generator and the coach, plus an MCP server over stdio.

mod args;
mod cli;
mod mcp;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use mcp::{run_stdio_server, RunflowMcpServer};
use renderer::TerminalRenderer;
use runflow_core::StoreBuilder;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        command,
    } = Args::parse();

    let store = StoreBuilder::new()
        .with_database_path(database_file)
        .build()
        .await
        .context("Failed to initialize store")?;

    let renderer = TerminalRenderer::new(!no_color);

    info!("RunFlow started");

    match command {
        Some(Program { command }) => {
            Cli::new(store, renderer)
                .handle_program_command(command)
                .await
        }
        Some(Session { command }) => {
            Cli::new(store, renderer)
                .handle_session_command(command)
                .await
        }
        Some(Generate(args)) => Cli::new(store, renderer).generate(args).await,
        Some(Coach(args)) => Cli::new(store, renderer).coach(args).await,
        Some(History(args)) => Cli::new(store, renderer).history(args.into()).await,
        Some(Profile { command }) => {
            Cli::new(store, renderer)
                .handle_profile_command(command)
                .await
        }
        Some(Gear { command }) => {
            Cli::new(store, renderer)
                .handle_gear_command(command)
                .await
        }
        Some(Serve) => {
            info!("Starting RunFlow MCP server");
            run_stdio_server(RunflowMcpServer::new(store))
                .await
                .context("MCP server failed")
        }
        None => Cli::new(store, renderer).dashboard().await,
    }
}
