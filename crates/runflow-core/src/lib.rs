//! Core library for the RunFlow training application.
//!
//! This crate holds everything behind the `runflow` front ends: the stored
//! training program and its companion documents, plan generation and the
//! coach dialogue (both backed by a generative model), and the running
//! metrics derived from completed sessions.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐
//! │ PlanGenerator│   │ CoachSession │──── update_week_schedule
//! └──────┬───────┘   └──────┬───────┘            │
//!        │ ModelClient      │                    ▼
//!        ▼                  ▼            ┌──────────────┐
//!   Gemini (HTTP)      Gemini (HTTP)     │ ProgramStore │──▶ SQLite documents
//!                                        └──────────────┘
//! ```
//!
//! - **Store** ([`store`]): the single owner of the program. Every write bumps
//!   a version and is broadcast to subscribers.
//! - **Model boundary** ([`llm`]): a [`ModelClient`] trait with the Gemini
//!   implementation; tests script it.
//! - **Validation** ([`validate`], [`reconcile`]): model output is checked and
//!   repaired before it reaches the store, and week rewrites keep the
//!   runner's completion history.
//! - **Display** ([`display`]): Markdown `Display` implementations shared by
//!   the terminal and MCP front ends.
//!
//! # Quick Start
//!
//! ```rust
//! use runflow_core::{params::ToggleSession, StoreBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = StoreBuilder::new()
//!     .with_database_path(Some("runflow-test.db"))
//!     .build()
//!     .await?;
//!
//! if let Some(program) = store.load().await? {
//!     let first = &program.weeks[0].sessions[0];
//!     let session = store
//!         .toggle_completion(&ToggleSession {
//!             week: 1,
//!             session_id: first.id.clone(),
//!             rpe: Some(6),
//!             feedback: Some("Bonnes jambes".to_string()),
//!         })
//!         .await?;
//!     println!("{session}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod coach;
pub mod db;
pub mod display;
pub mod error;
pub mod generator;
pub mod llm;
pub mod metrics;
pub mod models;
pub mod params;
pub mod reconcile;
pub mod store;
pub mod validate;

// Re-export commonly used types
pub use coach::{CoachReply, CoachSession, CoachState};
pub use db::Database;
pub use error::{Result, RunflowError};
pub use generator::{IntakeForm, PerfKind, PlanGenerator};
pub use llm::{GeminiClient, ModelClient, ModelRequest, ModelResponse};
pub use models::{ProgramDocument, Session, SessionType, UserProfile, WeeklyPlan};
pub use reconcile::MergePolicy;
pub use store::{ProgramStore, StoreBuilder, StoreEvent, WeekUpdate};
