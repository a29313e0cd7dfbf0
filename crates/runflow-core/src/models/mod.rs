//! Data models for training programs, weeks and sessions.
//!
//! This module contains the core domain models of the RunFlow system. Display
//! implementations for these models are located in [`crate::display::models`]
//! to keep data structures and presentation apart.
//!
//! All models serialise with camelCase field names, so documents written by
//! the web front end load unchanged.
//!
//! # Hierarchy
//!
//! ```text
//! ProgramDocument ──▶ WeeklyPlan (ordered) ──▶ Session (ordered, keyed by id)
//! ```
//!
//! # Examples
//!
//! ```rust
//! use runflow_core::models::{Session, SessionType};
//!
//! let mut session = Session::new("w0-s1", "MAR 2", SessionType::Run, "Footing");
//! session.duration = Some("45".to_string());
//! session.rpe = Some(7);
//! assert_eq!(session.training_load(), 315);
//! ```

pub mod chat;
pub mod gear;
pub mod profile;
pub mod program;
pub mod session;
pub mod session_type;
pub mod summary;
pub mod week;

pub use chat::{ChatMessage, ChatRole, Transcript};
pub use gear::Shoe;
pub use profile::UserProfile;
pub use program::ProgramDocument;
pub use session::{Session, SessionDetails};
pub use session_type::SessionType;
pub use summary::ProgramSummary;
pub use week::WeeklyPlan;
