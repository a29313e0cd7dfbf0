//! Display formatting and result types.
//!
//! Domain models implement `Display` directly (see [`models`]); collections,
//! operation results and composite views get newtype wrappers. All output is
//! Markdown, rendered by the terminal front end or returned as-is to MCP
//! clients.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Wrappers &      │    │   Formatted     │
//! │ (Program, Week) │───▶│ Result Types    │───▶│    Output       │
//! │                 │    │                 │    │  (Terminal/MCP) │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`collections`]: History and gear lists
//! - [`results`]: Create, update and delete results
//! - [`status`]: Plain confirmation messages
//! - [`datetime`]: Timestamp formatting
//! - [`views`]: Dashboard, week view, load report, VMA estimate
//! - [`models`]: Display implementations for domain models
//!
//! ## Usage Examples
//!
//! ```rust
//! use runflow_core::display::OperationStatus;
//!
//! let status = OperationStatus::success("Programme supprimé");
//! assert!(status.to_string().contains("Programme supprimé"));
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;
pub mod views;

pub use collections::{History, Shoes};
pub use datetime::{LocalDateTime, MessageTime};
pub use models::SessionLine;
pub use results::{CreateResult, DeleteResult, UpdateResult};
pub use status::OperationStatus;
pub use views::{Dashboard, LoadReport, VmaEstimate, WeekView};
