//! High-level store API for the program, profile, gear and coach transcript.
//!
//! [`ProgramStore`] owns the canonical [`ProgramDocument`](crate::models::ProgramDocument)
//! and the runner's other documents. It sits between the interfaces (CLI,
//! MCP, coach, generator) and the SQLite document table:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │    Handlers     │    │   Operations    │    │    Database     │
//! │  (handlers)     │───▶│ (program_ops,   │───▶│   (via db/)     │
//! │                 │    │  gear_ops, ...) │    │                 │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!   Display wrappers      Business logic         Data persistence
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for [`ProgramStore`] instances
//! - [`program_ops`]: Program reads, writes, toggles and week rewrites
//! - [`profile_ops`]: Runner profile
//! - [`gear_ops`]: Shoe list and mileage
//! - [`transcript_ops`]: Coach conversation
//! - [`handlers`]: Operations returning display wrappers
//!
//! Every write of the program bumps its version and notifies subscribers
//! through a broadcast channel, which is how views learn that the coach or
//! another command changed the program.
//!
//! # Usage Examples
//!
//! ```rust
//! use runflow_core::StoreBuilder;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = StoreBuilder::new()
//!     .with_database_path(Some("/tmp/runflow-doc.db"))
//!     .build()
//!     .await?;
//!
//! let mut events = store.subscribe();
//! if let Some(program) = store.load().await? {
//!     println!("{} weeks", program.weeks.len());
//! }
//! # drop(events.try_recv());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use tokio::{sync::broadcast, task};

use crate::{
    db::Database,
    error::{Result, RunflowError},
};

pub mod builder;
pub mod gear_ops;
pub mod handlers;
pub mod profile_ops;
pub mod program_ops;
pub mod transcript_ops;

pub use builder::StoreBuilder;
pub use program_ops::WeekUpdate;

const EVENT_CAPACITY: usize = 16;

/// Change notification for the program document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// The program was written; `version` is the new version
    ProgramChanged { version: u64 },
    /// The program was deleted
    ProgramCleared,
}

/// A value read together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

/// Main store interface.
pub struct ProgramStore {
    pub(crate) db_path: PathBuf,
    events: broadcast::Sender<StoreEvent>,
}

impl ProgramStore {
    /// Creates a new store with the specified database path.
    pub(crate) fn new(db_path: PathBuf) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { db_path, events }
    }

    /// Path of the SQLite database backing this store.
    pub fn database_path(&self) -> &std::path::Path {
        &self.db_path
    }

    /// Subscribe to program change notifications.
    ///
    /// Only writes made through this store instance are observed. Receivers
    /// that fall behind miss events and should simply reload.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub(crate) fn notify(&self, event: StoreEvent) {
        // No subscribers is not an error
        let receivers = self.events.send(event).unwrap_or(0);
        log::debug!("Published {event:?} to {receivers} subscriber(s)");
    }

    /// Run a database operation on the blocking pool with a fresh connection.
    pub(crate) async fn with_db<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            op(&mut db)
        })
        .await
        .map_err(|e| RunflowError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
