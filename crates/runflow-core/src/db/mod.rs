//! Database operations and SQLite management for stored documents.
//!
//! RunFlow keeps a handful of JSON documents (the program, the profile, the
//! gear list and the coach transcript) in a single key/value table. Each
//! document carries a version that increases on every write, which backs the
//! versioned reads and compare-and-set writes of the store.

use std::path::Path;

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod document_queries;
pub mod migrations;

pub use document_queries::StoredDocument;

/// Key of the current training program.
pub const PROGRAM_KEY: &str = "currentProgram";
/// Key of the gear (shoe) list.
pub const SHOES_KEY: &str = "runflow_shoes";
/// Key of the runner profile.
pub const PROFILE_KEY: &str = "runflow_user";
/// Key of the coach transcript.
pub const TRANSCRIPT_KEY: &str = "runflow_coach_transcript";

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}
