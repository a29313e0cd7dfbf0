//! Error types for the runflow library.

use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all store, coach and generator operations.
#[derive(Error, Debug)]
pub enum RunflowError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// No training program has been generated or imported yet
    #[error("No training program found")]
    ProgramNotFound,
    /// Week lookup by index or number failed
    #[error("Week {week} not found in the current program")]
    WeekNotFound { week: String },
    /// Session lookup by id failed
    #[error("Session '{id}' not found in week {week_index}")]
    SessionNotFound { week_index: usize, id: String },
    /// Gear lookup by id failed
    #[error("Shoe with ID '{id}' not found")]
    ShoeNotFound { id: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// The model returned something that cannot be turned into a document
    #[error("Invalid model output at '{path}': {reason}")]
    InvalidModelOutput { path: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// External model service errors (network, HTTP status, API error body)
    #[error("Model service error: {message}")]
    Model { message: String },
    /// A compare-and-set write lost against a concurrent writer
    #[error("Document '{key}' changed: expected version {expected}, found {actual}")]
    VersionConflict {
        key: String,
        expected: u64,
        actual: u64,
    },
    /// A coach turn is already in flight
    #[error("The coach is still answering the previous message")]
    CoachBusy,
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> RunflowError {
        RunflowError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> RunflowError {
        RunflowError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl RunflowError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Shorthand for an invalid model output error.
    pub fn invalid_output(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidModelOutput {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a model service error.
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model {
            message: message.into(),
        }
    }

    /// Whether the error came from the external model call or its output.
    pub fn is_model_failure(&self) -> bool {
        matches!(
            self,
            Self::Model { .. } | Self::InvalidModelOutput { .. } | Self::Serialization { .. }
        )
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| RunflowError::database(message).with_source(e))
    }
}

/// Result type alias for runflow operations
pub type Result<T> = std::result::Result<T, RunflowError>;
