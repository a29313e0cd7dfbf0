//! Builder for creating and configuring ProgramStore instances.

use std::path::{Path, PathBuf};

use tokio::task;

use super::ProgramStore;
use crate::{
    db::Database,
    error::{Result, RunflowError},
};

/// Builder for creating and configuring ProgramStore instances.
#[derive(Debug, Clone, Default)]
pub struct StoreBuilder {
    database_path: Option<PathBuf>,
}

impl StoreBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/runflow/runflow.db` or `~/.local/share/runflow/runflow.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Builds the configured store.
    ///
    /// # Errors
    ///
    /// Returns `RunflowError::FileSystem` if the database directory cannot be created
    /// Returns `RunflowError::Database` if database initialization fails
    pub async fn build(self) -> Result<ProgramStore> {
        let db_path = match self.database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| RunflowError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let db_path_clone = db_path.clone();
        task::spawn_blocking(move || {
            let _db = Database::new(&db_path_clone)?;
            Ok::<(), RunflowError>(())
        })
        .await
        .map_err(|e| RunflowError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        log::debug!("Opened store at {}", db_path.display());
        Ok(ProgramStore::new(db_path))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("runflow")
            .place_data_file("runflow.db")
            .map_err(|e| RunflowError::XdgDirectory(e.to_string()))
    }
}
