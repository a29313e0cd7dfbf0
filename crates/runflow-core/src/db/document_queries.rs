//! Versioned document reads and writes.

use jiff::Timestamp;
use rusqlite::{params, OptionalExtension};

use crate::error::{DatabaseResultExt, Result, RunflowError};

const SELECT_DOCUMENT_SQL: &str =
    "SELECT key, body, version, updated_at FROM documents WHERE key = ?1";
const SELECT_VERSION_SQL: &str = "SELECT version FROM documents WHERE key = ?1";
const UPSERT_DOCUMENT_SQL: &str = "INSERT INTO documents (key, body, version, updated_at) VALUES (?1, ?2, 1, ?3) \
     ON CONFLICT(key) DO UPDATE SET body = excluded.body, version = documents.version + 1, updated_at = excluded.updated_at \
     RETURNING version";
const CLEAR_DOCUMENT_SQL: &str = "UPDATE documents SET body = NULL, version = version + 1, updated_at = ?2 \
     WHERE key = ?1 AND body IS NOT NULL RETURNING version";

/// A raw document row.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub key: String,
    /// JSON text; `None` once the document has been cleared
    pub body: Option<String>,
    pub version: u64,
    pub updated_at: String,
}

impl super::Database {
    /// Retrieves a document row by key.
    pub fn get_document(&self, key: &str) -> Result<Option<StoredDocument>> {
        self.connection
            .query_row(SELECT_DOCUMENT_SQL, params![key], |row| {
                Ok(StoredDocument {
                    key: row.get(0)?,
                    body: row.get(1)?,
                    version: row.get::<_, i64>(2)? as u64,
                    updated_at: row.get(3)?,
                })
            })
            .optional()
            .db_context("Failed to query document")
    }

    /// Writes a document unconditionally and returns its new version.
    pub fn put_document(&mut self, key: &str, body: &str) -> Result<u64> {
        let now = Timestamp::now().to_string();
        let version: i64 = self
            .connection
            .query_row(UPSERT_DOCUMENT_SQL, params![key, body, &now], |row| {
                row.get(0)
            })
            .db_context("Failed to write document")?;
        Ok(version as u64)
    }

    /// Writes a document only if its version still equals `expected`.
    pub fn put_document_if_version(&mut self, key: &str, body: &str, expected: u64) -> Result<u64> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let actual: i64 = tx
            .query_row(SELECT_VERSION_SQL, params![key], |row| row.get(0))
            .optional()
            .db_context("Failed to query document version")?
            .unwrap_or(0);

        if actual as u64 != expected {
            return Err(RunflowError::VersionConflict {
                key: key.to_string(),
                expected,
                actual: actual as u64,
            });
        }

        let now = Timestamp::now().to_string();
        let version: i64 = tx
            .query_row(UPSERT_DOCUMENT_SQL, params![key, body, &now], |row| {
                row.get(0)
            })
            .db_context("Failed to write document")?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(version as u64)
    }

    /// Clears a document, keeping its row so the version keeps increasing.
    ///
    /// Returns the new version, or `None` if there was nothing to clear.
    pub fn clear_document(&mut self, key: &str) -> Result<Option<u64>> {
        let now = Timestamp::now().to_string();
        let version: Option<i64> = self
            .connection
            .query_row(CLEAR_DOCUMENT_SQL, params![key, &now], |row| row.get(0))
            .optional()
            .db_context("Failed to clear document")?;
        Ok(version.map(|v| v as u64))
    }
}
