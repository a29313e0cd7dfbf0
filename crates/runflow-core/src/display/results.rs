//! Result wrapper types for displaying operation outcomes.

use std::fmt;

use crate::models::{ProgramDocument, Session, Shoe, UserProfile};
use crate::store::WeekUpdate;

/// Wrapper type for displaying the result of create operations.
pub struct CreateResult<T> {
    pub resource: T,
}

impl<T> CreateResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for CreateResult<Shoe> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Paire ajoutée (ID: {})", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<ProgramDocument> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Programme enregistré: {} semaines",
            self.resource.weeks.len()
        )?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of update operations.
///
/// Tracks the changes made so the runner sees what was modified.
///
/// # Examples
///
/// ```rust
/// use runflow_core::{display::UpdateResult, models::{Session, SessionType}};
///
/// let session = Session::new("w0-s1", "MAR 2", SessionType::Run, "Footing");
/// let result = UpdateResult::with_changes(session, vec!["Séance validée".to_string()]);
/// assert!(result.to_string().contains("- Séance validée"));
/// ```
pub struct UpdateResult<T> {
    pub resource: T,
    pub changes: Vec<String>,
}

impl<T> UpdateResult<T> {
    pub fn new(resource: T) -> Self {
        Self {
            resource,
            changes: Vec::new(),
        }
    }

    pub fn with_changes(resource: T, changes: Vec<String>) -> Self {
        Self { resource, changes }
    }

    fn fmt_changes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.changes.is_empty() {
            writeln!(f)?;
            for change in &self.changes {
                writeln!(f, "- {change}")?;
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for UpdateResult<Session> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Séance mise à jour (ID: {})", self.resource.id)?;
        self.fmt_changes(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for UpdateResult<UserProfile> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Profil mis à jour")?;
        self.fmt_changes(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for UpdateResult<Shoe> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Paire mise à jour (ID: {})", self.resource.id)?;
        self.fmt_changes(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of delete operations.
pub struct DeleteResult<T> {
    pub resource: T,
}

impl<T> DeleteResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for DeleteResult<Shoe> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Paire supprimée: {} {} (ID: {})",
            self.resource.brand, self.resource.name, self.resource.id
        )
    }
}

impl fmt::Display for WeekUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Semaine {} réécrite ({} séances)",
            self.week_number,
            self.merge.sessions.len()
        )?;
        if !self.merge.kept.is_empty() {
            writeln!(f, "- Conservées: {}", self.merge.kept.join(", "))?;
        }
        if !self.merge.adopted.is_empty() {
            writeln!(f, "- Reprises par position: {}", self.merge.adopted.join(", "))?;
        }
        if !self.merge.dropped.is_empty() {
            writeln!(f, "- Supprimées: {}", self.merge.dropped.join(", "))?;
        }
        Ok(())
    }
}
