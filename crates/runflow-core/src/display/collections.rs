//! Collection wrapper types for displaying groups of domain objects.

use std::{fmt, ops::Index};

use super::models::SessionLine;
use crate::models::{Session, Shoe};

/// Completed sessions, newest first, with the history KPIs.
///
/// The session count and estimated distance cover every completed session,
/// while `sessions` may be filtered.
///
/// # Examples
///
/// ```rust
/// use runflow_core::{display::History, models::{Session, SessionType}};
///
/// let mut run = Session::new("w0-s1", "MAR 2", SessionType::Run, "Footing");
/// run.completed = Some(true);
/// run.distance = Some("8 km".to_string());
///
/// let history = History::new(vec![run], 1, 8.0);
/// assert!(history.to_string().contains("8.0 km"));
/// ```
pub struct History {
    pub sessions: Vec<Session>,
    pub completed_total: usize,
    pub total_distance_km: f64,
}

impl History {
    pub fn new(sessions: Vec<Session>, completed_total: usize, total_distance_km: f64) -> Self {
        Self {
            sessions,
            completed_total,
            total_distance_km,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Session> {
        self.sessions.iter()
    }
}

impl fmt::Display for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Mon historique")?;
        writeln!(f)?;
        writeln!(f, "- Séances: {}", self.completed_total)?;
        writeln!(f, "- Distance est.: {:.1} km", self.total_distance_km)?;
        writeln!(f)?;

        if self.sessions.is_empty() {
            return writeln!(f, "Aucune séance terminée pour le moment.");
        }

        writeln!(f, "## Activités récentes")?;
        writeln!(f)?;
        for session in &self.sessions {
            write!(f, "{}", SessionLine(session))?;
            if let Some(rpe) = session.rpe {
                writeln!(f, "  RPE {rpe}/10, charge {}", session.training_load())?;
            }
        }
        Ok(())
    }
}

/// Newtype wrapper for displaying the gear list.
pub struct Shoes(pub Vec<Shoe>);

impl Shoes {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Shoe> {
        self.0.iter()
    }
}

impl Index<usize> for Shoes {
    type Output = Shoe;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for Shoes {
    type Item = Shoe;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Shoes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "Aucune paire enregistrée.");
        }
        for shoe in &self.0 {
            write!(f, "{shoe}")?;
        }
        Ok(())
    }
}
