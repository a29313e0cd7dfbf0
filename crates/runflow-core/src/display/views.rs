//! Composite views built from several documents.

use std::fmt;

use super::models::SessionLine;
use crate::metrics::{self, Vo2Tier};
use crate::models::{ProgramSummary, Session, WeeklyPlan};

/// Landing view: greeting, progress, next session and current week.
pub struct Dashboard {
    pub name: String,
    pub summary: Option<ProgramSummary>,
    pub next_session: Option<Session>,
    pub current_week: Option<WeeklyPlan>,
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Bonjour, {}!", self.name)?;
        writeln!(f)?;

        let Some(summary) = &self.summary else {
            writeln!(f, "Aucun programme actif.")?;
            return writeln!(
                f,
                "Lancez `runflow generate` pour commencer votre entraînement."
            );
        };

        write!(f, "{summary}")?;
        writeln!(f)?;

        match &self.next_session {
            Some(next) => {
                writeln!(f, "## Prochaine séance")?;
                writeln!(f)?;
                write!(f, "{}", SessionLine(next))?;
            }
            None => writeln!(f, "Toutes les séances sont terminées. Bravo !")?,
        }

        if let Some(week) = &self.current_week {
            writeln!(f)?;
            writeln!(f, "## Semaine {} ({})", week.week_number, week.dates)?;
            writeln!(f)?;
            for session in &week.sessions {
                write!(f, "{}", SessionLine(session))?;
            }
        }
        Ok(())
    }
}

/// A week with its position in the program.
pub struct WeekView {
    /// 1-based position
    pub position: usize,
    pub total_weeks: usize,
    pub week: WeeklyPlan,
}

impl fmt::Display for WeekView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Semaine {} sur {}", self.position, self.total_weeks)?;
        writeln!(f)?;
        write!(f, "{}", self.week)
    }
}

/// Training load of one session.
pub struct LoadReport {
    pub session: Session,
    pub rpe: u8,
    pub minutes: u32,
    pub load: u32,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## Charge: {} · {}", self.session.day, self.session.title)?;
        writeln!(f)?;
        writeln!(f, "- Durée: {} min", self.minutes)?;
        writeln!(f, "- RPE: {}/10", self.rpe)?;
        writeln!(f, "- Charge: {}", self.load)
    }
}

/// VMA estimated from a race result.
pub struct VmaEstimate {
    pub distance_km: f64,
    pub time: String,
    pub vma: f64,
    pub saved: bool,
}

impl fmt::Display for VmaEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "## VMA estimée: {:.1} km/h",
            self.vma
        )?;
        writeln!(f)?;
        writeln!(f, "- Course: {} km en {}", self.distance_km, self.time)?;
        if let Some(vo2) = metrics::vo2max(self.vma) {
            writeln!(
                f,
                "- VO2max: {vo2:.1} ml/kg/min ({})",
                Vo2Tier::from_vo2max(vo2)
            )?;
        }
        if self.saved {
            writeln!(f, "- Enregistrée dans le profil")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_empty_state() {
        let dashboard = Dashboard {
            name: "Coureur".to_string(),
            summary: None,
            next_session: None,
            current_week: None,
        };
        let out = dashboard.to_string();
        assert!(out.contains("Bonjour, Coureur!"));
        assert!(out.contains("Aucun programme actif."));
    }

    #[test]
    fn test_vma_estimate_display() {
        let estimate = VmaEstimate {
            distance_km: 10.0,
            time: "50:00".to_string(),
            vma: 13.333,
            saved: false,
        };
        let out = estimate.to_string();
        assert!(out.contains("13.3 km/h"));
        assert!(out.contains("(Bon)"));
    }
}
