//! Display implementations for domain models.
//!
//! Kept apart from the model definitions. Everything renders as Markdown so
//! the terminal renderer and MCP clients can both show it. Labels are in
//! French, the language of the product.

use std::fmt;

use super::datetime::{LocalDateTime, MessageTime};
use crate::metrics::{self, Vo2Tier};
use crate::models::{
    ChatMessage, ChatRole, ProgramDocument, ProgramSummary, Session, SessionType, Shoe,
    Transcript, UserProfile, WeeklyPlan,
};

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-line rendering of a session, used in program overviews and history.
pub struct SessionLine<'a>(pub &'a Session);

impl fmt::Display for SessionLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        let check = if s.is_completed() { "[x]" } else { "[ ]" };
        write!(f, "- {check} {} · {} ({})", s.day, s.title, s.kind.with_icon())?;
        if let Some(distance) = &s.distance {
            write!(f, " · {distance}")?;
        }
        writeln!(f, " `{}`", s.id)
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let done = if self.is_completed() { " ✓" } else { "" };
        writeln!(f, "### {} · {} ({}){done}", self.day, self.title, self.kind.with_icon())?;
        writeln!(f)?;

        writeln!(f, "- ID: {}", self.id)?;
        if let Some(date) = &self.date {
            writeln!(f, "- Date: {date}")?;
        }
        if let Some(distance) = &self.distance {
            writeln!(f, "- Distance: {distance}")?;
        }
        if let Some(duration) = &self.duration {
            writeln!(f, "- Durée: {duration}")?;
        }
        if let Some(rpe) = self.rpe {
            writeln!(f, "- RPE: {rpe}/10")?;
            writeln!(f, "- Charge: {}", self.training_load())?;
        }
        if let Some(feedback) = &self.feedback {
            writeln!(f, "- Ressenti: \"{feedback}\"")?;
        }

        if !self.description.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.description)?;
        }

        if self.kind != SessionType::Rest {
            let details = self.details.clone().unwrap_or_default();
            writeln!(f)?;
            writeln!(f, "#### Échauffement")?;
            writeln!(f)?;
            writeln!(f, "{}", details.warmup_or_default())?;
            if let Some(main) = details.main.as_deref().filter(|m| !m.trim().is_empty()) {
                writeln!(f)?;
                writeln!(f, "#### Corps de séance")?;
                writeln!(f)?;
                writeln!(f, "{main}")?;
            }
            writeln!(f)?;
            writeln!(f, "#### Retour au calme")?;
            writeln!(f)?;
            writeln!(f, "{}", details.cooldown_or_default())?;
        }

        writeln!(f)
    }
}

impl fmt::Display for WeeklyPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## Semaine {} ({})", self.week_number, self.dates)?;
        writeln!(f)?;
        writeln!(
            f,
            "- Séances réalisées: {}/{}",
            self.completed_count(),
            self.sessions.len()
        )?;
        writeln!(f, "- Charge: {}", self.training_load())?;
        writeln!(f)?;

        if self.sessions.is_empty() {
            writeln!(f, "Aucune séance cette semaine.")?;
        }
        for session in &self.sessions {
            write!(f, "{session}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ProgramDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.goal)?;
        writeln!(f)?;
        writeln!(f, "- Niveau: {}", self.level)?;
        writeln!(f, "- Créé le: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Semaines: {}", self.weeks.len())?;
        writeln!(f, "- Progression: {}%", metrics::program_progress(self))?;

        for week in &self.weeks {
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

impl fmt::Display for ProgramSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {} ({}%)", self.goal, self.progress_percent)?;
        writeln!(f)?;
        writeln!(f, "- Niveau: {}", self.level)?;
        writeln!(f, "- Semaines: {}", self.total_weeks)?;
        writeln!(
            f,
            "- Séances: {}/{}",
            self.completed_sessions, self.total_sessions
        )?;
        writeln!(f, "- Charge totale: {}", self.total_load)?;
        writeln!(f, "- Créé le: {}", LocalDateTime(&self.created_at))
    }
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.display_name())?;
        writeln!(f)?;
        writeln!(f, "- Niveau: {}", self.level)?;
        match self.vma {
            Some(vma) => writeln!(f, "- VMA: {vma:.1} km/h")?,
            None => writeln!(f, "- VMA: non renseignée")?,
        }
        if let Some(vo2) = self.vo2max() {
            writeln!(
                f,
                "- VO2max estimée: {vo2:.1} ml/kg/min ({})",
                Vo2Tier::from_vo2max(vo2)
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for Shoe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_active { "" } else { " (retirée)" };
        writeln!(f, "### {} {}{status}", self.brand, self.name)?;
        writeln!(f)?;
        writeln!(f, "- ID: {}", self.id)?;
        writeln!(
            f,
            "- Kilométrage: {:.0} / {:.0} km ({:.0}%)",
            self.distance,
            self.max_distance,
            self.wear_percent()
        )?;
        writeln!(f)
    }
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let author = match self.role {
            ChatRole::User => "Vous",
            ChatRole::Model => "Coach",
        };
        writeln!(f, "**{author}** ({}): {}", MessageTime(self.timestamp), self.text)
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for message in self.messages() {
            write!(f, "{message}")?;
            writeln!(f)?;
        }
        Ok(())
    }
}
