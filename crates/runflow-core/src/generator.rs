//! Training plan generation.
//!
//! Turns an [`IntakeForm`] into a prompt, asks the model for a JSON program
//! constrained by [`program_response_schema`], validates the answer and saves
//! it as the current program. Any failure leaves the previous program as it
//! was.

use jiff::Timestamp;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{Result, RunflowError},
    llm::{ModelClient, ModelRequest, ModelResponse},
    models::{ProgramDocument, SessionType},
    store::ProgramStore,
    validate,
};

/// Message shown to the runner when generation fails.
pub const GENERATION_FAILED_MESSAGE: &str = "Une erreur est survenue lors de la génération ou de l'analyse du programme. Essayez de réduire la durée du programme ou réessayez.";

const DEFAULT_GOAL_TIME: &str = "Finir la course confortablement";
const NONE_REPORTED: &str = "Aucune";

/// Kind of reference performance given by the runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerfKind {
    /// Maximal aerobic speed
    #[default]
    Vma,
    /// Maximal heart rate
    Fcm,
}

impl PerfKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerfKind::Vma => "vma",
            PerfKind::Fcm => "fcm",
        }
    }
}

impl std::str::FromStr for PerfKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vma" => Ok(PerfKind::Vma),
            "fcm" => Ok(PerfKind::Fcm),
            _ => Err(format!("Invalid performance kind: {s}")),
        }
    }
}

/// What the runner tells us before a plan is generated.
///
/// Fields are free-form text, passed to the model as typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeForm {
    pub age: String,
    pub sex: String,
    pub level: String,
    pub perf_kind: PerfKind,
    pub perf_value: String,
    pub goal_distance: String,
    pub goal_time: Option<String>,
    pub sessions_per_week: String,
    pub duration_weeks: u32,
    pub unavailability: Option<String>,
    pub injuries: Option<String>,
}

impl Default for IntakeForm {
    fn default() -> Self {
        Self {
            age: String::new(),
            sex: "Homme".to_string(),
            level: "Intermédiaire".to_string(),
            perf_kind: PerfKind::Vma,
            perf_value: String::new(),
            goal_distance: "10 km".to_string(),
            goal_time: None,
            sessions_per_week: "3 séances".to_string(),
            duration_weeks: 8,
            unavailability: None,
            injuries: None,
        }
    }
}

impl IntakeForm {
    pub fn validate(&self) -> Result<()> {
        if self.duration_weeks == 0 {
            return Err(RunflowError::invalid_input("duration_weeks")
                .with_reason("The plan must last at least one week"));
        }
        Ok(())
    }
}

fn or_default<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}

/// Build the generation prompt for a form.
pub fn build_generation_prompt(form: &IntakeForm) -> String {
    let weeks = form.duration_weeks;
    let types = SessionType::ALL
        .iter()
        .map(|t| format!("'{}'", t.as_str()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Agis comme un coach de course à pied expert et de classe mondiale.
Crée un plan d'entraînement complet et progressif de {weeks} semaines pour ce coureur :

PROFIL DU COUREUR :
- Sexe/Age: {sex}, {age} ans.
- Niveau actuel: {level}.
- Performance de référence: {perf_value} ({perf_kind}).

OBJECTIF :
- Distance: {goal_distance}.
- Chrono visé: {goal_time}.

PARAMÈTRES :
- Durée du plan: {weeks} semaines EXACTEMENT.
- Fréquence: {sessions}.
- Contraintes/Blessures à respecter strictement: {injuries}.
- Indisponibilités: {unavailability}.

CONSIGNES DE STRUCTURE :
1. Le plan doit être progressif (augmentation du volume/intensité) avec des semaines de récupération (assimilation) toutes les 3 ou 4 semaines.
2. La dernière semaine doit être une semaine d'affûtage (tapering) avant la course.
3. Si blessure signalée, adapte drastiquement (ex: remplacer course par repos ou renforcement).
4. Le JSON retourné doit contenir un tableau 'weeks' avec EXACTEMENT {weeks} entrées.

SCHEMA JSON STRICT :
Utilise uniquement les types de séance : {types}.
Pour le champ 'day', utilise le format \"LUN 1\", \"MAR 1\" etc (Jour de la semaine + Numéro du jour dans le plan global ou juste le jour de la semaine).
",
        sex = form.sex,
        age = form.age,
        level = form.level,
        perf_value = form.perf_value,
        perf_kind = form.perf_kind.as_str(),
        goal_distance = form.goal_distance,
        goal_time = or_default(&form.goal_time, DEFAULT_GOAL_TIME),
        sessions = form.sessions_per_week,
        injuries = or_default(&form.injuries, NONE_REPORTED),
        unavailability = or_default(&form.unavailability, NONE_REPORTED),
    )
}

/// Schema of one session, shared with the coach tool declaration.
pub(crate) fn session_schema() -> Value {
    let types: Vec<&str> = SessionType::ALL.iter().map(|t| t.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "id": {"type": "STRING"},
            "day": {"type": "STRING"},
            "type": {"type": "STRING", "enum": types},
            "title": {"type": "STRING"},
            "description": {"type": "STRING"},
            "distance": {"type": "STRING"},
            "duration": {"type": "STRING"},
            "details": {
                "type": "OBJECT",
                "properties": {
                    "warmup": {"type": "STRING"},
                    "main": {"type": "STRING"},
                    "cooldown": {"type": "STRING"}
                }
            }
        }
    })
}

/// Response schema declared for generation.
pub fn program_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "goal": {"type": "STRING"},
            "level": {"type": "STRING"},
            "weeks": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "weekNumber": {"type": "INTEGER"},
                        "dates": {
                            "type": "STRING",
                            "description": "Ex: Semaine 1, ou date approximative"
                        },
                        "sessions": {"type": "ARRAY", "items": session_schema()}
                    }
                }
            }
        }
    })
}

/// Generates programs through a [`ModelClient`].
pub struct PlanGenerator<M> {
    client: M,
}

impl<M: ModelClient> PlanGenerator<M> {
    pub fn new(client: M) -> Self {
        Self { client }
    }

    /// Ask the model for a program and validate it, without saving.
    pub async fn draft(&self, form: &IntakeForm) -> Result<ProgramDocument> {
        form.validate()?;

        let request = ModelRequest::prompt(build_generation_prompt(form))
            .with_json_schema(program_response_schema());

        let text = match self.client.generate(&request).await? {
            ModelResponse::Text(text) => text,
            ModelResponse::FunctionCall { name, .. } => {
                return Err(RunflowError::invalid_output(
                    "$",
                    format!("expected JSON text, got a call to '{name}'"),
                ))
            }
        };

        let mut program = validate::program_from_model_text(&text, Timestamp::now())?;

        if program.goal.trim().is_empty() {
            program.goal = form.goal_distance.clone();
        }
        if program.level.trim().is_empty() {
            program.level = form.level.clone();
        }

        if program.weeks.len() != form.duration_weeks as usize {
            warn!(
                "Requested {} weeks, model returned {}",
                form.duration_weeks,
                program.weeks.len()
            );
        }

        Ok(program)
    }

    /// Generate a program and make it the current one.
    pub async fn generate(&self, store: &ProgramStore, form: &IntakeForm) -> Result<ProgramDocument> {
        let program = self.draft(form).await?;
        store.save(&program).await?;
        info!(
            "Generated program '{}' with {} weeks",
            program.goal,
            program.weeks.len()
        );
        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_form_and_defaults() {
        let form = IntakeForm {
            age: "34".to_string(),
            perf_value: "14.5".to_string(),
            duration_weeks: 12,
            ..IntakeForm::default()
        };

        let prompt = build_generation_prompt(&form);
        assert!(prompt.contains("Homme, 34 ans"));
        assert!(prompt.contains("14.5 (vma)"));
        assert!(prompt.contains("12 semaines EXACTEMENT"));
        assert!(prompt.contains("EXACTEMENT 12 entrées"));
        assert!(prompt.contains("Chrono visé: Finir la course confortablement"));
        assert!(prompt.contains("Indisponibilités: Aucune"));
        assert!(prompt.contains("'run', 'rest', 'interval', 'long', 'test', 'recovery', 'tempo'"));
        assert!(prompt.contains("\"LUN 1\""));
    }

    #[test]
    fn test_prompt_uses_given_goal_time() {
        let form = IntakeForm {
            goal_time: Some("45:00".to_string()),
            injuries: Some("Tendinite".to_string()),
            ..IntakeForm::default()
        };
        let prompt = build_generation_prompt(&form);
        assert!(prompt.contains("Chrono visé: 45:00."));
        assert!(prompt.contains("strictement: Tendinite."));
    }

    #[test]
    fn test_schema_enumerates_session_types() {
        let schema = program_response_schema();
        let types = &schema["properties"]["weeks"]["items"]["properties"]["sessions"]["items"]
            ["properties"]["type"]["enum"];
        assert_eq!(types.as_array().unwrap().len(), 7);
    }

    #[test]
    fn test_zero_weeks_is_rejected() {
        let form = IntakeForm {
            duration_weeks: 0,
            ..IntakeForm::default()
        };
        assert!(form.validate().is_err());
    }
}
