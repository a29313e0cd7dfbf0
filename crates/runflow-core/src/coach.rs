//! Coach dialogue.
//!
//! A [`CoachSession`] keeps the conversation with the model, gives it the
//! current week as context and lets it rewrite that week through the
//! `update_week_schedule` tool. The transcript is persisted through the store,
//! so successive sessions continue the same conversation.
//!
//! A turn moves through [`CoachState`]:
//!
//! ```text
//! Idle ──send──▶ AwaitingResponse ──text──────────────────▶ Idle
//!                        │
//!                        └──tool call──▶ ApplyingUpdate ──▶ Idle
//! ```
//!
//! Any failure during a turn (network, model error, invalid arguments)
//! appends a fixed apology and returns to `Idle`; nothing is written to the
//! program in that case.

use std::ops::{Deref, DerefMut};

use log::{debug, info, warn};
use serde_json::Value;

use crate::{
    error::{Result, RunflowError},
    generator::session_schema,
    llm::{FunctionDeclaration, ModelClient, ModelMessage, ModelRequest, ModelResponse},
    models::{ChatRole, ProgramDocument, Session, Transcript, UserProfile, WeeklyPlan},
    reconcile::MergePolicy,
    store::{ProgramStore, WeekUpdate},
    validate,
};

/// Name of the week rewrite tool declared to the model.
pub const UPDATE_WEEK_TOOL: &str = "update_week_schedule";

/// Reply appended when a turn fails.
pub const APOLOGY: &str =
    "Désolé, je n'ai pas réussi à accéder à ton programme. Vérifie ta connexion.";

const TEMPERATURE: f32 = 0.3;
const RECENT_SESSIONS: usize = 5;
const HIGH_RPE: u8 = 8;
const PAIN_WORDS: [&str; 5] = ["douleur", "douleurs", "mal", "gêne", "gene"];

/// Where a coach turn currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoachState {
    Idle,
    AwaitingResponse,
    ApplyingUpdate,
}

/// Outcome of one message to the coach.
#[derive(Debug, Clone)]
pub enum CoachReply {
    /// Plain text answer
    Text(String),
    /// The model rewrote a week
    Updated { message: String, update: WeekUpdate },
    /// The turn failed; the apology was appended
    Failed(String),
}

impl CoachReply {
    /// Text appended to the transcript for this reply.
    pub fn text(&self) -> &str {
        match self {
            CoachReply::Text(text) | CoachReply::Failed(text) => text,
            CoachReply::Updated { message, .. } => message,
        }
    }
}

/// Declaration of the `update_week_schedule` tool.
pub fn update_week_tool() -> FunctionDeclaration {
    let mut session = session_schema();
    if let Some(props) = session["properties"].as_object_mut() {
        props.insert("completed".to_string(), serde_json::json!({"type": "BOOLEAN"}));
    }

    FunctionDeclaration {
        name: UPDATE_WEEK_TOOL.to_string(),
        description: "Updates the training schedule for a specific week. Call this tool IMMEDIATELY when the user asks to change, swap, move, or delete sessions.".to_string(),
        parameters: Some(serde_json::json!({
            "type": "OBJECT",
            "properties": {
                "weekNumber": {"type": "INTEGER", "description": "The week number to update."},
                "reason": {
                    "type": "STRING",
                    "description": "Short confirmation message for the user (e.g. 'J'ai déplacé la séance de mardi à jeudi')."
                },
                "sessions": {
                    "type": "ARRAY",
                    "description": "The FULL list of 7 sessions for the week (Lun-Dim). You must rewrite the entire week structure.",
                    "items": session
                }
            },
            "required": ["weekNumber", "sessions", "reason"]
        })),
    }
}

/// Whether feedback mentions pain.
fn mentions_pain(feedback: &str) -> bool {
    feedback
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| PAIN_WORDS.contains(&word))
}

/// Whether a completed session suggests the runner needs a lighter week.
fn was_hard(session: &Session) -> bool {
    session.rpe.is_some_and(|r| r >= HIGH_RPE)
        || session.feedback.as_deref().is_some_and(mentions_pain)
}

/// Opening message of a conversation.
pub fn greeting(profile: &UserProfile, program: Option<&ProgramDocument>) -> String {
    let mut text = format!(
        "Bonjour {} ! Je suis connecté à ton programme. Tu peux me demander de modifier tes séances (ex: \"décale la séance de demain\", \"allège ma semaine car je suis fatigué\", \"remplace la sortie longue par du repos\").",
        profile.display_name()
    );

    if let Some(last) = program.and_then(|p| p.completed_sessions().last()) {
        if was_hard(last) {
            text.push_str(&format!(
                " J'ai vu que ta dernière séance ({}) a été difficile. Veux-tu que j'allège ta semaine ?",
                last.title
            ));
        }
    }
    text
}

/// Summary lines of the most recent completed sessions, in program order.
pub fn recent_sessions_context(program: &ProgramDocument) -> Vec<String> {
    let completed: Vec<&Session> = program.completed_sessions().collect();
    let start = completed.len().saturating_sub(RECENT_SESSIONS);

    completed[start..]
        .iter()
        .map(|s| {
            let rpe = s
                .rpe
                .map(|r| r.to_string())
                .unwrap_or_else(|| "?".to_string());
            match s.feedback.as_deref().filter(|f| !f.trim().is_empty()) {
                Some(feedback) => {
                    format!("- {} : {} (RPE {rpe}/10) – \"{feedback}\"", s.day, s.title)
                }
                None => format!("- {} : {} (RPE {rpe}/10)", s.day, s.title),
            }
        })
        .collect()
}

/// System instruction for a turn.
pub fn system_instruction(
    profile: &UserProfile,
    program: Option<&ProgramDocument>,
    week: Option<&WeeklyPlan>,
) -> Result<String> {
    let mut text = format!(
        "Tu es un coach de course à pied expert.
L'utilisateur s'appelle {name}, niveau {level}.

TÂCHE PRINCIPALE :
Tu as un ACCÈS TOTAL en écriture au programme via l'outil '{UPDATE_WEEK_TOOL}'.
Si l'utilisateur exprime une douleur, une indisponibilité, ou une envie de changer son emploi du temps, tu DOIS utiliser l'outil '{UPDATE_WEEK_TOOL}' pour modifier le JSON de la semaine.

RÈGLES :
1. Ne demande pas \"Voulez-vous que je le change ?\". Fais-le et confirme ensuite.
2. Lors de la mise à jour, réécris les 7 jours de la semaine pour garder la structure intacte.
3. Garde les IDs des sessions existantes si tu ne fais que les déplacer.
",
        name = profile.display_name(),
        level = profile.level,
    );

    if let Some(program) = program {
        let recent = recent_sessions_context(program);
        if !recent.is_empty() {
            text.push_str("\nDERNIÈRES SÉANCES RÉALISÉES :\n");
            text.push_str(&recent.join("\n"));
            text.push('\n');
        }
    }

    match week {
        Some(week) => {
            text.push_str(&format!(
                "\nPROGRAMME ACTUEL (Semaine {}) :\n{}\n\nUtilise ces données comme base pour tes modifications.\n",
                week.week_number,
                serde_json::to_string(week)?
            ));
        }
        None => text.push_str(
            "\nAucun programme n'est actif. Invite l'utilisateur à en créer un avec la commande 'runflow generate'.\n",
        ),
    }

    Ok(text)
}

/// Holds a session for the length of one turn.
///
/// Dropping the guard puts the session back to `Idle`, also when the `send`
/// future is dropped mid-turn. A message that never got an answer is taken
/// out of the transcript again.
struct TurnGuard<'s, 'a, M> {
    session: &'s mut CoachSession<'a, M>,
    transcript_len: usize,
    answered: bool,
}

impl<'s, 'a, M> TurnGuard<'s, 'a, M> {
    fn begin(session: &'s mut CoachSession<'a, M>) -> Self {
        session.state = CoachState::AwaitingResponse;
        let transcript_len = session.transcript.len();
        Self {
            session,
            transcript_len,
            answered: false,
        }
    }
}

impl<'a, M> Deref for TurnGuard<'_, 'a, M> {
    type Target = CoachSession<'a, M>;

    fn deref(&self) -> &Self::Target {
        self.session
    }
}

impl<M> DerefMut for TurnGuard<'_, '_, M> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session
    }
}

impl<M> Drop for TurnGuard<'_, '_, M> {
    fn drop(&mut self) {
        if !self.answered {
            debug!("Coach turn cancelled before an answer");
            self.session.transcript.truncate(self.transcript_len);
        }
        self.session.state = CoachState::Idle;
    }
}

/// A conversation with the coach.
pub struct CoachSession<'a, M> {
    client: M,
    store: &'a ProgramStore,
    profile: UserProfile,
    transcript: Transcript,
    state: CoachState,
    week_index: usize,
    policy: MergePolicy,
}

impl<'a, M: ModelClient> CoachSession<'a, M> {
    /// Resume the stored conversation, greeting the runner if it is new.
    pub async fn open(client: M, store: &'a ProgramStore) -> Result<Self> {
        let profile = store.load_profile().await?;
        let transcript = store.load_transcript().await?;

        let mut session = Self {
            client,
            store,
            profile,
            transcript,
            state: CoachState::Idle,
            week_index: 0,
            policy: MergePolicy::default(),
        };

        if session.transcript.is_empty() {
            session.greet().await?;
        }
        Ok(session)
    }

    /// Week (0-based) given to the model as context and used when the model
    /// names a week that does not exist.
    pub fn with_week(mut self, week_index: usize) -> Self {
        self.week_index = week_index;
        self
    }

    pub fn with_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> CoachState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Forget the conversation and start over with a fresh greeting.
    pub async fn reset(&mut self) -> Result<()> {
        self.store.clear_transcript().await?;
        self.transcript = Transcript::new();
        self.greet().await
    }

    async fn greet(&mut self) -> Result<()> {
        let program = self.store.load().await?;
        self.transcript
            .push(ChatRole::Model, greeting(&self.profile, program.as_ref()));
        self.store.save_transcript(&self.transcript).await
    }

    /// Send a message and apply the model's answer.
    ///
    /// # Errors
    ///
    /// Returns `RunflowError::CoachBusy` when a turn is already running and
    /// `RunflowError::InvalidInput` for an empty message. Model failures are
    /// not errors: they produce [`CoachReply::Failed`].
    pub async fn send(&mut self, text: &str) -> Result<CoachReply> {
        if self.state != CoachState::Idle {
            return Err(RunflowError::CoachBusy);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(RunflowError::invalid_input("message").with_reason("Message is empty"));
        }

        let mut turn = TurnGuard::begin(self);
        turn.transcript.push(ChatRole::User, text);

        let reply = match turn.run_turn().await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Coach turn failed: {e}");
                CoachReply::Failed(APOLOGY.to_string())
            }
        };

        turn.transcript.push(ChatRole::Model, reply.text());
        turn.answered = true;
        drop(turn);

        self.store.save_transcript(&self.transcript).await?;
        Ok(reply)
    }

    async fn run_turn(&mut self) -> Result<CoachReply> {
        let program = self.store.load().await?;
        let week = program.as_ref().and_then(|p| p.week(self.week_index));

        let request = ModelRequest {
            system_instruction: Some(system_instruction(&self.profile, program.as_ref(), week)?),
            contents: self
                .transcript
                .messages()
                .iter()
                .map(|m| ModelMessage {
                    role: m.role,
                    text: m.text.clone(),
                })
                .collect(),
            tools: vec![update_week_tool()],
            ..ModelRequest::default()
        }
        .with_temperature(TEMPERATURE);

        match self.client.generate(&request).await? {
            ModelResponse::Text(text) => Ok(CoachReply::Text(text)),
            ModelResponse::FunctionCall { name, args } if name == UPDATE_WEEK_TOOL => {
                self.state = CoachState::ApplyingUpdate;
                self.apply_week_update(program.is_some(), &args).await
            }
            ModelResponse::FunctionCall { name, .. } => Err(RunflowError::invalid_output(
                "functionCall.name",
                format!("unknown tool '{name}'"),
            )),
        }
    }

    async fn apply_week_update(&self, has_program: bool, args: &Value) -> Result<CoachReply> {
        if !has_program {
            return Err(RunflowError::ProgramNotFound);
        }
        let rewrite = validate::week_rewrite_from_args(args)?;
        debug!(
            "Applying week rewrite (week {:?}, {} sessions)",
            rewrite.week_number,
            rewrite.sessions.len()
        );

        let update = self
            .store
            .replace_week_sessions(
                rewrite.week_number,
                self.week_index,
                rewrite.sessions,
                self.policy,
            )
            .await?;

        info!("Coach rewrote week {}: {}", update.week_number, rewrite.reason);
        Ok(CoachReply::Updated {
            message: format!("✅ {}", rewrite.reason),
            update,
        })
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::SessionType;

    fn program_with(sessions: Vec<Session>) -> ProgramDocument {
        ProgramDocument {
            goal: "10 km".to_string(),
            level: "Intermédiaire".to_string(),
            created_at: Timestamp::UNIX_EPOCH,
            weeks: vec![WeeklyPlan {
                week_number: 1,
                dates: "Semaine 1".to_string(),
                sessions,
            }],
        }
    }

    fn done(id: &str, rpe: Option<u8>, feedback: Option<&str>) -> Session {
        let mut s = Session::new(id, format!("J{id}"), SessionType::Run, format!("Séance {id}"));
        s.completed = Some(true);
        s.rpe = rpe;
        s.feedback = feedback.map(str::to_string);
        s
    }

    #[test]
    fn test_greeting_offers_lighter_week_after_hard_session() {
        let profile = UserProfile::default();

        let easy = program_with(vec![done("1", Some(5), Some("Normal"))]);
        assert!(!greeting(&profile, Some(&easy)).contains("allège ta semaine ?"));

        let hard = program_with(vec![done("1", Some(9), None)]);
        assert!(greeting(&profile, Some(&hard)).contains("allège ta semaine ?"));

        let painful = program_with(vec![done("1", Some(4), Some("Un peu mal au genou"))]);
        assert!(greeting(&profile, Some(&painful)).contains("(Séance 1)"));

        assert!(greeting(&profile, None).starts_with("Bonjour Coureur !"));
    }

    #[test]
    fn test_recent_context_keeps_last_five() {
        let sessions = (1..=7)
            .map(|i| done(&i.to_string(), Some(i as u8), Some("ok")))
            .collect();
        let lines = recent_sessions_context(&program_with(sessions));

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "- J3 : Séance 3 (RPE 3/10) – \"ok\"");
        assert_eq!(lines[4], "- J7 : Séance 7 (RPE 7/10) – \"ok\"");
    }

    #[test]
    fn test_system_instruction_embeds_week_or_invitation() {
        let profile = UserProfile::default();
        let program = program_with(vec![done("1", None, None)]);

        let text = system_instruction(&profile, Some(&program), program.week(0)).unwrap();
        assert!(text.contains("PROGRAMME ACTUEL (Semaine 1) :"));
        assert!(text.contains("\"weekNumber\":1"));
        assert!(text.contains("- J1 : Séance 1 (RPE ?/10)"));

        let text = system_instruction(&profile, None, None).unwrap();
        assert!(text.contains("Aucun programme n'est actif."));
    }

    #[test]
    fn test_tool_declaration() {
        let tool = update_week_tool();
        let params = tool.parameters.unwrap();
        assert_eq!(tool.name, "update_week_schedule");
        assert_eq!(params["required"], serde_json::json!(["weekNumber", "sessions", "reason"]));
        assert_eq!(
            params["properties"]["sessions"]["items"]["properties"]["completed"]["type"],
            "BOOLEAN"
        );
    }
}
