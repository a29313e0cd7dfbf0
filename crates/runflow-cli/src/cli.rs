//! Command handlers for the terminal front end.
//!
//! Each handler calls the store (or the coach and generator), wraps the
//! outcome in a display type from `runflow_core::display` and hands the
//! Markdown to the [`TerminalRenderer`].

use std::io::Write;

use anyhow::{bail, Context, Result};
use log::{debug, info};
use runflow_core::{
    coach::CoachReply,
    display::{CreateResult, DeleteResult, OperationStatus, Shoes, UpdateResult},
    generator::GENERATION_FAILED_MESSAGE,
    params::{History, SessionRef, WeekRef},
    CoachSession, GeminiClient, PlanGenerator, ProgramStore, RunflowError,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    args::{
        ClearArgs, CoachArgs, GearCommands, GenerateArgs, ImportArgs, ProfileCommands,
        ProgramCommands, SessionCommands,
    },
    renderer::TerminalRenderer,
};

const EXIT_WORDS: [&str; 3] = ["exit", "quit", ":q"];

/// CLI handler holding the store and the renderer.
pub struct Cli {
    store: ProgramStore,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(store: ProgramStore, renderer: TerminalRenderer) -> Self {
        Self { store, renderer }
    }

    /// Landing view: summary, next session and current week.
    pub async fn dashboard(&self) -> Result<()> {
        let dashboard = self
            .store
            .dashboard()
            .await
            .context("Failed to load dashboard")?;
        self.renderer.render(&dashboard.to_string())
    }

    pub async fn handle_program_command(&self, command: ProgramCommands) -> Result<()> {
        match command {
            ProgramCommands::Show => {
                let program = self
                    .store
                    .load()
                    .await?
                    .ok_or(RunflowError::ProgramNotFound)?;
                self.renderer.render(&program.to_string())
            }
            ProgramCommands::Week(args) => {
                let view = self
                    .store
                    .show_week(&WeekRef::from(args))
                    .await
                    .context("Failed to show week")?;
                self.renderer.render(&view.to_string())
            }
            ProgramCommands::Summary => {
                let summary = self.store.summary().await?;
                self.renderer.render(&summary.to_string())
            }
            ProgramCommands::Import(args) => self.import_program(args).await,
            ProgramCommands::Export => {
                let program = self
                    .store
                    .load()
                    .await?
                    .ok_or(RunflowError::ProgramNotFound)?;
                // Raw JSON, never styled
                println!("{}", serde_json::to_string_pretty(&program)?);
                Ok(())
            }
            ProgramCommands::Clear(args) => self.clear_program(args).await,
        }
    }

    async fn import_program(&self, args: ImportArgs) -> Result<()> {
        let json = std::fs::read_to_string(&args.file)
            .with_context(|| format!("Failed to read {}", args.file.display()))?;
        let program = self
            .store
            .import_program(&json)
            .await
            .context("Failed to import program")?;
        self.renderer
            .render(&CreateResult::new(program).to_string())
    }

    async fn clear_program(&self, args: ClearArgs) -> Result<()> {
        if !args.confirm {
            bail!("Deleting the program requires --confirm");
        }
        let status = if self.store.clear_program().await? {
            OperationStatus::success("Programme supprimé")
        } else {
            OperationStatus::failure("Aucun programme à supprimer")
        };
        self.renderer.render(&status.to_string())
    }

    pub async fn handle_session_command(&self, command: SessionCommands) -> Result<()> {
        match command {
            SessionCommands::Show(args) => {
                let session = self
                    .store
                    .show_session(&SessionRef::from(args))
                    .await
                    .context("Failed to show session")?;
                self.renderer.render(&session.to_string())
            }
            SessionCommands::Toggle(args) => {
                let result = self
                    .store
                    .toggle_session_result(&args.into())
                    .await
                    .context("Failed to toggle session")?;
                self.renderer.render(&result.to_string())
            }
            SessionCommands::Load(args) => {
                let report = self
                    .store
                    .training_load(&args.into())
                    .await
                    .context("Failed to compute training load")?;
                self.renderer.render(&report.to_string())
            }
        }
    }

    pub async fn history(&self, params: History) -> Result<()> {
        let history = self.store.history(&params).await?;
        self.renderer.render(&history.to_string())
    }

    pub async fn generate(&self, args: GenerateArgs) -> Result<()> {
        let client = GeminiClient::from_env().context("Model client is not configured")?;
        info!("Generating a {}-week program with {}", args.weeks, client.model());

        let program = PlanGenerator::new(client)
            .generate(&self.store, &args.into())
            .await
            .context(GENERATION_FAILED_MESSAGE)?;

        self.renderer
            .render(&CreateResult::new(program).to_string())
    }

    pub async fn coach(&self, args: CoachArgs) -> Result<()> {
        let client = GeminiClient::from_env().context("Model client is not configured")?;
        let mut session = CoachSession::open(client, &self.store)
            .await
            .context("Failed to open coach session")?
            .with_week(args.week_index())
            .with_policy(args.policy());

        if args.reset {
            session.reset().await?;
        }

        if let Some(message) = args.message {
            let reply = session.send(&message).await?;
            return self.render_reply(&reply);
        }

        self.renderer.render(&session.transcript().to_string())?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if EXIT_WORDS.contains(&line) {
                break;
            }

            let reply = session.send(line).await?;
            self.render_reply(&reply)?;
        }

        debug!("Coach conversation ended");
        Ok(())
    }

    fn render_reply(&self, reply: &CoachReply) -> Result<()> {
        self.renderer.render(&format!("**Coach**: {}\n", reply.text()))?;
        if let CoachReply::Updated { update, .. } = reply {
            self.renderer.render(&format!("\n{update}"))?;
        }
        Ok(())
    }

    pub async fn handle_profile_command(&self, command: ProfileCommands) -> Result<()> {
        match command {
            ProfileCommands::Show => {
                let profile = self.store.load_profile().await?;
                self.renderer.render(&profile.to_string())
            }
            ProfileCommands::Set(args) => {
                let mut changes = Vec::new();
                if let Some(name) = &args.name {
                    changes.push(format!("Nom: {name}"));
                }
                if let Some(level) = &args.level {
                    changes.push(format!("Niveau: {level}"));
                }
                if let Some(vma) = args.vma {
                    changes.push(format!("VMA: {vma:.1} km/h"));
                }

                let profile = self
                    .store
                    .update_profile(&args.into())
                    .await
                    .context("Failed to update profile")?;
                self.renderer
                    .render(&UpdateResult::with_changes(profile, changes).to_string())
            }
            ProfileCommands::EstimateVma(args) => {
                let estimate = self
                    .store
                    .estimate_vma(args.distance_km, &args.time, args.save)
                    .await?;
                self.renderer.render(&estimate.to_string())
            }
        }
    }

    pub async fn handle_gear_command(&self, command: GearCommands) -> Result<()> {
        match command {
            GearCommands::List => {
                let shoes = Shoes(self.store.list_shoes().await?);
                self.renderer.render(&shoes.to_string())
            }
            GearCommands::Add(args) => {
                let shoe = self
                    .store
                    .add_shoe(&args.into())
                    .await
                    .context("Failed to add shoe")?;
                self.renderer.render(&CreateResult::new(shoe).to_string())
            }
            GearCommands::Remove { id } => {
                let shoe = self.store.remove_shoe(&id).await?;
                self.renderer.render(&DeleteResult::new(shoe).to_string())
            }
            GearCommands::Log(args) => {
                let km = args.km;
                let shoe = self
                    .store
                    .log_shoe_distance(&args.into())
                    .await
                    .context("Failed to log distance")?;
                self.renderer.render(
                    &UpdateResult::with_changes(shoe, vec![format!("+{km:.1} km")]).to_string(),
                )
            }
        }
    }
}
