//! Runner profile operations for the ProgramStore.

use log::warn;

use super::ProgramStore;
use crate::{
    db::{Database, PROFILE_KEY},
    error::{Result, RunflowError},
    models::UserProfile,
    params::UpdateProfile,
};

fn read_profile(db: &Database) -> Result<UserProfile> {
    let body = db.get_document(PROFILE_KEY)?.and_then(|d| d.body);
    Ok(match body {
        Some(body) => serde_json::from_str(&body).unwrap_or_else(|e| {
            warn!("Stored profile is unreadable, using defaults: {e}");
            UserProfile::default()
        }),
        None => UserProfile::default(),
    })
}

impl ProgramStore {
    /// Loads the runner profile, falling back to the default profile.
    pub async fn load_profile(&self) -> Result<UserProfile> {
        self.with_db(|db| read_profile(db)).await
    }

    /// Persists the runner profile.
    pub async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        let body = serde_json::to_string(profile)?;
        self.with_db(move |db| db.put_document(PROFILE_KEY, &body))
            .await?;
        Ok(())
    }

    /// Applies the given fields to the stored profile.
    pub async fn update_profile(&self, params: &UpdateProfile) -> Result<UserProfile> {
        if let Some(vma) = params.vma {
            if !vma.is_finite() || vma <= 0.0 {
                return Err(RunflowError::invalid_input("vma")
                    .with_reason("VMA must be a positive speed in km/h"));
            }
        }

        let mut profile = self.load_profile().await?;
        if let Some(name) = &params.name {
            profile.name = name.clone();
        }
        if let Some(level) = &params.level {
            profile.level = level.clone();
        }
        if params.vma.is_some() {
            profile.vma = params.vma;
        }

        self.save_profile(&profile).await?;
        Ok(profile)
    }
}
