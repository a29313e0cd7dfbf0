//! Coach transcript persistence for the ProgramStore.

use log::warn;

use super::ProgramStore;
use crate::{
    db::TRANSCRIPT_KEY,
    error::Result,
    models::Transcript,
};

impl ProgramStore {
    /// Loads the coach transcript; unreadable transcripts read as empty.
    pub async fn load_transcript(&self) -> Result<Transcript> {
        let body = self
            .with_db(|db| Ok(db.get_document(TRANSCRIPT_KEY)?.and_then(|d| d.body)))
            .await?;

        Ok(match body {
            Some(body) => serde_json::from_str(&body).unwrap_or_else(|e| {
                warn!("Stored transcript is unreadable, starting over: {e}");
                Transcript::new()
            }),
            None => Transcript::new(),
        })
    }

    /// Persists the coach transcript.
    pub async fn save_transcript(&self, transcript: &Transcript) -> Result<()> {
        let body = serde_json::to_string(transcript)?;
        self.with_db(move |db| db.put_document(TRANSCRIPT_KEY, &body))
            .await?;
        Ok(())
    }

    /// Deletes the coach transcript.
    pub async fn clear_transcript(&self) -> Result<()> {
        self.with_db(|db| db.clear_document(TRANSCRIPT_KEY)).await?;
        Ok(())
    }
}
