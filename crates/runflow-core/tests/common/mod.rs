#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use jiff::Timestamp;
use runflow_core::{
    llm::{ModelClient, ModelRequest, ModelResponse},
    models::{ProgramDocument, Session, SessionType, WeeklyPlan},
    ProgramStore, Result, RunflowError, StoreBuilder,
};
use tempfile::TempDir;

/// Helper function to create a test store
pub async fn create_test_store() -> (TempDir, ProgramStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let store = StoreBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create store");
    (temp_dir, store)
}

const DAYS: [&str; 7] = ["LUN", "MAR", "MER", "JEU", "VEN", "SAM", "DIM"];

/// One week of seven sessions with `w{week}-s{day}` ids.
pub fn sample_week(week_index: usize) -> WeeklyPlan {
    let sessions = DAYS
        .iter()
        .enumerate()
        .map(|(d, day)| {
            let (kind, title) = match d {
                1 => (SessionType::Run, "Footing"),
                3 => (SessionType::Interval, "Fractionné 10x400"),
                6 => (SessionType::Long, "Sortie longue"),
                _ => (SessionType::Rest, "Repos"),
            };
            let mut session = Session::new(
                format!("w{week_index}-s{d}"),
                format!("{day} {}", week_index * 7 + d + 1),
                kind,
                title,
            );
            if kind != SessionType::Rest {
                session.distance = Some(format!("{} km", 6 + d));
                session.duration = Some("45".to_string());
            }
            session
        })
        .collect();

    WeeklyPlan {
        week_number: week_index as u32 + 1,
        dates: format!("Semaine {}", week_index + 1),
        sessions,
    }
}

/// A program of `weeks` sample weeks.
pub fn sample_program(weeks: usize) -> ProgramDocument {
    ProgramDocument {
        goal: "10 km en 50:00".to_string(),
        level: "Intermédiaire".to_string(),
        created_at: Timestamp::UNIX_EPOCH,
        weeks: (0..weeks).map(sample_week).collect(),
    }
}

/// Model client answering from a queue and recording every request.
#[derive(Default)]
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<ModelResponse>>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<Result<ModelResponse>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RunflowError::model("no scripted response left")))
    }
}
