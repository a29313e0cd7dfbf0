mod common;

use std::sync::Mutex;

use async_trait::async_trait;
use common::{create_test_store, sample_program, ScriptedClient};
use runflow_core::{
    coach::{APOLOGY, UPDATE_WEEK_TOOL},
    llm::{ModelClient, ModelRequest, ModelResponse},
    models::ChatRole,
    params::ToggleSession,
    CoachReply, CoachSession, CoachState, Result, RunflowError,
};
use serde_json::json;
use tokio::sync::oneshot;

/// Client whose first call never returns; later calls answer with text.
struct StallingClient {
    entered: Mutex<Option<oneshot::Sender<()>>>,
}

#[async_trait]
impl ModelClient for StallingClient {
    async fn generate(&self, _request: &ModelRequest) -> Result<ModelResponse> {
        let first_call = self.entered.lock().unwrap().take();
        if let Some(entered) = first_call {
            let _ = entered.send(());
            std::future::pending::<()>().await;
        }
        Ok(ModelResponse::Text("Reprenons.".to_string()))
    }
}

fn week_bodies(program: &runflow_core::ProgramDocument) -> Vec<String> {
    program
        .weeks
        .iter()
        .map(|w| serde_json::to_string(w).unwrap())
        .collect()
}

#[tokio::test]
async fn test_opening_greets_once() {
    let (_temp_dir, store) = create_test_store().await;

    let coach = CoachSession::open(ScriptedClient::new(vec![]), &store)
        .await
        .unwrap();
    assert_eq!(coach.transcript().len(), 1);
    assert!(coach.transcript().messages()[0].text.starts_with("Bonjour Coureur !"));

    let coach = CoachSession::open(ScriptedClient::new(vec![]), &store)
        .await
        .unwrap();
    assert_eq!(coach.transcript().len(), 1);
}

#[tokio::test]
async fn test_greeting_after_hard_session() {
    let (_temp_dir, store) = create_test_store().await;
    store.save(&sample_program(1)).await.unwrap();
    store
        .toggle_completion(&ToggleSession {
            week: 1,
            session_id: "w0-s3".to_string(),
            rpe: Some(9),
            feedback: None,
        })
        .await
        .unwrap();

    let coach = CoachSession::open(ScriptedClient::new(vec![]), &store)
        .await
        .unwrap();
    let greeting = &coach.transcript().messages()[0].text;
    assert!(greeting.contains("Fractionné 10x400"));
    assert!(greeting.contains("allège ta semaine ?"));
}

#[tokio::test]
async fn test_text_reply_is_appended() {
    let (_temp_dir, store) = create_test_store().await;
    store.save(&sample_program(2)).await.unwrap();
    let client = ScriptedClient::new(vec![Ok(ModelResponse::Text(
        "Pense à bien t'hydrater.".to_string(),
    ))]);

    let mut coach = CoachSession::open(client.clone(), &store).await.unwrap();
    let reply = coach.send("Un conseil pour demain ?").await.unwrap();

    assert!(matches!(reply, CoachReply::Text(_)));
    assert_eq!(coach.state(), CoachState::Idle);
    let last = coach.transcript().last().unwrap();
    assert_eq!(last.role, ChatRole::Model);
    assert_eq!(last.text, "Pense à bien t'hydrater.");

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.temperature, Some(0.3));
    assert_eq!(request.tools[0].name, UPDATE_WEEK_TOOL);
    assert_eq!(request.contents.len(), 2);
    assert_eq!(request.contents[1].role, ChatRole::User);
    assert!(request
        .system_instruction
        .as_deref()
        .unwrap()
        .contains("PROGRAMME ACTUEL (Semaine 1)"));

    // The conversation survives a new session
    let coach = CoachSession::open(ScriptedClient::new(vec![]), &store)
        .await
        .unwrap();
    assert_eq!(coach.transcript().len(), 3);
}

#[tokio::test]
async fn test_tool_call_rewrites_only_the_named_week() {
    let (_temp_dir, store) = create_test_store().await;
    store.save(&sample_program(4)).await.unwrap();
    store
        .toggle_completion(&ToggleSession {
            week: 2,
            session_id: "w1-s1".to_string(),
            rpe: Some(6),
            feedback: Some("Facile".to_string()),
        })
        .await
        .unwrap();
    let before = store.load().await.unwrap().unwrap();

    // Swap Tuesday and Wednesday of week 2; the model omits completion fields
    let mut sessions: Vec<serde_json::Value> = before.weeks[1]
        .sessions
        .iter()
        .map(|s| {
            json!({
                "id": s.id,
                "day": s.day,
                "type": s.kind.as_str(),
                "title": s.title,
                "distance": s.distance,
                "duration": s.duration,
            })
        })
        .collect();
    sessions.swap(1, 2);

    let client = ScriptedClient::new(vec![Ok(ModelResponse::FunctionCall {
        name: UPDATE_WEEK_TOOL.to_string(),
        args: json!({
            "weekNumber": 2,
            "reason": "J'ai décalé ton footing à mercredi",
            "sessions": sessions,
        }),
    })]);

    let mut coach = CoachSession::open(client, &store)
        .await
        .unwrap()
        .with_week(1);
    let mut events = store.subscribe();
    let reply = coach.send("Décale mon footing de mardi").await.unwrap();

    match &reply {
        CoachReply::Updated { message, update } => {
            assert_eq!(message, "✅ J'ai décalé ton footing à mercredi");
            assert_eq!(update.week_index, 1);
        }
        other => panic!("Expected an update, got {other:?}"),
    }
    assert!(events.try_recv().is_ok());
    assert_eq!(coach.state(), CoachState::Idle);

    let after = store.load().await.unwrap().unwrap();
    let (old, new) = (week_bodies(&before), week_bodies(&after));
    assert_eq!(old[0], new[0]);
    assert_eq!(old[2], new[2]);
    assert_eq!(old[3], new[3]);
    assert_ne!(old[1], new[1]);

    let footing = &after.weeks[1].sessions[2];
    assert_eq!(footing.id, "w1-s1");
    assert!(footing.is_completed());
    assert_eq!(footing.feedback.as_deref(), Some("Facile"));
}

#[tokio::test]
async fn test_failures_leave_program_untouched() {
    let (_temp_dir, store) = create_test_store().await;
    store.save(&sample_program(2)).await.unwrap();
    let version = store.load_versioned().await.unwrap().unwrap().version;

    let client = ScriptedClient::new(vec![
        Err(RunflowError::model("connection reset")),
        Ok(ModelResponse::FunctionCall {
            name: UPDATE_WEEK_TOOL.to_string(),
            args: json!({"weekNumber": 1, "reason": "Semaine allégée", "sessions": []}),
        }),
        Ok(ModelResponse::FunctionCall {
            name: "delete_everything".to_string(),
            args: json!({}),
        }),
    ]);

    let mut coach = CoachSession::open(client, &store).await.unwrap();
    for message in ["Salut", "Allège ma semaine", "Supprime tout"] {
        let reply = coach.send(message).await.unwrap();
        assert!(matches!(reply, CoachReply::Failed(_)));
        assert_eq!(coach.transcript().last().unwrap().text, APOLOGY);
        assert_eq!(coach.state(), CoachState::Idle);
    }

    assert_eq!(store.load_versioned().await.unwrap().unwrap().version, version);
}

#[tokio::test]
async fn test_tool_call_without_program() {
    let (_temp_dir, store) = create_test_store().await;
    let client = ScriptedClient::new(vec![Ok(ModelResponse::FunctionCall {
        name: UPDATE_WEEK_TOOL.to_string(),
        args: json!({
            "weekNumber": 1,
            "reason": "ok",
            "sessions": [{"type": "rest", "day": "LUN 1"}],
        }),
    })]);

    let mut coach = CoachSession::open(client.clone(), &store).await.unwrap();
    let reply = coach.send("Mets du repos lundi").await.unwrap();

    assert_eq!(reply.text(), APOLOGY);
    assert!(store.load().await.unwrap().is_none());
    assert!(client.requests()[0]
        .system_instruction
        .as_deref()
        .unwrap()
        .contains("Aucun programme n'est actif."));
}

#[tokio::test]
async fn test_empty_message_and_reset() {
    let (_temp_dir, store) = create_test_store().await;
    let client = ScriptedClient::new(vec![Ok(ModelResponse::Text("D'accord".to_string()))]);

    let mut coach = CoachSession::open(client, &store).await.unwrap();
    assert!(matches!(
        coach.send("   ").await,
        Err(RunflowError::InvalidInput { .. })
    ));
    assert_eq!(coach.transcript().len(), 1);

    coach.send("Merci").await.unwrap();
    assert_eq!(coach.transcript().len(), 3);

    coach.reset().await.unwrap();
    assert_eq!(coach.transcript().len(), 1);
    assert_eq!(store.load_transcript().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_cancelled_turn_returns_to_idle() {
    let (_temp_dir, store) = create_test_store().await;
    let (entered_tx, entered_rx) = oneshot::channel();
    let client = StallingClient {
        entered: Mutex::new(Some(entered_tx)),
    };

    let mut coach = CoachSession::open(client, &store).await.unwrap();

    tokio::select! {
        _ = coach.send("Tu es là ?") => panic!("the stalled turn must not finish"),
        _ = entered_rx => {}
    }

    assert_eq!(coach.state(), CoachState::Idle);
    // The unanswered message is not kept
    assert_eq!(coach.transcript().len(), 1);

    let reply = coach.send("Ça va ?").await.unwrap();
    assert_eq!(reply.text(), "Reprenons.");

    let texts: Vec<&str> = coach
        .transcript()
        .messages()
        .iter()
        .map(|m| m.text.as_str())
        .collect();
    assert_eq!(texts.len(), 3);
    assert_eq!(texts[1], "Ça va ?");
    assert_eq!(texts[2], "Reprenons.");
    assert_eq!(store.load_transcript().await.unwrap().len(), 3);
}
