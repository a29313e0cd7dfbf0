use runflow_core::{
    coach::update_week_tool,
    llm::{ModelClient, ModelMessage, ModelRequest, ModelResponse},
    GeminiClient, RunflowError,
};
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

const ENDPOINT: &str = "/models/gemini-2.5-flash:generateContent";

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new("test-key").with_base_url(server.uri())
}

#[tokio::test]
async fn test_text_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "Bonjour"}]}],
            "generation_config": {"temperature": 0.5}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Salut "}, {"text": "coureur !"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"totalTokenCount": 12}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ModelRequest::prompt("Bonjour").with_temperature(0.5);
    let response = client_for(&server).generate(&request).await.unwrap();
    assert_eq!(response, ModelResponse::Text("Salut coureur !".to_string()));
}

#[tokio::test]
async fn test_function_call_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_partial_json(json!({
            "system_instruction": {"parts": [{"text": "Tu es un coach."}]},
            "tools": [{"function_declarations": [{"name": "update_week_schedule"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "Je m'en occupe."},
                    {"functionCall": {"name": "update_week_schedule", "args": {"weekNumber": 3}}}
                ]}
            }]
        })))
        .mount(&server)
        .await;

    let request = ModelRequest {
        system_instruction: Some("Tu es un coach.".to_string()),
        contents: vec![
            ModelMessage::model("Bonjour !"),
            ModelMessage::user("Allège ma semaine"),
        ],
        tools: vec![update_week_tool()],
        ..ModelRequest::default()
    };

    match client_for(&server).generate(&request).await.unwrap() {
        ModelResponse::FunctionCall { name, args } => {
            assert_eq!(name, "update_week_schedule");
            assert_eq!(args["weekNumber"], 3);
        }
        other => panic!("Expected a function call, got {other:?}"),
    }
}

#[tokio::test]
async fn test_quota_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"code": 429, "message": "Quota exceeded. Please retry in 6.4s."}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate(&ModelRequest::prompt("Bonjour"))
        .await
        .unwrap_err();
    match err {
        RunflowError::Model { message } => {
            assert_eq!(message, "Model quota exceeded. Please try again in 7 seconds.")
        }
        other => panic!("Expected a model error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_candidates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate(&ModelRequest::prompt("Bonjour"))
        .await
        .unwrap_err();
    assert!(err.is_model_failure());
}
