//! Integration tests for HTTP handlers
#![allow(clippy::expect_used)]

use std::{
    collections::HashMap,
    io::Write,
    sync::{Arc, Mutex},
};

use application::{
    DeviceProbePort, EngineSettings, ModelLoaderPort, ModelRuntime,
    error::ApplicationError,
    ports::{GenerationRequest, InferencePort, InferenceResult},
};
use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use domain::Device;
use infrastructure::ConfigManager;
use presentation_http::{AppState, routes::create_router};
use serde_json::{Value, json};

/// Mock inference engine for testing
struct MockInference {
    reply: Option<String>,
    reachable: bool,
    prompts: Mutex<Vec<String>>,
}

impl MockInference {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            reachable: true,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            reachable: false,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            reachable: true,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log poisoned").clone()
    }
}

#[async_trait]
impl InferencePort for MockInference {
    async fn generate(&self, request: &GenerationRequest) -> Result<InferenceResult, ApplicationError> {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(request.prompt.clone());

        match &self.reply {
            Some(reply) => Ok(InferenceResult {
                content: reply.clone(),
                model: "mock-model".to_string(),
                tokens_used: Some(5),
                latency_ms: 10,
            }),
            None => Err(ApplicationError::Inference("model crashed".to_string())),
        }
    }

    async fn is_healthy(&self) -> bool {
        self.reachable
    }

    fn model_name(&self) -> String {
        "mock-model".to_string()
    }

    async fn clear_cache(&self) -> Result<(), ApplicationError> {
        Ok(())
    }
}

/// Loader handing out a prepared model
struct MockLoader {
    model: Arc<MockInference>,
}

#[async_trait]
impl ModelLoaderPort for MockLoader {
    async fn load(&self, _device: Device) -> Result<Arc<dyn InferencePort>, ApplicationError> {
        Ok(Arc::clone(&self.model) as Arc<dyn InferencePort>)
    }
}

/// Host with only a processor
struct CpuOnly;

impl DeviceProbePort for CpuOnly {
    fn is_available(&self, device: Device) -> bool {
        device == Device::Cpu
    }
}

fn test_config() -> Value {
    json!({
        "model": {"name": "mock-model", "temperature": 0.7},
        "api": {"port": 8000},
    })
}

async fn server_with_model(model: Arc<MockInference>) -> TestServer {
    let loader = MockLoader { model };
    let runtime = ModelRuntime::initialize(EngineSettings::default(), &loader, &CpuOnly).await;
    let state = AppState::new(Arc::new(runtime), 16, test_config());
    TestServer::new(create_router(state)).expect("Failed to create test server")
}

fn fallback_server() -> TestServer {
    let runtime = ModelRuntime::fallback(EngineSettings::default(), "model 'x' not found");
    let state = AppState::new(Arc::new(runtime), 16, test_config());
    TestServer::new(create_router(state)).expect("Failed to create test server")
}

// ============ Service Endpoint Tests ============

#[tokio::test]
async fn root_lists_endpoints() {
    let server = fallback_server();

    let response = server.get("/").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["version"].is_string());
    let endpoints = body["endpoints"].as_array().expect("endpoints array");
    assert!(endpoints.iter().any(|e| e == "POST /chat"));
}

#[tokio::test]
async fn health_reports_loaded_model() {
    let server = server_with_model(MockInference::replying("hi")).await;

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_status"], "loaded");
    assert_eq!(body["model_reachable"], true);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn health_reports_unreachable_model_server() {
    let server = server_with_model(MockInference::unreachable()).await;

    let body: Value = server.get("/health").await.json();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_status"], "loaded");
    assert_eq!(body["model_reachable"], false);
}

#[tokio::test]
async fn health_reports_fallback_mode() {
    let server = fallback_server();

    let body: Value = server.get("/health").await.json();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_status"], "fallback");
    assert_eq!(body["model_reachable"], false);
}

#[tokio::test]
async fn unknown_route_lists_endpoints() {
    let server = fallback_server();

    let response = server.get("/nope").await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["code"], "not_found");
    assert!(body["available_endpoints"].as_array().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn config_hides_privacy_section() {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("temp config");
    file.write_all(b"model:\n  name: mock-model\nprivacy:\n  retention_days: 30\n")
        .expect("write config");
    let config =
        ConfigManager::load_with_env(file.path(), HashMap::new()).expect("config loads");

    let runtime = ModelRuntime::fallback(EngineSettings::default(), "test");
    let state = AppState::new(Arc::new(runtime), 4, config.redacted());
    let server = TestServer::new(create_router(state)).expect("Failed to create test server");

    let body: Value = server.get("/config").await.json();

    assert!(body.get("privacy").is_none());
    assert_eq!(body["model"]["name"], "mock-model");
    assert_eq!(body["api"]["port"], 8000);
}

// ============ Chat Endpoint Tests ============

#[tokio::test]
async fn chat_returns_model_reply_and_session() {
    let server = server_with_model(MockInference::replying("Hello from the model")).await;

    let response = server.post("/chat").json(&json!({"message": "Hello"})).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["reply"], "Hello from the model");
    assert_eq!(body["source"], "model");
    assert!(body["session_id"].is_string());
    assert_eq!(body["model_info"]["status"], "loaded");
    assert_eq!(body["model_info"]["device"], "cpu");
}

#[tokio::test]
async fn session_carries_context_between_requests() {
    let model = MockInference::replying("Noted.");
    let server = server_with_model(Arc::clone(&model)).await;

    let first: Value = server
        .post("/chat")
        .json(&json!({"message": "My name is Ada"}))
        .await
        .json();
    let session_id = first["session_id"].as_str().expect("session id").to_string();

    let second = server
        .post("/chat")
        .json(&json!({"message": "What is my name?", "session_id": session_id}))
        .await;

    second.assert_status_ok();
    let body: Value = second.json();
    assert_eq!(body["session_id"], session_id.as_str());

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("User: My name is Ada\nAssistant: Noted.\n"));
}

#[tokio::test]
async fn separate_sessions_do_not_share_history() {
    let model = MockInference::replying("Noted.");
    let server = server_with_model(Arc::clone(&model)).await;

    server
        .post("/chat")
        .json(&json!({"message": "secret one"}))
        .await
        .assert_status_ok();
    server
        .post("/chat")
        .json(&json!({"message": "second conversation"}))
        .await
        .assert_status_ok();

    let prompts = model.prompts();
    assert!(!prompts[1].contains("secret one"));
}

#[tokio::test]
async fn stateless_request_uses_supplied_history() {
    let model = MockInference::replying("Tomorrow looks rainy.");
    let server = server_with_model(Arc::clone(&model)).await;

    let response = server
        .post("/chat")
        .json(&json!({
            "message": "And tomorrow?",
            "history": [
                {"role": "user", "content": "Weather today?"},
                {"role": "assistant", "content": "Sunny."}
            ]
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["session_id"].is_null());
    assert_eq!(body["reply"], "Tomorrow looks rainy.");
    assert!(model.prompts()[0].contains("User: Weather today?\nAssistant: Sunny.\n"));
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let server = fallback_server();

    let response = server.post("/chat").json(&json!({"message": "   "})).await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn malformed_session_id_is_rejected() {
    let server = fallback_server();

    let response = server
        .post("/chat")
        .json(&json!({"message": "hello", "session_id": "not-a-uuid"}))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn fallback_mode_answers_from_keyword_table() {
    let server = fallback_server();

    let response = server.post("/chat").json(&json!({"message": "hello there"})).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["source"], "fallback");
    assert!(body["reply"].as_str().is_some_and(|r| r.starts_with("Hello!")));
    assert_eq!(body["model_info"]["status"], "fallback");
    assert_eq!(body["model_info"]["model_name"], "none");
}

#[tokio::test]
async fn failed_generation_degrades_to_fallback_reply() {
    let server = server_with_model(MockInference::failing()).await;

    let response = server.post("/chat").json(&json!({"message": "what can you do"})).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["source"], "degraded");
    assert!(body["reply"].as_str().is_some_and(|r| !r.is_empty()));
}

// ============ Session Endpoint Tests ============

#[tokio::test]
async fn delete_session_resets_it() {
    let server = fallback_server();
    let body: Value = server.post("/chat").json(&json!({"message": "hi"})).await.json();
    let session_id = body["session_id"].as_str().expect("session id").to_string();

    server
        .delete(&format!("/sessions/{session_id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .delete(&format!("/sessions/{session_id}"))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn delete_session_with_bad_id_is_rejected() {
    let server = fallback_server();

    server.delete("/sessions/xyz").await.assert_status_bad_request();
}

// ============ Model Endpoint Tests ============

#[tokio::test]
async fn model_info_describes_loaded_model() {
    let server = server_with_model(MockInference::replying("hi")).await;

    let body: Value = server.get("/model/info").await.json();

    assert_eq!(body["status"], "loaded");
    assert_eq!(body["model_name"], "mock-model");
    assert_eq!(body["device"], "cpu");
}

#[tokio::test]
async fn model_info_in_fallback_mode_has_reason() {
    let server = fallback_server();

    let body: Value = server.get("/model/info").await.json();

    assert_eq!(body["status"], "fallback");
    assert!(body["reason"].as_str().is_some_and(|r| r.contains("not found")));
}

#[tokio::test]
async fn clear_cache_on_processor_is_a_no_op() {
    let server = server_with_model(MockInference::replying("hi")).await;

    let response = server.post("/model/clear-cache").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["cleared"], false);
}
