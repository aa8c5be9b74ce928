//! Integration tests for the Ollama inference engine using WireMock
//!
//! These tests mock the Ollama HTTP API to verify client behavior without
//! requiring an actual model server.

use ai_core::{InferenceConfig, InferenceEngine, InferenceError, InferenceRequest, OllamaInferenceEngine};
use domain::Device;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

// =============================================================================
// Test Helpers
// =============================================================================

fn config_for_mock(base_url: &str) -> InferenceConfig {
    InferenceConfig {
        base_url: base_url.to_string(),
        model: "test-model".to_string(),
        timeout_ms: 5000,
        max_new_tokens: 64,
        max_length: 512,
        temperature: 0.7,
        top_p: 0.9,
        do_sample: true,
        keep_alive: "5m".to_string(),
    }
}

fn engine_for(server: &MockServer) -> OllamaInferenceEngine {
    OllamaInferenceEngine::new(config_for_mock(&server.uri())).expect("Failed to create engine")
}

/// Sample Ollama generate success response
fn generate_success_response() -> serde_json::Value {
    serde_json::json!({
        "model": "test-model",
        "response": "  Hello! How can I help you today?\n",
        "done": true,
        "done_reason": "stop",
        "prompt_eval_count": 10,
        "eval_count": 15,
        "total_duration": 2_500_000_000u64
    })
}

/// Sample Ollama models list response
fn models_list_response() -> serde_json::Value {
    serde_json::json!({
        "models": [
            {"name": "llama3.2:1b"},
            {"name": "test-model"}
        ]
    })
}

// =============================================================================
// Generation Tests
// =============================================================================

mod generate_tests {
    use super::*;

    #[tokio::test]
    async fn generate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "prompt": "User: hi\nAssistant:",
                "raw": true,
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(generate_success_response()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let engine = engine_for(&mock_server);
        let response = engine
            .generate(InferenceRequest::simple("User: hi\nAssistant:"))
            .await
            .unwrap();

        assert_eq!(response.model, "test-model");
        assert_eq!(response.content, "Hello! How can I help you today?");
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
        assert_eq!(response.duration_ms, Some(2500));
        let usage = response.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 10);
        assert_eq!(usage.completion_tokens, 15);
        assert_eq!(usage.total_tokens, 25);
    }

    #[tokio::test]
    async fn generate_sends_sampling_options() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "options": {
                    "num_predict": 32,
                    "num_ctx": 512,
                    "num_gpu": 0,
                    "stop": ["\nUser:"]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(generate_success_response()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let engine = engine_for(&mock_server);
        let request = InferenceRequest::simple("hello")
            .on_device(Device::Cpu)
            .with_max_tokens(32)
            .with_stop("\nUser:");

        assert!(engine.generate(request).await.is_ok());
    }

    #[tokio::test]
    async fn generate_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let engine = engine_for(&mock_server);
        let err = engine
            .generate(InferenceRequest::simple("Hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, InferenceError::ServerError(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn generate_out_of_memory() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"error": "CUDA error: out of memory"})),
            )
            .mount(&mock_server)
            .await;

        let engine = engine_for(&mock_server);
        let err = engine
            .generate(InferenceRequest::simple("Hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, InferenceError::OutOfMemory(_)));
        assert!(err.is_device_related());
    }

    #[tokio::test]
    async fn generate_invalid_json_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let engine = engine_for(&mock_server);
        let err = engine
            .generate(InferenceRequest::simple("Hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, InferenceError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn generate_connection_refused() {
        let config = config_for_mock("http://127.0.0.1:1");
        let engine = OllamaInferenceEngine::new(config).expect("Failed to create engine");

        let err = engine
            .generate(InferenceRequest::simple("Hello"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            InferenceError::ConnectionFailed(_) | InferenceError::RequestFailed(_)
        ));
    }
}

// =============================================================================
// Model Lifecycle Tests
// =============================================================================

mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn load_model_probes_then_warms_up() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/show"))
            .and(body_partial_json(serde_json::json!({"model": "test-model"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "prompt": "",
                "keep_alive": "5m"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "test-model",
                "response": "",
                "done": true
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let engine = engine_for(&mock_server);
        engine.load_model(Device::Cuda).await.unwrap();

        assert_eq!(engine.current_device(), Some(Device::Cuda));
    }

    #[tokio::test]
    async fn load_missing_model_fails() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/show"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"error": "model 'test-model' not found"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let engine = engine_for(&mock_server);
        let err = engine.load_model(Device::Cpu).await.unwrap_err();

        assert!(matches!(err, InferenceError::ModelNotAvailable(ref m) if m == "test-model"));
        assert!(engine.current_device().is_none());
    }

    #[tokio::test]
    async fn load_model_reports_device_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/show"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"error": "no compatible GPU available"})),
            )
            .mount(&mock_server)
            .await;

        let engine = engine_for(&mock_server);
        let err = engine.load_model(Device::Cuda).await.unwrap_err();

        assert!(matches!(err, InferenceError::DeviceError(_)));
    }

    #[tokio::test]
    async fn unload_model_sets_zero_keep_alive() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({"keep_alive": "0"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "test-model",
                "response": "",
                "done": true,
                "done_reason": "unload"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let engine = engine_for(&mock_server);
        assert!(engine.unload_model().await.is_ok());
    }
}

// =============================================================================
// Health and Model Listing Tests
// =============================================================================

mod server_tests {
    use super::*;

    #[tokio::test]
    async fn health_check_healthy() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(models_list_response()))
            .mount(&mock_server)
            .await;

        let engine = engine_for(&mock_server);
        assert!(engine.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn health_check_unhealthy_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let engine = engine_for(&mock_server);
        assert!(!engine.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn health_check_unreachable_is_false() {
        let engine = OllamaInferenceEngine::new(config_for_mock("http://127.0.0.1:1"))
            .expect("Failed to create engine");
        assert!(!engine.health_check().await.unwrap());
    }
}
