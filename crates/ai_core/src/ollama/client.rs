//! Ollama client implementation

use std::time::Duration;

use async_trait::async_trait;
use domain::Device;
use parking_lot::Mutex;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::InferenceConfig;
use crate::error::InferenceError;
use crate::ports::{InferenceEngine, InferenceRequest, InferenceResponse, TokenUsage};

/// Inference engine backed by an Ollama-compatible server
#[derive(Debug)]
pub struct OllamaInferenceEngine {
    client: Client,
    config: InferenceConfig,
    device: Mutex<Option<Device>>,
}

impl OllamaInferenceEngine {
    /// Create a new engine
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| InferenceError::ConnectionFailed(e.to_string()))?;

        info!(
            base_url = %config.base_url,
            model = %config.model,
            "Initialized Ollama inference engine"
        );

        Ok(Self {
            client,
            config,
            device: Mutex::new(None),
        })
    }

    /// Configuration in use
    pub const fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Device the model was last loaded on
    pub fn current_device(&self) -> Option<Device> {
        *self.device.lock()
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/api/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn transport_error(&self, err: &reqwest::Error) -> InferenceError {
        InferenceError::from_transport(err, self.config.timeout_ms)
    }

    fn options_for(&self, request: &InferenceRequest, device: Option<Device>) -> OllamaOptions {
        let do_sample = request.do_sample.unwrap_or(self.config.do_sample);
        let (temperature, top_k) = if do_sample {
            (request.temperature.unwrap_or(self.config.temperature), None)
        } else {
            (0.0, Some(1))
        };

        OllamaOptions {
            temperature: Some(temperature),
            top_p: Some(request.top_p.unwrap_or(self.config.top_p)),
            top_k,
            num_predict: Some(request.max_tokens.unwrap_or(self.config.max_new_tokens)),
            num_ctx: Some(self.config.max_length),
            num_gpu: gpu_layers(device),
            stop: request.stop.clone(),
        }
    }

    /// Confirm the model exists on the server
    #[instrument(skip(self), fields(model = %self.config.model))]
    async fn probe_model(&self) -> Result<(), InferenceError> {
        let response = self
            .client
            .post(self.api_url("show"))
            .json(&OllamaShowRequest {
                model: &self.config.model,
            })
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(InferenceError::ModelNotAvailable(self.config.model.clone()));
        }
        ensure_success(response).await.map(drop)
    }
}

/// Layers to offload; zero pins the model to the processor
const fn gpu_layers(device: Option<Device>) -> Option<i32> {
    match device {
        Some(Device::Cpu) => Some(0),
        _ => None,
    }
}

async fn ensure_success(response: Response) -> Result<Response, InferenceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(status = %status, body = %body, "Model server request failed");
    Err(InferenceError::from_server_body(status.as_u16(), &body))
}

#[derive(Debug, Serialize)]
struct OllamaShowRequest<'a> {
    model: &'a str,
}

/// Ollama-format generate request
#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    raw: bool,
    stream: bool,
    keep_alive: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Default, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_ctx: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_gpu: Option<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

/// Ollama-format generate response
#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    model: String,
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    done_reason: Option<String>,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
    /// Nanoseconds
    total_duration: Option<u64>,
}

#[async_trait]
impl InferenceEngine for OllamaInferenceEngine {
    #[instrument(skip(self, request), fields(model = %self.config.model, device = ?request.device))]
    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        let device = request.device.or_else(|| self.current_device());
        let body = OllamaGenerateRequest {
            model: &self.config.model,
            prompt: &request.prompt,
            raw: true,
            stream: false,
            keep_alive: &self.config.keep_alive,
            options: Some(self.options_for(&request, device)),
        };

        debug!(prompt_len = request.prompt.len(), "Sending generate request");

        let response = self
            .client
            .post(self.api_url("generate"))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;
        let response = ensure_success(response).await?;

        let generated: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        let usage = match (generated.prompt_eval_count, generated.eval_count) {
            (Some(prompt), Some(completion)) => Some(TokenUsage {
                prompt_tokens: prompt,
                completion_tokens: completion,
                total_tokens: prompt + completion,
            }),
            _ => None,
        };

        debug!(tokens = ?usage, "Generation completed");

        Ok(InferenceResponse {
            content: generated.response.trim().to_string(),
            model: generated.model,
            usage,
            finish_reason: generated
                .done_reason
                .or_else(|| generated.done.then(|| "stop".to_string())),
            duration_ms: generated.total_duration.map(|ns| ns / 1_000_000),
        })
    }

    #[instrument(skip(self), fields(model = %self.config.model))]
    async fn load_model(&self, device: Device) -> Result<(), InferenceError> {
        self.probe_model().await?;

        // An empty prompt makes the server load the weights without generating.
        let body = OllamaGenerateRequest {
            model: &self.config.model,
            prompt: "",
            raw: false,
            stream: false,
            keep_alive: &self.config.keep_alive,
            options: Some(OllamaOptions {
                num_ctx: Some(self.config.max_length),
                num_gpu: gpu_layers(Some(device)),
                ..Default::default()
            }),
        };

        let response = self
            .client
            .post(self.api_url("generate"))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;
        ensure_success(response).await?;

        *self.device.lock() = Some(device);
        info!(device = %device, "Model loaded");
        Ok(())
    }

    #[instrument(skip(self), fields(model = %self.config.model))]
    async fn unload_model(&self) -> Result<(), InferenceError> {
        let body = OllamaGenerateRequest {
            model: &self.config.model,
            prompt: "",
            raw: false,
            stream: false,
            keep_alive: "0",
            options: None,
        };

        let response = self
            .client
            .post(self.api_url("generate"))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;
        ensure_success(response).await?;

        info!("Model weights released");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<bool, InferenceError> {
        let response = self
            .client
            .get(self.api_url("tags"))
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        match response {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) if e.is_timeout() || e.is_connect() => Ok(false),
            Err(e) => Err(InferenceError::RequestFailed(e.to_string())),
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
