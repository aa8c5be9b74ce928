//! Ollama inference adapter - Implements InferencePort using ai_core
//!
//! Works with any Ollama-compatible backend: standard Ollama with CUDA on
//! Linux, Metal on Apple silicon, or plain CPU.

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Instant,
};

use ai_core::{InferenceConfig, InferenceEngine, InferenceError, InferenceRequest, OllamaInferenceEngine};
use application::{
    error::ApplicationError,
    ports::{GenerationRequest, InferencePort, InferenceResult},
};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Adapter for Ollama-compatible inference servers
#[derive(Debug)]
pub struct OllamaInferenceAdapter {
    engine: OllamaInferenceEngine,
    in_flight: AtomicUsize,
}

impl OllamaInferenceAdapter {
    /// Create a new adapter with the given configuration
    pub fn new(config: InferenceConfig) -> Result<Self, ApplicationError> {
        let engine = OllamaInferenceEngine::new(config).map_err(Self::map_error)?;
        Ok(Self::from_engine(engine))
    }

    /// Wrap an engine that has already been set up
    pub const fn from_engine(engine: OllamaInferenceEngine) -> Self {
        Self {
            engine,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Underlying engine
    pub const fn engine(&self) -> &OllamaInferenceEngine {
        &self.engine
    }

    /// Generations currently running
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Convert ai_core error to application error
    fn map_error(e: InferenceError) -> ApplicationError {
        match e {
            InferenceError::Timeout(ms) => ApplicationError::Timeout(ms),
            device if device.is_device_related() => ApplicationError::DeviceFailure(device.to_string()),
            other => ApplicationError::Inference(other.to_string()),
        }
    }

    fn to_engine_request(request: &GenerationRequest) -> InferenceRequest {
        let params = request.params;
        request.stop.iter().fold(
            InferenceRequest::simple(request.prompt.as_str())
                .on_device(request.device)
                .with_max_tokens(params.max_new_tokens)
                .with_temperature(params.temperature)
                .with_top_p(params.top_p)
                .with_sampling(params.do_sample),
            |engine_request, stop| engine_request.with_stop(stop.as_str()),
        )
    }
}

#[async_trait]
impl InferencePort for OllamaInferenceAdapter {
    #[instrument(skip(self, request), fields(prompt_len = request.prompt.len(), device = %request.device))]
    async fn generate(&self, request: &GenerationRequest) -> Result<InferenceResult, ApplicationError> {
        let start = Instant::now();

        let response = self
            .engine
            .generate(Self::to_engine_request(request))
            .await
            .map_err(Self::map_error)?;

        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(
            response_len = response.content.len(),
            latency_ms,
            "Ollama inference completed"
        );

        Ok(InferenceResult {
            content: response.content,
            model: response.model,
            tokens_used: response.usage.map(|usage| usage.completion_tokens),
            latency_ms,
        })
    }

    async fn is_healthy(&self) -> bool {
        self.engine.health_check().await.unwrap_or(false)
    }

    fn model_name(&self) -> String {
        self.engine.config().model.clone()
    }

    fn begin_generation(&self) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
    }

    fn end_generation(&self) {
        let _ = self
            .in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    #[instrument(skip(self))]
    async fn clear_cache(&self) -> Result<(), ApplicationError> {
        let running = self.in_flight();
        if running > 0 {
            info!(running, "Generations in flight, keeping model resident");
            return Ok(());
        }
        self.engine.unload_model().await.map_err(Self::map_error)
    }
}
