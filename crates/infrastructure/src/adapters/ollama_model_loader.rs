//! Model loader - Probes and warms up a model on the chosen device

use std::sync::Arc;

use ai_core::{InferenceConfig, InferenceEngine, OllamaInferenceEngine};
use application::{
    error::ApplicationError,
    ports::{InferencePort, ModelLoaderPort},
};
use async_trait::async_trait;
use domain::Device;
use tracing::{info, instrument};

use super::OllamaInferenceAdapter;

/// Loads models through an Ollama-compatible server
#[derive(Debug, Clone)]
pub struct OllamaModelLoader {
    config: InferenceConfig,
}

impl OllamaModelLoader {
    /// Create a loader for the configured model and server
    pub const fn new(config: InferenceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ModelLoaderPort for OllamaModelLoader {
    #[instrument(skip(self), fields(model = %self.config.model, base_url = %self.config.base_url))]
    async fn load(&self, device: Device) -> Result<Arc<dyn InferencePort>, ApplicationError> {
        let engine = OllamaInferenceEngine::new(self.config.clone())
            .map_err(|e| ApplicationError::ModelLoad(e.to_string()))?;

        engine
            .load_model(device)
            .await
            .map_err(|e| ApplicationError::ModelLoad(e.to_string()))?;

        info!(device = %device, "Model resident on device");
        Ok(Arc::new(OllamaInferenceAdapter::from_engine(engine)))
    }
}
