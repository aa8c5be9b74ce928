//! Model runtime - Device selection, model loading and the engine state
//!
//! The runtime is built once at startup and shared by every session. Building
//! it never fails: when no model can be loaded the runtime settles into
//! fallback mode and answers from the keyword table.

use std::{fmt, sync::Arc, time::Duration};

use domain::{Device, DevicePreference, MessageMetadata};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::keyword_responder::{FallbackTable, KeywordResponder};
use super::prompt_builder::PromptBuilder;
use crate::{
    error::ApplicationError,
    ports::{DeviceProbePort, GenerationParams, GenerationRequest, InferencePort, InferenceResult, ModelLoaderPort},
};

/// Resolved settings for the assistant engine
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Configured model name
    pub model_name: String,
    /// Device preference
    pub device: DevicePreference,
    /// Exchanges kept per conversation
    pub max_history: usize,
    /// Sampling parameters
    pub generation: GenerationParams,
    /// Per-call generation time budget
    pub timeout: Duration,
    /// Optional system prompt
    pub system_prompt: Option<String>,
    /// Keyword fallback table
    pub fallback: FallbackTable,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            model_name: "llama3.2:1b".to_string(),
            device: DevicePreference::Auto,
            max_history: domain::DEFAULT_MAX_EXCHANGES,
            generation: GenerationParams::default(),
            timeout: Duration::from_secs(60),
            system_prompt: None,
            fallback: FallbackTable::default(),
        }
    }
}

/// Capability the engine settled into at startup
#[derive(Clone)]
pub enum EngineState {
    /// A model is loaded and generates replies
    ModelLoaded {
        /// Loaded model
        model: Arc<dyn InferencePort>,
        /// Device it was loaded onto
        device: Device,
    },
    /// No model; replies come from the keyword table
    FallbackMode {
        /// Why loading failed
        reason: String,
    },
}

impl fmt::Debug for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelLoaded { model, device } => f
                .debug_struct("ModelLoaded")
                .field("model", &model.model_name())
                .field("device", device)
                .finish(),
            Self::FallbackMode { reason } => {
                f.debug_struct("FallbackMode").field("reason", reason).finish()
            },
        }
    }
}

/// Whether a model is serving replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Loaded,
    Fallback,
}

/// Snapshot of the engine for status endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Loaded or fallback
    pub status: ModelStatus,
    /// Loaded model name, `none` in fallback mode
    pub model_name: String,
    /// Device the model runs on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    /// Why the engine is in fallback mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Shared model state and generation settings
pub struct ModelRuntime {
    state: EngineState,
    settings: EngineSettings,
    available: Vec<Device>,
    prompts: PromptBuilder,
    responder: KeywordResponder,
}

impl fmt::Debug for ModelRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRuntime")
            .field("state", &self.state)
            .field("available", &self.available)
            .field("max_history", &self.settings.max_history)
            .finish_non_exhaustive()
    }
}

/// Pick a device for the preference from the available ones
pub fn select_device(
    preference: DevicePreference,
    available: &[Device],
) -> Result<Device, ApplicationError> {
    match preference {
        DevicePreference::Auto => preference
            .candidates()
            .into_iter()
            .find(|d| available.contains(d))
            .ok_or_else(|| ApplicationError::ModelLoad("no compute device available".to_string())),
        DevicePreference::Fixed(device) if available.contains(&device) => Ok(device),
        DevicePreference::Fixed(device) => Err(ApplicationError::ModelLoad(format!(
            "incompatible device: '{device}' is not available on this host"
        ))),
    }
}

impl ModelRuntime {
    /// Select a device and load the model; degrade to fallback mode on failure
    #[instrument(skip_all, fields(model = %settings.model_name, device = %settings.device))]
    pub async fn initialize(
        settings: EngineSettings,
        loader: &dyn ModelLoaderPort,
        probe: &dyn DeviceProbePort,
    ) -> Self {
        let available: Vec<Device> = Device::PRIORITY
            .into_iter()
            .filter(|d| probe.is_available(*d))
            .collect();
        debug!(?available, "Probed compute devices");

        let loaded = match select_device(settings.device, &available) {
            Ok(device) => {
                info!(device = %device, "Using device");
                loader.load(device).await.map(|model| (model, device))
            },
            Err(e) => Err(e),
        };

        let state = match loaded {
            Ok((model, device)) => {
                info!(device = %device, model = %model.model_name(), "Model loaded successfully");
                EngineState::ModelLoaded { model, device }
            },
            Err(e) => {
                warn!(error = %e, "Failed to load model, using fallback responses");
                EngineState::FallbackMode {
                    reason: e.to_string(),
                }
            },
        };

        Self::with_state(settings, state, available)
    }

    /// Runtime that never loads a model
    pub fn fallback(settings: EngineSettings, reason: impl Into<String>) -> Self {
        Self::with_state(
            settings,
            EngineState::FallbackMode {
                reason: reason.into(),
            },
            vec![Device::Cpu],
        )
    }

    pub(crate) fn with_state(
        settings: EngineSettings,
        state: EngineState,
        available: Vec<Device>,
    ) -> Self {
        let responder = KeywordResponder::new(&settings.fallback).unwrap_or_else(|e| {
            warn!(error = %e, "Fallback table rejected, using generic replies only");
            KeywordResponder::replies_only(settings.fallback.default_replies.clone())
        });

        Self {
            prompts: PromptBuilder::new(settings.system_prompt.clone()),
            state,
            settings,
            available,
            responder,
        }
    }

    /// Current engine state
    pub const fn state(&self) -> &EngineState {
        &self.state
    }

    /// Whether replies come from the keyword table
    pub const fn is_fallback(&self) -> bool {
        matches!(self.state, EngineState::FallbackMode { .. })
    }

    /// Settings the runtime was built with
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Prompt renderer
    pub const fn prompts(&self) -> &PromptBuilder {
        &self.prompts
    }

    /// Keyword fallback
    pub const fn responder(&self) -> &KeywordResponder {
        &self.responder
    }

    /// Status snapshot
    pub fn model_info(&self) -> ModelInfo {
        match &self.state {
            EngineState::ModelLoaded { model, device } => ModelInfo {
                status: ModelStatus::Loaded,
                model_name: model.model_name(),
                device: Some(*device),
                reason: None,
            },
            EngineState::FallbackMode { reason } => ModelInfo {
                status: ModelStatus::Fallback,
                model_name: "none".to_string(),
                device: None,
                reason: Some(reason.clone()),
            },
        }
    }

    /// Whether the loaded model's backend responds
    pub async fn is_healthy(&self) -> bool {
        match &self.state {
            EngineState::ModelLoaded { model, .. } => model.is_healthy().await,
            EngineState::FallbackMode { .. } => false,
        }
    }

    /// Release model weights from accelerator memory.
    ///
    /// Returns `false` when there was nothing to release.
    #[instrument(skip(self))]
    pub async fn clear_cache(&self) -> Result<bool, ApplicationError> {
        match &self.state {
            EngineState::ModelLoaded { model, device } if device.is_accelerator() => {
                model.clear_cache().await?;
                info!(device = %device, "Accelerator cache cleared");
                Ok(true)
            },
            _ => Ok(false),
        }
    }

    /// Next lower available device tier after `failed`
    pub fn retry_device(&self, failed: Device) -> Option<Device> {
        failed.lower_tiers().find(|d| self.available.contains(d))
    }

    /// Run one generation on `device` within the time budget.
    ///
    /// The generation is marked finished on the model when this returns,
    /// including on timeout.
    pub async fn generate_on(
        &self,
        model: &Arc<dyn InferencePort>,
        prompt: &str,
        device: Device,
    ) -> Result<InferenceResult, ApplicationError> {
        let request = GenerationRequest {
            prompt: prompt.to_string(),
            device,
            params: self.settings.generation,
            stop: self.prompts.stop_sequences(),
        };

        let _scope = GenerationScope::enter(model.as_ref());
        match tokio::time::timeout(self.settings.timeout, model.generate(&request)).await {
            Ok(result) => result,
            Err(_) => Err(ApplicationError::Timeout(
                u64::try_from(self.settings.timeout.as_millis()).unwrap_or(u64::MAX),
            )),
        }
    }
}

/// Metadata attached to a generated reply
pub fn reply_metadata(result: &InferenceResult, device: Device) -> MessageMetadata {
    MessageMetadata {
        model: Some(result.model.clone()),
        device: Some(device.to_string()),
        tokens: result.tokens_used,
        latency_ms: Some(result.latency_ms),
    }
}

/// Keeps one generation marked in flight on the model until dropped
struct GenerationScope<'a> {
    model: &'a dyn InferencePort,
}

impl<'a> GenerationScope<'a> {
    fn enter(model: &'a dyn InferencePort) -> Self {
        model.begin_generation();
        Self { model }
    }
}

impl Drop for GenerationScope<'_> {
    fn drop(&mut self) {
        self.model.end_generation();
    }
}
