//! Startup wiring shared by the binaries

use std::sync::Arc;

use application::{DeviceProbePort, ModelLoaderPort, ModelRuntime};
use tracing::info;

use crate::{
    adapters::{OllamaModelLoader, SystemDeviceProbe},
    config::AppConfig,
};

/// Probe devices and load the configured model
///
/// Never fails: without a usable model the runtime answers from the keyword
/// table.
pub async fn build_runtime(config: &AppConfig) -> Arc<ModelRuntime> {
    let loader = OllamaModelLoader::new(config.inference_config());
    let probe = SystemDeviceProbe::detect();
    build_runtime_with(config, &loader, &probe).await
}

/// [`build_runtime`] with explicit loader and probe
pub async fn build_runtime_with(
    config: &AppConfig,
    loader: &dyn ModelLoaderPort,
    probe: &dyn DeviceProbePort,
) -> Arc<ModelRuntime> {
    let runtime = ModelRuntime::initialize(config.engine_settings(), loader, probe).await;
    let info = runtime.model_info();
    info!(
        status = ?info.status,
        model = %info.model_name,
        device = ?info.device,
        "Assistant engine ready"
    );
    Arc::new(runtime)
}
