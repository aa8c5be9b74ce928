//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod ollama_inference_adapter;
mod ollama_model_loader;
mod system_device_probe;

pub use ollama_inference_adapter::OllamaInferenceAdapter;
pub use ollama_model_loader::OllamaModelLoader;
pub use system_device_probe::SystemDeviceProbe;
