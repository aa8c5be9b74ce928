//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod device_probe_port;
mod inference_port;
mod model_loader_port;

#[cfg(test)]
pub use device_probe_port::MockDeviceProbePort;
pub use device_probe_port::DeviceProbePort;
#[cfg(test)]
pub use inference_port::MockInferencePort;
pub use inference_port::{GenerationParams, GenerationRequest, InferencePort, InferenceResult};
#[cfg(test)]
pub use model_loader_port::MockModelLoaderPort;
pub use model_loader_port::ModelLoaderPort;
