//! Model loader port - Loads the configured model onto a device

use std::sync::Arc;

use async_trait::async_trait;
use domain::Device;
#[cfg(test)]
use mockall::automock;

use super::InferencePort;
use crate::error::ApplicationError;

/// Port for loading a model onto a compute device
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ModelLoaderPort: Send + Sync {
    /// Load the model and make it ready for generation.
    ///
    /// Fails with [`ApplicationError::ModelLoad`] when the model is missing,
    /// the device cannot host it, or it runs out of memory.
    async fn load(&self, device: Device) -> Result<Arc<dyn InferencePort>, ApplicationError>;
}
