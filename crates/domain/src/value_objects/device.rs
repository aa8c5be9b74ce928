//! Compute devices a model can run on

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A concrete compute device.
///
/// Variants are declared in selection priority order: dedicated accelerator,
/// secondary accelerator, generic processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Dedicated accelerator (NVIDIA CUDA)
    Cuda,
    /// Secondary accelerator (Apple Metal / MPS)
    Mps,
    /// Generic processor
    Cpu,
}

impl Device {
    /// All devices, highest priority first
    pub const PRIORITY: [Self; 3] = [Self::Cuda, Self::Mps, Self::Cpu];

    /// Whether this device is an accelerator
    pub const fn is_accelerator(self) -> bool {
        !matches!(self, Self::Cpu)
    }

    /// Devices ranked below this one, highest priority first
    pub fn lower_tiers(self) -> impl Iterator<Item = Self> {
        Self::PRIORITY.into_iter().filter(move |d| *d > self)
    }

    /// Short lowercase name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cuda => "cuda",
            Self::Mps => "mps",
            Self::Cpu => "cpu",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configured device preference
///
/// Serialized as its display name; parsing accepts any case and the `gpu` and
/// `metal` aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DevicePreference {
    /// Pick the best available device
    #[default]
    Auto,
    /// Require a specific device
    Fixed(Device),
}

impl DevicePreference {
    /// Devices to consider, highest priority first
    pub fn candidates(self) -> Vec<Device> {
        match self {
            Self::Auto => Device::PRIORITY.to_vec(),
            Self::Fixed(device) => vec![device],
        }
    }
}

impl fmt::Display for DevicePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Fixed(device) => device.fmt(f),
        }
    }
}

impl FromStr for DevicePreference {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cuda" | "gpu" => Ok(Self::Fixed(Device::Cuda)),
            "mps" | "metal" => Ok(Self::Fixed(Device::Mps)),
            "cpu" => Ok(Self::Fixed(Device::Cpu)),
            _ => Err(DomainError::InvalidDevice(s.to_string())),
        }
    }
}

impl TryFrom<String> for DevicePreference {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DevicePreference> for String {
    fn from(preference: DevicePreference) -> Self {
        preference.to_string()
    }
}
