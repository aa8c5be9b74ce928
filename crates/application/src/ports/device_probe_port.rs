//! Device probe port - Reports which compute devices exist on this host

use domain::Device;
#[cfg(test)]
use mockall::automock;

/// Port for detecting available compute devices
#[cfg_attr(test, automock)]
pub trait DeviceProbePort: Send + Sync {
    /// Whether the device can be used on this host
    fn is_available(&self, device: Device) -> bool;
}
