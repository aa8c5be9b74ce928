//! Host device detection

use std::{path::Path, process::Command};

use application::ports::DeviceProbePort;
use domain::Device;
use tracing::debug;

/// Reports which compute devices this host offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemDeviceProbe {
    cuda: bool,
    mps: bool,
}

impl SystemDeviceProbe {
    /// Inspect the host
    pub fn detect() -> Self {
        let probe = Self {
            cuda: cuda_present(),
            mps: cfg!(all(target_os = "macos", target_arch = "aarch64")),
        };
        debug!(cuda = probe.cuda, mps = probe.mps, "Detected compute devices");
        probe
    }

    /// Probe with fixed answers
    pub const fn with_devices(cuda: bool, mps: bool) -> Self {
        Self { cuda, mps }
    }
}

impl DeviceProbePort for SystemDeviceProbe {
    fn is_available(&self, device: Device) -> bool {
        match device {
            Device::Cuda => self.cuda,
            Device::Mps => self.mps,
            Device::Cpu => true,
        }
    }
}

fn cuda_present() -> bool {
    if let Ok(visible) = std::env::var("CUDA_VISIBLE_DEVICES") {
        let visible = visible.trim();
        if visible.is_empty() || visible == "-1" {
            return false;
        }
    }

    if Path::new("/proc/driver/nvidia/version").exists() {
        return true;
    }

    Command::new("nvidia-smi")
        .arg("-L")
        .output()
        .is_ok_and(|output| output.status.success() && !output.stdout.is_empty())
}
