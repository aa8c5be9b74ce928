//! Value Objects - Immutable, identity-less domain primitives

mod device;
mod session_id;

pub use device::{Device, DevicePreference};
pub use session_id::SessionId;
