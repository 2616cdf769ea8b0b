//! Identification tiers
//!
//! Each tier implements `IdentificationStrategy`. The resolver tries them in
//! the order remote → on-device → placeholder.

pub mod on_device;
pub mod placeholder;
pub mod remote;

pub use on_device::OnDeviceStrategy;
pub use placeholder::PlaceholderStrategy;
pub use remote::{HealthStatus, RemoteInferenceClient, RemoteStrategy};
