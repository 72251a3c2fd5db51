//! Quirks for Xiaomi / Aqara devices.

pub mod basic;
pub mod power;
pub mod remote_b286acn01;

/// Manufacturer name reported by Xiaomi and Aqara devices
pub const LUMI: &str = "LUMI";

pub use basic::{BasicCluster, XiaomiAttributes};
pub use power::PowerConfigurationCluster;
pub use remote_b286acn01::{Button, MultistateInputCluster, PressType};
