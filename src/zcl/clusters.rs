//! Zigbee cluster identifiers used by the quirk tables.

use crate::error::QuirkError;
use serde::Serialize;
use std::fmt;
use strum::{AsRefStr, FromRepr};

/// Zigbee Home Automation profile (0x0104, 260 decimal)
pub const PROFILE_ZHA: u16 = 0x0104;

/// Cluster IDs known to this crate.
///
/// Raw identifiers outside this set are rejected by `TryFrom<u16>`.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, FromRepr, AsRefStr, Serialize,
)]
#[serde(into = "u16")]
#[repr(u16)]
pub enum ClusterId {
    Basic = 0x0000,
    PowerConfiguration = 0x0001,
    Identify = 0x0003,
    Groups = 0x0004,
    Scenes = 0x0005,
    AnalogInput = 0x000C,
    MultistateInput = 0x0012,
    Ota = 0x0019,
    /// Xiaomi manufacturer-specific cluster
    XiaomiManufacturer = 0xFFFF,
}

impl ClusterId {
    /// Raw 16-bit identifier.
    pub const fn id(self) -> u16 {
        self as u16
    }
}

impl From<ClusterId> for u16 {
    fn from(cluster: ClusterId) -> Self {
        cluster.id()
    }
}

impl TryFrom<u16> for ClusterId {
    type Error = QuirkError;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        Self::from_repr(raw).ok_or(QuirkError::UnknownCluster(raw))
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:04X})", self.as_ref(), self.id())
    }
}
