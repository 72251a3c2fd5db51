//! Device quirk definitions.
//!
//! Each quirk pairs the layout a device reports (signature) with the layout
//! installed in its place (replacement), plus any custom cluster behaviour.

use crate::device::QuirkDefinition;

pub mod xiaomi;

/// Every quirk shipped by this crate.
pub fn all() -> [&'static QuirkDefinition; 1] {
    [&xiaomi::remote_b286acn01::QUIRK]
}
