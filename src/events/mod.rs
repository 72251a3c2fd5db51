//! Device event dispatch.
//!
//! Custom clusters publish semantic events through an injected [`EventSink`].
//! The sink is shared by every cluster of a device and is never owned by the
//! publishing cluster.

pub mod button;
pub mod sinks;

pub use button::{ButtonEvent, UNKNOWN_LABEL};
pub use sinks::{JsonLinesSink, RecordingSink};

use crate::zcl::ClusterAddress;

/// Event kind for device-originated commands (button presses and similar).
pub const ZHA_SEND_EVENT: &str = "zha_send_event";

/// Receiver of semantic device events.
///
/// Publishing is fire-and-forget: there is no acknowledgement and no retry.
pub trait EventSink: Send + Sync {
    fn publish(&self, kind: &'static str, source: &ClusterAddress, event: &ButtonEvent);
}
