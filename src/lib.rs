//! Zigbee device quirks.
//!
//! A quirk corrects the cluster layout a Zigbee device advertises and adds
//! behaviour for vendor-specific attributes, such as turning the Aqara wall
//! switch's raw status reports into button press events.

pub mod config;
pub mod device;
pub mod error;
pub mod events;
pub mod quirks;
pub mod zcl;
