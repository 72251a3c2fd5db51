//! Zigbee Cluster Library building blocks.
//!
//! This module provides the small slice of a Zigbee host framework the quirks
//! need: cluster identifiers, the generic attribute update path, typed value
//! decoding, and the cluster handler seam.

pub mod attribute;
pub mod clusters;
pub mod data_type;
pub mod handler;

pub use attribute::{
    AttributeCache, AttributeListener, AttributeReport, AttributeValue, ClusterAddress,
};
pub use clusters::{ClusterId, PROFILE_ZHA};
pub use handler::{ClusterHandler, GenericCluster};
