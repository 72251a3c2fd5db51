//! Device capability tables.
//!
//! A quirk declares two tables: the layout the device reports about itself
//! (signature), used to recognise it, and the corrected layout that is
//! actually installed (replacement).

use super::ClusterContext;
use crate::error::{QuirkError, Result};
use crate::zcl::{ClusterHandler, ClusterId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Endpoint layout as reported by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSignature {
    pub endpoint_id: u8,
    pub profile_id: u16,
    pub device_type: u16,
    pub input_clusters: &'static [ClusterId],
    pub output_clusters: &'static [ClusterId],
}

/// Constructor for a custom cluster handler.
pub type ClusterFactory = fn(&ClusterContext) -> Arc<dyn ClusterHandler>;

/// One cluster of a replacement endpoint.
#[derive(Clone, Copy)]
pub enum ClusterSlot {
    /// Cluster installed with generic behaviour.
    Standard(ClusterId),
    /// Cluster installed through a quirk-provided constructor.
    Custom {
        cluster_id: ClusterId,
        factory: ClusterFactory,
    },
}

impl ClusterSlot {
    pub const fn cluster_id(&self) -> ClusterId {
        match self {
            ClusterSlot::Standard(id) => *id,
            ClusterSlot::Custom { cluster_id, .. } => *cluster_id,
        }
    }
}

impl std::fmt::Debug for ClusterSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterSlot::Standard(id) => write!(f, "Standard({id})"),
            ClusterSlot::Custom { cluster_id, .. } => write!(f, "Custom({cluster_id})"),
        }
    }
}

/// Endpoint layout installed in place of the signature.
#[derive(Debug, Clone)]
pub struct EndpointReplacement {
    pub endpoint_id: u8,
    /// Inherited from the signature endpoint when `None`.
    pub profile_id: Option<u16>,
    pub device_type: u16,
    pub input_clusters: &'static [ClusterSlot],
    pub output_clusters: &'static [ClusterSlot],
}

/// (manufacturer, model) pair as reported by the Basic cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub manufacturer: &'static str,
    pub model: &'static str,
}

/// Complete quirk: which devices it applies to and what it installs.
#[derive(Debug, Clone)]
pub struct QuirkDefinition {
    pub name: &'static str,
    pub models: &'static [ModelInfo],
    pub signature: &'static [EndpointSignature],
    pub replacement: &'static [EndpointReplacement],
}

/// Simple descriptor reported by a device during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleDescriptor {
    pub endpoint: u8,
    pub profile: u16,
    pub device_type: u16,
    #[serde(default)]
    pub input_clusters: Vec<u16>,
    #[serde(default)]
    pub output_clusters: Vec<u16>,
}

impl QuirkDefinition {
    /// Check the tables for internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.models.is_empty() {
            return Err(self.invalid("no models listed".to_string()));
        }

        let mut signature_ids = BTreeSet::new();
        for ep in self.signature {
            if !signature_ids.insert(ep.endpoint_id) {
                return Err(self.invalid(format!(
                    "signature endpoint {} listed twice",
                    ep.endpoint_id
                )));
            }
            self.check_unique(ep.endpoint_id, "input", ep.input_clusters.iter().copied())?;
            self.check_unique(ep.endpoint_id, "output", ep.output_clusters.iter().copied())?;
        }

        let mut replacement_ids = BTreeSet::new();
        for ep in self.replacement {
            if !replacement_ids.insert(ep.endpoint_id) {
                return Err(self.invalid(format!(
                    "replacement endpoint {} listed twice",
                    ep.endpoint_id
                )));
            }
            if !signature_ids.contains(&ep.endpoint_id) {
                return Err(self.invalid(format!(
                    "replacement endpoint {} missing from signature",
                    ep.endpoint_id
                )));
            }
            self.check_unique(
                ep.endpoint_id,
                "input",
                ep.input_clusters.iter().map(ClusterSlot::cluster_id),
            )?;
            self.check_unique(
                ep.endpoint_id,
                "output",
                ep.output_clusters.iter().map(ClusterSlot::cluster_id),
            )?;
        }

        Ok(())
    }

    /// Whether a device with this identity and these descriptors is covered.
    pub fn matches(
        &self,
        manufacturer: &str,
        model: &str,
        descriptors: &[SimpleDescriptor],
    ) -> bool {
        if !self.matches_model(manufacturer, model) {
            return false;
        }
        if descriptors.len() != self.signature.len() {
            return false;
        }

        let reported: BTreeMap<u8, &SimpleDescriptor> =
            descriptors.iter().map(|d| (d.endpoint, d)).collect();

        self.signature.iter().all(|expected| {
            reported
                .get(&expected.endpoint_id)
                .is_some_and(|actual| endpoint_matches(expected, actual))
        })
    }

    /// Whether the (manufacturer, model) pair is listed.
    pub fn matches_model(&self, manufacturer: &str, model: &str) -> bool {
        self.models
            .iter()
            .any(|m| m.manufacturer == manufacturer && m.model == model)
    }

    /// Signature entry for an endpoint.
    pub fn signature_endpoint(&self, endpoint_id: u8) -> Option<&'static EndpointSignature> {
        self.signature
            .iter()
            .find(|ep| ep.endpoint_id == endpoint_id)
    }

    fn check_unique(
        &self,
        endpoint_id: u8,
        direction: &str,
        clusters: impl Iterator<Item = ClusterId>,
    ) -> Result<()> {
        let mut seen = BTreeSet::new();
        for cluster in clusters {
            if !seen.insert(cluster) {
                return Err(self.invalid(format!(
                    "{direction} cluster {cluster} repeated on endpoint {endpoint_id}"
                )));
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> QuirkError {
        QuirkError::InvalidDefinition {
            quirk: self.name,
            reason,
        }
    }
}

fn endpoint_matches(expected: &EndpointSignature, actual: &SimpleDescriptor) -> bool {
    expected.profile_id == actual.profile
        && expected.device_type == actual.device_type
        && same_clusters(expected.input_clusters, &actual.input_clusters)
        && same_clusters(expected.output_clusters, &actual.output_clusters)
}

fn same_clusters(expected: &[ClusterId], actual: &[u16]) -> bool {
    let expected: BTreeSet<u16> = expected.iter().map(|c| c.id()).collect();
    let actual: BTreeSet<u16> = actual.iter().copied().collect();
    expected == actual
}
