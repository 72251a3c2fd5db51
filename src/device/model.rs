use super::{BatteryBus, ClusterSlot, EndpointReplacement, QuirkDefinition};
use crate::error::{QuirkError, Result};
use crate::events::EventSink;
use crate::zcl::{
    AttributeListener, AttributeReport, AttributeValue, ClusterHandler, ClusterId, GenericCluster,
};
use log::{debug, info};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Everything a cluster constructor may wire itself to.
#[derive(Clone)]
pub struct ClusterContext {
    pub endpoint_id: u8,
    pub events: Arc<dyn EventSink>,
    pub battery: Arc<BatteryBus>,
}

/// Installed endpoint with its cluster handlers.
pub struct Endpoint {
    pub endpoint_id: u8,
    pub profile_id: u16,
    pub device_type: u16,
    input_clusters: BTreeMap<ClusterId, Arc<dyn ClusterHandler>>,
    output_clusters: BTreeMap<ClusterId, Arc<dyn ClusterHandler>>,
}

impl Endpoint {
    fn build(replacement: &EndpointReplacement, profile_id: u16, ctx: &ClusterContext) -> Self {
        Self {
            endpoint_id: replacement.endpoint_id,
            profile_id,
            device_type: replacement.device_type,
            input_clusters: build_clusters(replacement.input_clusters, ctx),
            output_clusters: build_clusters(replacement.output_clusters, ctx),
        }
    }

    /// Input (server) cluster handler.
    pub fn input_cluster(&self, cluster_id: ClusterId) -> Option<&Arc<dyn ClusterHandler>> {
        self.input_clusters.get(&cluster_id)
    }

    /// Output (client) cluster handler.
    pub fn output_cluster(&self, cluster_id: ClusterId) -> Option<&Arc<dyn ClusterHandler>> {
        self.output_clusters.get(&cluster_id)
    }

    pub fn input_cluster_ids(&self) -> impl Iterator<Item = ClusterId> + '_ {
        self.input_clusters.keys().copied()
    }

    pub fn output_cluster_ids(&self) -> impl Iterator<Item = ClusterId> + '_ {
        self.output_clusters.keys().copied()
    }

    fn all_clusters(&self) -> impl Iterator<Item = &Arc<dyn ClusterHandler>> {
        self.input_clusters
            .values()
            .chain(self.output_clusters.values())
    }
}

fn build_clusters(
    slots: &[ClusterSlot],
    ctx: &ClusterContext,
) -> BTreeMap<ClusterId, Arc<dyn ClusterHandler>> {
    slots
        .iter()
        .map(|slot| {
            let handler: Arc<dyn ClusterHandler> = match slot {
                ClusterSlot::Standard(id) => Arc::new(GenericCluster::new(ctx.endpoint_id, *id)),
                ClusterSlot::Custom { factory, .. } => factory(ctx),
            };
            (slot.cluster_id(), handler)
        })
        .collect()
}

/// A device with a quirk applied.
pub struct Device {
    quirk: &'static str,
    manufacturer: String,
    model: String,
    endpoints: BTreeMap<u8, Endpoint>,
    battery: Arc<BatteryBus>,
}

impl Device {
    /// Install the replacement layout of `definition` for the given device.
    ///
    /// The definition is validated first and the device identity must be one
    /// of the quirk's models.
    pub fn from_quirk(
        definition: &QuirkDefinition,
        manufacturer: &str,
        model: &str,
        events: Arc<dyn EventSink>,
    ) -> Result<Self> {
        definition.validate()?;

        if !definition.matches_model(manufacturer, model) {
            return Err(QuirkError::SignatureMismatch {
                quirk: definition.name,
                manufacturer: manufacturer.to_string(),
                model: model.to_string(),
            });
        }

        let battery = Arc::new(BatteryBus::new());
        let mut endpoints = BTreeMap::new();

        for replacement in definition.replacement {
            let profile_id = match replacement.profile_id {
                Some(profile) => profile,
                None => definition
                    .signature_endpoint(replacement.endpoint_id)
                    .map(|sig| sig.profile_id)
                    .ok_or(QuirkError::UnknownEndpoint(replacement.endpoint_id))?,
            };

            let ctx = ClusterContext {
                endpoint_id: replacement.endpoint_id,
                events: events.clone(),
                battery: battery.clone(),
            };
            let endpoint = Endpoint::build(replacement, profile_id, &ctx);
            debug!(
                "[Quirk] {} endpoint {}: device type 0x{:04X}, {} input / {} output clusters",
                definition.name,
                endpoint.endpoint_id,
                endpoint.device_type,
                endpoint.input_clusters.len(),
                endpoint.output_clusters.len()
            );
            endpoints.insert(replacement.endpoint_id, endpoint);
        }

        info!(
            "[Quirk] Applied {} to {} {} ({} endpoints)",
            definition.name,
            manufacturer,
            model,
            endpoints.len()
        );

        Ok(Self {
            quirk: definition.name,
            manufacturer: manufacturer.to_string(),
            model: model.to_string(),
            endpoints,
            battery,
        })
    }

    pub fn quirk(&self) -> &'static str {
        self.quirk
    }

    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self, endpoint_id: u8) -> Option<&Endpoint> {
        self.endpoints.get(&endpoint_id)
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.values()
    }

    pub fn battery_bus(&self) -> &Arc<BatteryBus> {
        &self.battery
    }

    /// Input cluster handler on an endpoint.
    pub fn cluster(
        &self,
        endpoint_id: u8,
        cluster_id: ClusterId,
    ) -> Option<&Arc<dyn ClusterHandler>> {
        self.endpoint(endpoint_id)?.input_cluster(cluster_id)
    }

    /// Route an attribute report to the input cluster it was reported on.
    pub fn handle_attribute_report(
        &self,
        endpoint_id: u8,
        cluster: u16,
        attr_id: u16,
        value: AttributeValue,
    ) -> Result<()> {
        let cluster_id = ClusterId::try_from(cluster)?;
        let endpoint = self
            .endpoint(endpoint_id)
            .ok_or(QuirkError::UnknownEndpoint(endpoint_id))?;
        let handler = endpoint
            .input_cluster(cluster_id)
            .ok_or(QuirkError::ClusterNotPresent {
                endpoint: endpoint_id,
                cluster,
            })?;

        handler.update_attribute(attr_id, value);
        Ok(())
    }

    /// Route a decoded report, see [`Device::handle_attribute_report`].
    pub fn handle_report(&self, report: AttributeReport) -> Result<()> {
        self.handle_attribute_report(
            report.endpoint,
            report.cluster,
            report.attribute,
            report.value,
        )
    }

    /// Observe generic attribute updates on every cluster of the device.
    pub fn subscribe(&self, listener: Arc<dyn AttributeListener>) {
        for endpoint in self.endpoints.values() {
            for cluster in endpoint.all_clusters() {
                cluster.attributes().add_listener(listener.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{EndpointSignature, ModelInfo};
    use crate::events::RecordingSink;
    use crate::zcl::PROFILE_ZHA;
    use crate::zcl::attribute::tests::RecordingListener;

    const DEFINITION: QuirkDefinition = QuirkDefinition {
        name: "test",
        models: &[ModelInfo {
            manufacturer: "ACME",
            model: "acme.button",
        }],
        signature: &[EndpointSignature {
            endpoint_id: 1,
            profile_id: PROFILE_ZHA,
            device_type: 0x0006,
            input_clusters: &[ClusterId::Basic],
            output_clusters: &[ClusterId::Ota],
        }],
        replacement: &[EndpointReplacement {
            endpoint_id: 1,
            profile_id: None,
            device_type: 0x0007,
            input_clusters: &[
                ClusterSlot::Standard(ClusterId::Basic),
                ClusterSlot::Standard(ClusterId::Identify),
            ],
            output_clusters: &[ClusterSlot::Standard(ClusterId::Ota)],
        }],
    };

    fn device() -> Device {
        Device::from_quirk(
            &DEFINITION,
            "ACME",
            "acme.button",
            Arc::new(RecordingSink::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_builds_replacement_layout() {
        let device = device();
        assert_eq!(device.quirk(), "test");

        let ep = device.endpoint(1).unwrap();
        assert_eq!(ep.profile_id, PROFILE_ZHA);
        assert_eq!(ep.device_type, 0x0007);
        assert_eq!(
            ep.input_cluster_ids().collect::<Vec<_>>(),
            vec![ClusterId::Basic, ClusterId::Identify]
        );
        assert_eq!(
            ep.output_cluster_ids().collect::<Vec<_>>(),
            vec![ClusterId::Ota]
        );
    }

    #[test]
    fn test_rejects_unlisted_model() {
        let result = Device::from_quirk(
            &DEFINITION,
            "ACME",
            "acme.dimmer",
            Arc::new(RecordingSink::new()),
        );
        assert!(matches!(result, Err(QuirkError::SignatureMismatch { .. })));
    }

    #[test]
    fn test_routes_reports_to_input_clusters() {
        let device = device();
        let listener = Arc::new(RecordingListener::default());
        device.subscribe(listener.clone());

        device
            .handle_attribute_report(1, 0x0003, 0x0000, AttributeValue::Int(5))
            .unwrap();

        let cluster = device.cluster(1, ClusterId::Identify).unwrap();
        assert_eq!(cluster.attributes().get(0), Some(AttributeValue::Int(5)));
        assert_eq!(listener.updates.lock().len(), 1);
    }

    #[test]
    fn test_report_errors() {
        let device = device();
        assert!(matches!(
            device.handle_attribute_report(9, 0x0000, 0, AttributeValue::Int(0)),
            Err(QuirkError::UnknownEndpoint(9))
        ));
        assert!(matches!(
            device.handle_attribute_report(1, 0x0019, 0, AttributeValue::Int(0)),
            Err(QuirkError::ClusterNotPresent {
                endpoint: 1,
                cluster: 0x0019
            })
        ));
        assert!(matches!(
            device.handle_attribute_report(1, 0x0300, 0, AttributeValue::Int(0)),
            Err(QuirkError::UnknownCluster(0x0300))
        ));
    }
}
