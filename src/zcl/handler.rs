use super::{AttributeCache, AttributeValue, ClusterAddress, ClusterId};

/// A cluster instance installed on a device endpoint.
///
/// The host delivers every attribute report through `update_attribute`. The
/// default implementation is the plain generic path: the value is recorded in
/// the attribute cache and listeners are notified. Custom clusters override it
/// to interpret vendor-specific attributes.
pub trait ClusterHandler: Send + Sync {
    fn cluster_id(&self) -> ClusterId;

    fn attributes(&self) -> &AttributeCache;

    fn update_attribute(&self, attr_id: u16, value: AttributeValue) {
        self.attributes().update(attr_id, value);
    }
}

/// Cluster without any device-specific behaviour.
pub struct GenericCluster {
    cluster_id: ClusterId,
    attributes: AttributeCache,
}

impl GenericCluster {
    pub fn new(endpoint_id: u8, cluster_id: ClusterId) -> Self {
        Self {
            cluster_id,
            attributes: AttributeCache::new(ClusterAddress::new(endpoint_id, cluster_id)),
        }
    }
}

impl ClusterHandler for GenericCluster {
    fn cluster_id(&self) -> ClusterId {
        self.cluster_id
    }

    fn attributes(&self) -> &AttributeCache {
        &self.attributes
    }
}
