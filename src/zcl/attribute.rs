//! Generic attribute update path.
//!
//! Every cluster records incoming attribute values in an [`AttributeCache`].
//! Display layers that only understand plain attribute changes subscribe to the
//! cache through [`AttributeListener`] and are notified on every update,
//! mirroring how cluster notifiers push changes to subscribers.

use super::ClusterId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Dynamically typed attribute payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl AttributeValue {
    /// Integer view of the value, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Raw bytes of a byte or text value.
    ///
    /// Xiaomi devices pack structured reports into character strings, so text
    /// values are exposed as their bytes too.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AttributeValue::Bytes(b) => Some(b),
            AttributeValue::Text(s) => Some(s.as_bytes()),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(v) => write!(f, "{v}"),
            AttributeValue::Int(v) => write!(f, "{v}"),
            AttributeValue::Float(v) => write!(f, "{v}"),
            AttributeValue::Text(v) => write!(f, "{v:?}"),
            AttributeValue::Bytes(v) => {
                for b in v {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
        }
    }
}

/// Attribute report as delivered by the host stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeReport {
    pub endpoint: u8,
    pub cluster: u16,
    pub attribute: u16,
    pub value: AttributeValue,
}

/// Endpoint and cluster a value or event originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClusterAddress {
    pub endpoint_id: u8,
    pub cluster_id: ClusterId,
}

impl ClusterAddress {
    pub fn new(endpoint_id: u8, cluster_id: ClusterId) -> Self {
        Self {
            endpoint_id,
            cluster_id,
        }
    }
}

/// Observer of the generic attribute update path.
pub trait AttributeListener: Send + Sync {
    /// Called after `value` has been stored for `attr_id`.
    fn attribute_updated(&self, source: &ClusterAddress, attr_id: u16, value: &AttributeValue);
}

/// Last-known attribute values of one cluster instance.
pub struct AttributeCache {
    address: ClusterAddress,
    values: RwLock<BTreeMap<u16, AttributeValue>>,
    listeners: RwLock<Vec<Arc<dyn AttributeListener>>>,
}

impl AttributeCache {
    pub fn new(address: ClusterAddress) -> Self {
        Self {
            address,
            values: RwLock::new(BTreeMap::new()),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn address(&self) -> &ClusterAddress {
        &self.address
    }

    /// Store a value and notify listeners in registration order.
    pub fn update(&self, attr_id: u16, value: AttributeValue) {
        log::trace!(
            "[Zigbee] ep{} {} attr 0x{:04X} = {}",
            self.address.endpoint_id,
            self.address.cluster_id,
            attr_id,
            value
        );
        self.values.write().insert(attr_id, value.clone());

        // Snapshot so listeners may subscribe further listeners without deadlocking
        let listeners: Vec<_> = self.listeners.read().clone();
        for listener in listeners {
            listener.attribute_updated(&self.address, attr_id, &value);
        }
    }

    /// Last stored value of an attribute.
    pub fn get(&self, attr_id: u16) -> Option<AttributeValue> {
        self.values.read().get(&attr_id).cloned()
    }

    /// Register a listener for subsequent updates.
    pub fn add_listener(&self, listener: Arc<dyn AttributeListener>) {
        self.listeners.write().push(listener);
    }
}
