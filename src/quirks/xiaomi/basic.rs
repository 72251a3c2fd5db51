//! Basic cluster for Xiaomi devices.
//!
//! Besides the standard Basic attributes, Xiaomi devices periodically report a
//! manufacturer-specific attribute (0xFF01) holding a packed list of
//! `(tag, ZCL type, value)` records. Tag 0x01 carries the battery voltage,
//! which is forwarded to the power configuration cluster via the battery bus.

use crate::device::{BatteryBus, ClusterContext};
use crate::error::{QuirkError, Result};
use crate::zcl::{
    AttributeCache, AttributeValue, ClusterAddress, ClusterHandler, ClusterId, data_type,
};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Packed Xiaomi status report attribute
pub const XIAOMI_AQARA_ATTRIBUTE: u16 = 0xFF01;

/// Record tags inside the 0xFF01 report
pub mod tags {
    /// Battery voltage in mV
    pub const BATTERY_VOLTAGE_MV: u8 = 0x01;
    /// Device temperature in °C
    pub const TEMPERATURE: u8 = 0x03;
}

/// Decoded 0xFF01 report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XiaomiAttributes {
    pub battery_voltage_mv: Option<u16>,
    pub temperature: Option<i64>,
    /// Every record by tag, including the ones above.
    pub records: BTreeMap<u8, AttributeValue>,
}

impl XiaomiAttributes {
    /// Decode a packed report, failing on the first malformed record.
    pub fn parse(data: &[u8]) -> Result<Self> {
        match Self::parse_partial(data) {
            (attributes, None) => Ok(attributes),
            (_, Some(e)) => Err(e),
        }
    }

    /// Decode a packed report up to the first malformed record.
    ///
    /// Records decoded before the failure are kept and the error is returned
    /// alongside them.
    pub fn parse_partial(data: &[u8]) -> (Self, Option<QuirkError>) {
        let mut attributes = Self::default();
        let error = decode_records(data, &mut attributes.records).err();

        attributes.battery_voltage_mv = attributes
            .records
            .get(&tags::BATTERY_VOLTAGE_MV)
            .and_then(AttributeValue::as_int)
            .and_then(|mv| u16::try_from(mv).ok());
        attributes.temperature = attributes
            .records
            .get(&tags::TEMPERATURE)
            .and_then(AttributeValue::as_int);

        (attributes, error)
    }
}

fn decode_records(mut data: &[u8], records: &mut BTreeMap<u8, AttributeValue>) -> Result<()> {
    while !data.is_empty() {
        let [tag, type_id, rest @ ..] = data else {
            return Err(QuirkError::MalformedPayload(format!(
                "dangling byte 0x{:02X} at end of 0xFF01 report",
                data[0]
            )));
        };
        let (value, consumed) = data_type::decode(*type_id, rest)?;
        records.insert(*tag, value);
        data = &rest[consumed..];
    }
    Ok(())
}

pub struct BasicCluster {
    attributes: AttributeCache,
    battery: Arc<BatteryBus>,
}

impl BasicCluster {
    pub fn new(endpoint_id: u8, battery: Arc<BatteryBus>) -> Self {
        Self {
            attributes: AttributeCache::new(ClusterAddress::new(endpoint_id, ClusterId::Basic)),
            battery,
        }
    }

    pub fn create(ctx: &ClusterContext) -> Arc<dyn ClusterHandler> {
        Arc::new(Self::new(ctx.endpoint_id, ctx.battery.clone()))
    }

    fn handle_aqara_report(&self, value: &AttributeValue) {
        let Some(data) = value.as_bytes() else {
            warn!("[Xiaomi] 0xFF01 report is not a byte string: {}", value);
            return;
        };

        let (attributes, error) = XiaomiAttributes::parse_partial(data);
        if let Some(e) = error {
            warn!("[Xiaomi] Skipping rest of 0xFF01 report: {}", e);
        }
        debug!("[Xiaomi] 0xFF01 report: {:?}", attributes);

        if let Some(mv) = attributes.battery_voltage_mv {
            self.battery.battery_reported(mv);
        }
    }
}

impl ClusterHandler for BasicCluster {
    fn cluster_id(&self) -> ClusterId {
        ClusterId::Basic
    }

    fn attributes(&self) -> &AttributeCache {
        &self.attributes
    }

    fn update_attribute(&self, attr_id: u16, value: AttributeValue) {
        if attr_id == XIAOMI_AQARA_ATTRIBUTE {
            self.handle_aqara_report(&value);
        }
        self.attributes.update(attr_id, value);
    }
}
