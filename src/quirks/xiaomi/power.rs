//! Power configuration cluster for battery-powered Xiaomi devices.
//!
//! Xiaomi devices do not report battery attributes on this cluster. The
//! voltage arrives inside the Basic cluster's 0xFF01 report and is forwarded
//! here over the device battery bus.

use crate::device::{BatteryListener, ClusterContext};
use crate::zcl::{AttributeCache, AttributeValue, ClusterAddress, ClusterHandler, ClusterId};
use log::debug;
use std::sync::Arc;

/// BatteryVoltage attribute (uint8, 100 mV units)
pub const BATTERY_VOLTAGE_ATTR: u16 = 0x0020;
/// BatteryPercentageRemaining attribute (uint8, half-percent units)
pub const BATTERY_PERCENTAGE_REMAINING_ATTR: u16 = 0x0021;

/// Voltage reported by a full CR2032 cell
pub const MAX_VOLTS_MV: u16 = 3100;
/// Voltage at which the device stops reporting reliably
pub const MIN_VOLTS_MV: u16 = 2820;

pub struct PowerConfigurationCluster {
    attributes: AttributeCache,
}

impl PowerConfigurationCluster {
    pub fn new(endpoint_id: u8) -> Self {
        Self {
            attributes: AttributeCache::new(ClusterAddress::new(
                endpoint_id,
                ClusterId::PowerConfiguration,
            )),
        }
    }

    /// Create the cluster and subscribe it to the device battery bus.
    pub fn create(ctx: &ClusterContext) -> Arc<dyn ClusterHandler> {
        let cluster = Arc::new(Self::new(ctx.endpoint_id));
        ctx.battery.add_listener(cluster.clone());
        cluster
    }
}

/// Remaining battery in half-percent units (0..=200).
pub fn battery_percentage(millivolts: u16) -> u8 {
    let clamped = millivolts.clamp(MIN_VOLTS_MV, MAX_VOLTS_MV);
    let fraction = f64::from(clamped - MIN_VOLTS_MV) / f64::from(MAX_VOLTS_MV - MIN_VOLTS_MV);
    (fraction * 200.0).round().min(200.0) as u8
}

/// Battery voltage in 100 mV units.
pub fn battery_voltage_decivolts(millivolts: u16) -> u8 {
    let decivolts = (f64::from(millivolts) / 100.0).round();
    decivolts.min(f64::from(u8::MAX)) as u8
}

impl BatteryListener for PowerConfigurationCluster {
    fn battery_reported(&self, millivolts: u16) {
        let voltage = battery_voltage_decivolts(millivolts);
        let percentage = battery_percentage(millivolts);
        debug!(
            "[Xiaomi] ep{} battery {} mV -> voltage {}, percentage {}/200",
            self.attributes.address().endpoint_id,
            millivolts,
            voltage,
            percentage
        );

        self.attributes
            .update(BATTERY_VOLTAGE_ATTR, AttributeValue::Int(voltage.into()));
        self.attributes.update(
            BATTERY_PERCENTAGE_REMAINING_ATTR,
            AttributeValue::Int(percentage.into()),
        );
    }
}

impl ClusterHandler for PowerConfigurationCluster {
    fn cluster_id(&self) -> ClusterId {
        ClusterId::PowerConfiguration
    }

    fn attributes(&self) -> &AttributeCache {
        &self.attributes
    }
}
