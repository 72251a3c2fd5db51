//! Aqara double key wall switch (lumi.remote.b286acn01 / lumi.sensor_86sw2).
//!
//! The switch reports presses on the multistate input cluster of endpoint 1
//! (left key), 2 (right key) and 3 (both keys). The status attribute carries
//! the press type as a raw code, which is translated into a `zha_send_event`
//! button event and mirrored into attribute 0 for display.

use super::LUMI;
use super::basic::BasicCluster;
use super::power::PowerConfigurationCluster;
use crate::device::ClusterSlot::Standard;
use crate::device::{
    ClusterContext, ClusterSlot, EndpointReplacement, EndpointSignature, ModelInfo, QuirkDefinition,
};
use crate::events::{ButtonEvent, EventSink, ZHA_SEND_EVENT};
use crate::zcl::{
    AttributeCache, AttributeValue, ClusterAddress, ClusterHandler, ClusterId, PROFILE_ZHA,
};
use log::info;
use parking_lot::RwLock;
use std::sync::Arc;
use strum::{FromRepr, IntoStaticStr};

/// Multistate input status attribute carrying the press type (85 decimal)
pub const STATUS_TYPE_ATTR: u16 = 0x0055;

/// Attribute receiving the composite action string for display
pub const ACTION_DISPLAY_ATTR: u16 = 0x0000;

pub const XIAOMI_DEVICE_TYPE: u16 = 0x5F01;
pub const XIAOMI_DEVICE_TYPE2: u16 = 0x5F02;
pub const XIAOMI_DEVICE_TYPE3: u16 = 0x5F03;

/// Press type by raw status code.
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromRepr, IntoStaticStr)]
#[repr(u8)]
pub enum PressType {
    #[strum(serialize = "long press")]
    LongPress = 0,
    #[strum(serialize = "single")]
    Single = 1,
    #[strum(serialize = "double")]
    Double = 2,
}

impl PressType {
    /// Press type for a raw status value, `None` for unknown codes.
    pub fn from_value(value: &AttributeValue) -> Option<Self> {
        value
            .as_int()
            .and_then(|code| u8::try_from(code).ok())
            .and_then(Self::from_repr)
    }

    pub fn label(self) -> &'static str {
        self.into()
    }
}

/// Key label by endpoint id.
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromRepr, IntoStaticStr)]
#[repr(u8)]
pub enum Button {
    #[strum(serialize = "left")]
    Left = 1,
    #[strum(serialize = "right")]
    Right = 2,
    #[strum(serialize = "both")]
    Both = 3,
}

impl Button {
    pub fn from_endpoint(endpoint_id: u8) -> Option<Self> {
        Self::from_repr(endpoint_id)
    }

    pub fn label(self) -> &'static str {
        self.into()
    }
}

/// Multistate input cluster translating status reports into button events.
pub struct MultistateInputCluster {
    attributes: AttributeCache,
    events: Arc<dyn EventSink>,
    /// Press type of the last status report, `None` until one arrives or when
    /// the last code was not recognised.
    current_state: RwLock<Option<PressType>>,
}

impl MultistateInputCluster {
    pub fn new(endpoint_id: u8, events: Arc<dyn EventSink>) -> Self {
        Self {
            attributes: AttributeCache::new(ClusterAddress::new(
                endpoint_id,
                ClusterId::MultistateInput,
            )),
            events,
            current_state: RwLock::new(None),
        }
    }

    pub fn create(ctx: &ClusterContext) -> Arc<dyn ClusterHandler> {
        Arc::new(Self::new(ctx.endpoint_id, ctx.events.clone()))
    }

    pub fn endpoint_id(&self) -> u8 {
        self.attributes.address().endpoint_id
    }

    /// Press type of the last status report.
    pub fn current_state(&self) -> Option<PressType> {
        *self.current_state.read()
    }

    fn handle_status(&self, value: AttributeValue) {
        let press_type = PressType::from_value(&value);
        *self.current_state.write() = press_type;

        let button = Button::from_endpoint(self.endpoint_id());
        let event = ButtonEvent::new(
            button.map(Button::label),
            press_type.map(PressType::label),
            STATUS_TYPE_ATTR,
            value,
        );
        info!(
            "[Quirk] ep{} button action: {} (raw {:?})",
            self.endpoint_id(),
            event.action,
            event.value
        );

        self.events
            .publish(ZHA_SEND_EVENT, self.attributes.address(), &event);
        self.attributes
            .update(ACTION_DISPLAY_ATTR, AttributeValue::Text(event.action));
    }
}

impl ClusterHandler for MultistateInputCluster {
    fn cluster_id(&self) -> ClusterId {
        ClusterId::MultistateInput
    }

    fn attributes(&self) -> &AttributeCache {
        &self.attributes
    }

    fn update_attribute(&self, attr_id: u16, value: AttributeValue) {
        self.attributes.update(attr_id, value.clone());
        if attr_id == STATUS_TYPE_ATTR {
            self.handle_status(value);
        }
    }
}

const MULTISTATE_INPUT: ClusterSlot = ClusterSlot::Custom {
    cluster_id: ClusterId::MultistateInput,
    factory: MultistateInputCluster::create,
};

const XIAOMI_BASIC: ClusterSlot = ClusterSlot::Custom {
    cluster_id: ClusterId::Basic,
    factory: BasicCluster::create,
};

const XIAOMI_POWER_CONFIGURATION: ClusterSlot = ClusterSlot::Custom {
    cluster_id: ClusterId::PowerConfiguration,
    factory: PowerConfigurationCluster::create,
};

pub static QUIRK: QuirkDefinition = QuirkDefinition {
    name: "RemoteB286ACN01",
    models: &[
        ModelInfo {
            manufacturer: LUMI,
            model: "lumi.remote.b286acn01",
        },
        ModelInfo {
            manufacturer: LUMI,
            model: "lumi.sensor_86sw2",
        },
    ],
    signature: &[
        // <SimpleDescriptor endpoint=1 profile=260 device_type=24321
        // input_clusters=[0, 3, 25, 65535, 18]
        // output_clusters=[0, 4, 3, 5, 25, 65535, 18]>
        EndpointSignature {
            endpoint_id: 1,
            profile_id: PROFILE_ZHA,
            device_type: XIAOMI_DEVICE_TYPE,
            input_clusters: &[
                ClusterId::Basic,
                ClusterId::Identify,
                ClusterId::Ota,
                ClusterId::XiaomiManufacturer,
                ClusterId::MultistateInput,
            ],
            output_clusters: &[
                ClusterId::Basic,
                ClusterId::Identify,
                ClusterId::Groups,
                ClusterId::Scenes,
                ClusterId::Ota,
                ClusterId::XiaomiManufacturer,
                ClusterId::MultistateInput,
            ],
        },
        // <SimpleDescriptor endpoint=2 profile=260 device_type=24322
        // input_clusters=[3, 18]
        // output_clusters=[4, 3, 5, 18]>
        EndpointSignature {
            endpoint_id: 2,
            profile_id: PROFILE_ZHA,
            device_type: XIAOMI_DEVICE_TYPE2,
            input_clusters: &[ClusterId::Identify, ClusterId::MultistateInput],
            output_clusters: &[
                ClusterId::Identify,
                ClusterId::Groups,
                ClusterId::Scenes,
                ClusterId::MultistateInput,
            ],
        },
        // <SimpleDescriptor endpoint=3 profile=260 device_type=24323
        // input_clusters=[3, 12]
        // output_clusters=[4, 3, 5, 12]>
        EndpointSignature {
            endpoint_id: 3,
            profile_id: PROFILE_ZHA,
            device_type: XIAOMI_DEVICE_TYPE3,
            input_clusters: &[ClusterId::Identify, ClusterId::AnalogInput],
            output_clusters: &[
                ClusterId::Identify,
                ClusterId::Groups,
                ClusterId::Scenes,
                ClusterId::AnalogInput,
            ],
        },
    ],
    replacement: &[
        EndpointReplacement {
            endpoint_id: 1,
            profile_id: None,
            device_type: XIAOMI_DEVICE_TYPE,
            input_clusters: &[
                XIAOMI_BASIC,
                XIAOMI_POWER_CONFIGURATION,
                Standard(ClusterId::Identify),
                Standard(ClusterId::Ota),
                Standard(ClusterId::XiaomiManufacturer),
                MULTISTATE_INPUT,
            ],
            output_clusters: &[
                Standard(ClusterId::Basic),
                Standard(ClusterId::Identify),
                Standard(ClusterId::Groups),
                Standard(ClusterId::Scenes),
                Standard(ClusterId::Ota),
                Standard(ClusterId::XiaomiManufacturer),
                MULTISTATE_INPUT,
            ],
        },
        EndpointReplacement {
            endpoint_id: 2,
            profile_id: None,
            device_type: XIAOMI_DEVICE_TYPE2,
            input_clusters: &[Standard(ClusterId::Identify), MULTISTATE_INPUT],
            output_clusters: &[
                Standard(ClusterId::Identify),
                Standard(ClusterId::Groups),
                Standard(ClusterId::Scenes),
                MULTISTATE_INPUT,
            ],
        },
        EndpointReplacement {
            endpoint_id: 3,
            profile_id: None,
            device_type: XIAOMI_DEVICE_TYPE3,
            input_clusters: &[Standard(ClusterId::Identify), MULTISTATE_INPUT],
            output_clusters: &[
                Standard(ClusterId::Identify),
                Standard(ClusterId::Groups),
                Standard(ClusterId::Scenes),
                Standard(ClusterId::AnalogInput),
                MULTISTATE_INPUT,
            ],
        },
    ],
};
