//! Device model assembled from a quirk's replacement table.

pub mod bus;
pub mod descriptor;
pub mod model;

pub use bus::{BatteryBus, BatteryListener};
pub use descriptor::{
    ClusterFactory, ClusterSlot, EndpointReplacement, EndpointSignature, ModelInfo, QuirkDefinition,
    SimpleDescriptor,
};
pub use model::{ClusterContext, Device, Endpoint};
