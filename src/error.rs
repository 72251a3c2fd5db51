use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum QuirkError {
    #[error("Unknown cluster id: 0x{0:04X}")]
    UnknownCluster(u16),

    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(u8),

    #[error("Cluster 0x{cluster:04X} not present on endpoint {endpoint}")]
    ClusterNotPresent { endpoint: u8, cluster: u16 },

    #[error("Invalid quirk definition {quirk}: {reason}")]
    InvalidDefinition { quirk: &'static str, reason: String },

    #[error("Device {manufacturer}/{model} does not match quirk {quirk}")]
    SignatureMismatch {
        quirk: &'static str,
        manufacturer: String,
        model: String,
    },

    #[error("Malformed attribute payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QuirkError>;
