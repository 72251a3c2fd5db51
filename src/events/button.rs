//! Button press event payload.

use crate::zcl::AttributeValue;
use serde::Serialize;

/// Text used in action strings when a lookup has no label.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Semantic button press derived from a raw attribute report.
///
/// `button` and `press_type` are `None` when the endpoint or raw code is not
/// recognised; they serialize as `null` while `action` carries
/// [`UNKNOWN_LABEL`] in their place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonEvent {
    pub button: Option<&'static str>,
    pub press_type: Option<&'static str>,
    #[serde(rename = "attribute_id")]
    pub attr_id: u16,
    pub value: AttributeValue,
    pub action: String,
}

impl ButtonEvent {
    pub fn new(
        button: Option<&'static str>,
        press_type: Option<&'static str>,
        attr_id: u16,
        value: AttributeValue,
    ) -> Self {
        let action = format!(
            "{}_{}",
            button.unwrap_or(UNKNOWN_LABEL),
            press_type.unwrap_or(UNKNOWN_LABEL)
        );
        Self {
            button,
            press_type,
            attr_id,
            value,
            action,
        }
    }
}
