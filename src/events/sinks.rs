//! Event sink implementations.

use super::{ButtonEvent, EventSink};
use crate::zcl::ClusterAddress;
use log::warn;
use parking_lot::Mutex;
use serde::Serialize;
use std::io::Write;

/// One published event as written by [`JsonLinesSink`].
#[derive(Debug, Serialize)]
struct EventLine<'a> {
    kind: &'static str,
    source: &'a ClusterAddress,
    event: &'a ButtonEvent,
}

/// Writes each event as one JSON object per line.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the sink and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn publish(&self, kind: &'static str, source: &ClusterAddress, event: &ButtonEvent) {
        let line = EventLine {
            kind,
            source,
            event,
        };

        let mut writer = self.writer.lock();

        // Publishing never fails the caller
        if let Err(e) = write_line(&mut *writer, &line) {
            warn!("[Events] Failed to write {} event: {}", kind, e);
        }
    }
}

fn write_line<W: Write>(writer: &mut W, line: &EventLine<'_>) -> std::io::Result<()> {
    serde_json::to_writer(&mut *writer, line)?;
    writeln!(writer)?;
    writer.flush()
}

/// Keeps every published event in memory.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(&'static str, ClusterAddress, ButtonEvent)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events published so far.
    pub fn events(&self) -> Vec<(&'static str, ClusterAddress, ButtonEvent)> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, kind: &'static str, source: &ClusterAddress, event: &ButtonEvent) {
        self.events.lock().push((kind, *source, event.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ZHA_SEND_EVENT;
    use crate::zcl::{AttributeValue, ClusterId};

    #[test]
    fn test_json_lines_format() {
        let sink = JsonLinesSink::new(Vec::new());
        let source = ClusterAddress::new(2, ClusterId::MultistateInput);
        let event = ButtonEvent::new(Some("right"), Some("double"), 85, AttributeValue::Int(2));

        sink.publish(ZHA_SEND_EVENT, &source, &event);
        sink.publish(ZHA_SEND_EVENT, &source, &event);

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["kind"], "zha_send_event");
        assert_eq!(parsed["source"]["endpoint_id"], 2);
        assert_eq!(parsed["source"]["cluster_id"], 18);
        assert_eq!(parsed["event"]["action"], "right_double");
    }

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        assert!(sink.is_empty());

        let source = ClusterAddress::new(1, ClusterId::MultistateInput);
        let event = ButtonEvent::new(Some("left"), Some("single"), 85, AttributeValue::Int(1));
        sink.publish(ZHA_SEND_EVENT, &source, &event);

        let events = sink.events();
        assert_eq!(sink.len(), 1);
        assert_eq!(events[0].0, ZHA_SEND_EVENT);
        assert_eq!(events[0].1, source);
        assert_eq!(events[0].2.action, "left_single");
    }
}
