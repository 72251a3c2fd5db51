//! Development tool replaying attribute reports through a quirked device.
//!
//! Usage:
//!   cargo run --bin quirk-replay -- reports.jsonl
//!   echo '{"endpoint":1,"cluster":18,"attribute":85,"value":1}' | cargo run --bin quirk-replay
//!
//! Each input line is one attribute report. Every emitted device event is
//! written to stdout as one JSON line. The device identity is read from
//! DEVICE_MANUFACTURER / DEVICE_MODEL (or a .env file).

use clap::Parser;
use log::{error, info, warn};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use zigbee_quirks::config::{Config, load_dotenv};
use zigbee_quirks::device::{Device, QuirkDefinition, SimpleDescriptor};
use zigbee_quirks::error::{QuirkError, Result};
use zigbee_quirks::events::JsonLinesSink;
use zigbee_quirks::quirks;
use zigbee_quirks::zcl::{AttributeListener, AttributeReport, AttributeValue, ClusterAddress};

#[derive(Parser)]
#[command(name = "quirk-replay")]
#[command(about = "Replay Zigbee attribute reports through a device quirk")]
struct Cli {
    /// JSON-lines file with attribute reports (stdin when omitted)
    input: Option<PathBuf>,

    /// JSON file with the device's simple descriptors, enables full signature matching
    #[arg(long, env = "DEVICE_DESCRIPTORS")]
    descriptors: Option<PathBuf>,

    /// Also print generic attribute updates
    #[arg(long)]
    show_attributes: bool,
}

/// Prints generic attribute updates as JSON lines.
struct AttributePrinter;

#[derive(Serialize)]
struct AttributeLine<'a> {
    kind: &'static str,
    source: &'a ClusterAddress,
    attribute: u16,
    value: &'a AttributeValue,
}

impl AttributeListener for AttributePrinter {
    fn attribute_updated(&self, source: &ClusterAddress, attr_id: u16, value: &AttributeValue) {
        let line = AttributeLine {
            kind: "attribute_updated",
            source,
            attribute: attr_id,
            value,
        };
        match serde_json::to_string(&line) {
            Ok(json) => {
                let mut stdout = io::stdout().lock();
                if let Err(e) = writeln!(stdout, "{json}") {
                    warn!("Failed to write attribute update: {}", e);
                }
            }
            Err(e) => warn!("Failed to encode attribute update: {}", e),
        }
    }
}

fn load_descriptors(path: &Path) -> Result<Vec<SimpleDescriptor>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Quirk covering the configured device, checked against its descriptors when given.
fn select_quirk(
    manufacturer: &str,
    model: &str,
    descriptors: Option<&[SimpleDescriptor]>,
) -> Result<&'static QuirkDefinition> {
    let quirk = quirks::all()
        .into_iter()
        .find(|q| q.matches_model(manufacturer, model))
        .ok_or_else(|| QuirkError::SignatureMismatch {
            quirk: "any",
            manufacturer: manufacturer.to_string(),
            model: model.to_string(),
        })?;

    if let Some(descriptors) = descriptors {
        if !quirk.matches(manufacturer, model, descriptors) {
            return Err(QuirkError::SignatureMismatch {
                quirk: quirk.name,
                manufacturer: manufacturer.to_string(),
                model: model.to_string(),
            });
        }
        info!("Device descriptors match {} signature", quirk.name);
    }

    Ok(quirk)
}

/// Feed every report line through the device, returning how many were applied.
fn replay(device: &Device, reader: impl BufRead) -> Result<usize> {
    let mut replayed = 0usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let report: AttributeReport = match serde_json::from_str(line) {
            Ok(report) => report,
            Err(e) => {
                warn!("Line {}: invalid report: {}", index + 1, e);
                continue;
            }
        };

        // A report for a cluster the quirk does not install is skipped, not fatal
        if let Err(e) = device.handle_report(report) {
            warn!("Line {}: {}", index + 1, e);
            continue;
        }
        replayed += 1;
    }
    Ok(replayed)
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env();
    let manufacturer = &config.device.manufacturer;
    let model = &config.device.model;

    let descriptors = match &cli.descriptors {
        Some(path) => Some(load_descriptors(path)?),
        None => None,
    };
    let quirk = select_quirk(manufacturer, model, descriptors.as_deref())?;

    let sink = Arc::new(JsonLinesSink::new(io::stdout()));
    let device = Device::from_quirk(quirk, manufacturer, model, sink)?;
    for endpoint in device.endpoints() {
        info!(
            "{} {} endpoint {}: profile 0x{:04X}, device type 0x{:04X}",
            device.manufacturer(),
            device.model(),
            endpoint.endpoint_id,
            endpoint.profile_id,
            endpoint.device_type
        );
    }
    if cli.show_attributes {
        device.subscribe(Arc::new(AttributePrinter));
    }

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let replayed = replay(&device, reader)?;

    info!("Replayed {} report(s) through {}", replayed, device.quirk());
    Ok(())
}

fn main() {
    // Load .env file before anything else
    load_dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zigbee_quirks::events::RecordingSink;
    use zigbee_quirks::quirks::xiaomi::remote_b286acn01::QUIRK;

    const DESCRIPTORS: &str = r#"[
        {"endpoint": 1, "profile": 260, "device_type": 24321,
         "input_clusters": [0, 3, 25, 65535, 18],
         "output_clusters": [0, 4, 3, 5, 25, 65535, 18]},
        {"endpoint": 2, "profile": 260, "device_type": 24322,
         "input_clusters": [3, 18], "output_clusters": [4, 3, 5, 18]},
        {"endpoint": 3, "profile": 260, "device_type": 24323,
         "input_clusters": [3, 12], "output_clusters": [4, 3, 5, 12]}
    ]"#;

    #[test]
    fn test_select_quirk_by_model() {
        let quirk = select_quirk("LUMI", "lumi.sensor_86sw2", None).unwrap();
        assert_eq!(quirk.name, "RemoteB286ACN01");

        let err = select_quirk("LUMI", "lumi.sensor_switch", None).unwrap_err();
        assert!(matches!(
            err,
            QuirkError::SignatureMismatch { quirk: "any", .. }
        ));
    }

    #[test]
    fn test_select_quirk_checks_descriptors() {
        let mut descriptors: Vec<SimpleDescriptor> = serde_json::from_str(DESCRIPTORS).unwrap();
        let result = select_quirk("LUMI", "lumi.remote.b286acn01", Some(&descriptors));
        assert!(result.is_ok());

        descriptors.pop();
        let err = select_quirk("LUMI", "lumi.remote.b286acn01", Some(&descriptors)).unwrap_err();
        assert!(matches!(
            err,
            QuirkError::SignatureMismatch {
                quirk: "RemoteB286ACN01",
                ..
            }
        ));
    }

    #[test]
    fn test_replay_skips_bad_lines() {
        let sink = Arc::new(RecordingSink::new());
        let device =
            Device::from_quirk(&QUIRK, "LUMI", "lumi.remote.b286acn01", sink.clone()).unwrap();

        let input = r#"
# left key single press
{"endpoint":1,"cluster":18,"attribute":85,"value":1}
not json
{"endpoint":9,"cluster":18,"attribute":85,"value":1}
{"endpoint":3,"cluster":18,"attribute":85,"value":2}
"#;
        let replayed = replay(&device, input.as_bytes()).unwrap();

        assert_eq!(replayed, 2);
        let actions: Vec<_> = sink
            .events()
            .into_iter()
            .map(|(_, _, e)| e.action)
            .collect();
        assert_eq!(actions, vec!["left_single", "both_double"]);
    }
}
