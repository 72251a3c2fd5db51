use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::quirks::xiaomi::LUMI;

/// Load environment variables from .env file with robust parsing.
/// Handles values with spaces without requiring quotes.
pub fn load_dotenv() {
    load_dotenv_from(Path::new(".env"));
}

/// Load environment variables from the given file.
///
/// Variables already present in the environment are left untouched.
pub fn load_dotenv_from(env_path: &Path) {
    if !env_path.exists() {
        return;
    }

    let content = match fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for (key, value) in parse_dotenv(&content) {
        // Only set if not already set (env vars take precedence)
        if std::env::var(key).is_err() {
            // SAFETY: We're single-threaded at this point (called before any device is built)
            unsafe { std::env::set_var(key, value) };
        }
    }
}

/// Split .env content into key/value pairs, skipping blanks and comments.
fn parse_dotenv(content: &str) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Find the first '=' and split there
        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim();
            let mut value = line[eq_pos + 1..].trim();

            // Remove surrounding quotes if present
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = &value[1..value.len() - 1];
            }

            if !key.is_empty() {
                pairs.push((key, value));
            }
        }
    }

    pairs
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub device: DeviceConfig,
}

/// Identity the device reports in its Basic cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub manufacturer: String,
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: DeviceConfig {
                manufacturer: LUMI.to_string(),
                model: "lumi.remote.b286acn01".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(manufacturer) = std::env::var("DEVICE_MANUFACTURER") {
            config.device.manufacturer = manufacturer;
        }
        if let Ok(model) = std::env::var("DEVICE_MODEL") {
            config.device.model = model;
        }

        config
    }
}
