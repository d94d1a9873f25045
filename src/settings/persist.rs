//! # Persisted Settings Record
//!
//! The JSON record shared by the settings commands and the curve store:
//!
//! ```json
//! {
//!   "key": "C",
//!   "multiplier": 0.7,
//!   "deadzone": 0.1,
//!   "graph": [[0.0, 0.0], [0.5, 0.2], [1.0, 1.0]]
//! }
//! ```
//!
//! Loading never fails. Each field is read independently; a missing or
//! invalid field falls back to its default and the rest of the record is kept.

use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::{ExitKey, DEFAULT_DEADZONE, DEFAULT_KEY, DEFAULT_MULTIPLIER};
use crate::error::Result;

/// On-disk settings record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistedRecord {
    pub key: String,
    pub multiplier: f64,
    pub deadzone: f64,
    /// `None` when the record holds no usable curve.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<Vec<[f64; 2]>>,
}

impl Default for PersistedRecord {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_string(),
            multiplier: DEFAULT_MULTIPLIER,
            deadzone: DEFAULT_DEADZONE,
            graph: None,
        }
    }
}

impl PersistedRecord {
    /// Reads the record at `path`, substituting defaults for anything missing.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents),
            Err(e) => {
                debug!("No settings at {} ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parses a record leniently, field by field.
    pub fn from_json(contents: &str) -> Self {
        let value: Value = match serde_json::from_str(contents) {
            Ok(value) => value,
            Err(e) => {
                warn!("Settings file is not valid JSON ({}), using defaults", e);
                return Self::default();
            }
        };

        let Some(object) = value.as_object() else {
            warn!("Settings file is not a JSON object, using defaults");
            return Self::default();
        };

        let defaults = Self::default();

        let key = match object.get("key") {
            Some(v) => match v.as_str().and_then(ExitKey::parse) {
                Some(key) => key.to_string(),
                None => {
                    warn!("Ignoring invalid key {}, using '{}'", v, DEFAULT_KEY);
                    defaults.key
                }
            },
            None => defaults.key,
        };

        let multiplier = match object.get("multiplier") {
            Some(v) => match v.as_f64().filter(|m| m.is_finite()) {
                Some(m) => m,
                None => {
                    warn!("Ignoring invalid multiplier {}, using {}", v, DEFAULT_MULTIPLIER);
                    defaults.multiplier
                }
            },
            None => defaults.multiplier,
        };

        let deadzone = match object.get("deadzone") {
            Some(v) => match v.as_f64().filter(|d| (0.0..1.0).contains(d)) {
                Some(d) => d,
                None => {
                    warn!("Ignoring invalid deadzone {}, using {}", v, DEFAULT_DEADZONE);
                    defaults.deadzone
                }
            },
            None => defaults.deadzone,
        };

        let graph = object.get("graph").and_then(|v| {
            let pairs = parse_graph(v);
            if pairs.is_none() {
                warn!("Ignoring malformed graph in settings file");
            }
            pairs
        });

        Self {
            key,
            multiplier,
            deadzone,
            graph,
        }
    }

    /// Writes the record as pretty-printed JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        debug!("Saved settings to {}", path.display());
        Ok(())
    }
}

/// Accepts only an array of two-element numeric arrays.
fn parse_graph(value: &Value) -> Option<Vec<[f64; 2]>> {
    value
        .as_array()?
        .iter()
        .map(|entry| match entry.as_array()?.as_slice() {
            [x, y] => Some([x.as_f64()?, y.as_f64()?]),
            _ => None,
        })
        .collect()
}
