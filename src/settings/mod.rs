//! # Settings Module
//!
//! User-editable scalar settings and the immutable snapshot handed to the
//! polling loop.
//!
//! ## Settings
//!
//! | Setting | Type | Default | Valid range |
//! |---------|------|---------|-------------|
//! | `key` | single letter or digit | `C` | A-Z, 0-9 |
//! | `multiplier` | real | `0.7` | any finite value (negative inverts) |
//! | `deadzone` | real | `0.1` | `0.0 <= d < 1.0` |
//!
//! Each setting is addressed through [`SettingKind`] and carries its typed
//! value in [`SettingValue`].
//!
//! ## Usage
//!
//! ```
//! use stick_cursor::settings::{SettingKind, SettingValue, Settings};
//!
//! let mut settings = Settings::default();
//! let value = SettingKind::Deadzone.parse_value("0.2")?;
//! settings.apply(value);
//!
//! assert_eq!(settings.get(SettingKind::Deadzone), SettingValue::Deadzone(0.2));
//! assert!(SettingKind::Deadzone.parse_value("1.5").is_err());
//! # Ok::<(), stick_cursor::error::StickCursorError>(())
//! ```

pub mod persist;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::curve::evaluator::evaluate;
use crate::curve::Curve;
use crate::error::{Result, StickCursorError};
use persist::PersistedRecord;

/// Default exit key.
pub const DEFAULT_KEY: char = 'C';

/// Default output multiplier.
pub const DEFAULT_MULTIPLIER: f64 = 0.7;

/// Default deadzone.
pub const DEFAULT_DEADZONE: f64 = 0.1;

/// Key that suspends the polling loop.
///
/// Restricted to ASCII letters and digits, stored upper-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitKey(char);

impl ExitKey {
    /// Accepts a single ASCII letter or digit.
    #[must_use]
    pub fn new(c: char) -> Option<Self> {
        c.is_ascii_alphanumeric()
            .then(|| Self(c.to_ascii_uppercase()))
    }

    /// Parses a one-character string.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut chars = text.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::new(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_char(self) -> char {
        self.0
    }
}

impl Default for ExitKey {
    fn default() -> Self {
        Self(DEFAULT_KEY)
    }
}

impl fmt::Display for ExitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one editable setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Key,
    Multiplier,
    Deadzone,
}

impl SettingKind {
    pub const ALL: [SettingKind; 3] = [Self::Key, Self::Multiplier, Self::Deadzone];

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Key => "Exit key",
            Self::Multiplier => "Multiplier",
            Self::Deadzone => "Deadzone",
        }
    }

    /// Parses user text into a typed value for this setting.
    ///
    /// # Errors
    ///
    /// Returns [`StickCursorError::InvalidSetting`] if the text is not a valid
    /// value for this setting.
    pub fn parse_value(self, text: &str) -> Result<SettingValue> {
        let text = text.trim();
        match self {
            Self::Key => ExitKey::parse(text).map(SettingValue::Key).ok_or_else(|| {
                StickCursorError::InvalidSetting(format!(
                    "key must be a single letter or digit, got '{}'",
                    text
                ))
            }),
            Self::Multiplier => {
                let value = parse_real(self, text)?;
                Ok(SettingValue::Multiplier(value))
            }
            Self::Deadzone => {
                let value = parse_real(self, text)?;
                if !(0.0..1.0).contains(&value) {
                    return Err(StickCursorError::InvalidSetting(format!(
                        "deadzone must be at least 0.0 and below 1.0, got {}",
                        value
                    )));
                }
                Ok(SettingValue::Deadzone(value))
            }
        }
    }
}

fn parse_real(kind: SettingKind, text: &str) -> Result<f64> {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(StickCursorError::InvalidSetting(format!(
            "{} must be a number, got '{}'",
            kind.label().to_lowercase(),
            text
        ))),
    }
}

impl FromStr for SettingKind {
    type Err = StickCursorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "key" => Ok(Self::Key),
            "multiplier" => Ok(Self::Multiplier),
            "deadzone" => Ok(Self::Deadzone),
            other => Err(StickCursorError::InvalidSetting(format!(
                "unknown setting '{}' (expected key, multiplier or deadzone)",
                other
            ))),
        }
    }
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Key => "key",
            Self::Multiplier => "multiplier",
            Self::Deadzone => "deadzone",
        };
        f.write_str(name)
    }
}

/// A typed setting value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingValue {
    Key(ExitKey),
    Multiplier(f64),
    Deadzone(f64),
}

impl SettingValue {
    #[must_use]
    pub fn kind(&self) -> SettingKind {
        match self {
            Self::Key(_) => SettingKind::Key,
            Self::Multiplier(_) => SettingKind::Multiplier,
            Self::Deadzone(_) => SettingKind::Deadzone,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{}", key),
            Self::Multiplier(value) | Self::Deadzone(value) => write!(f, "{}", value),
        }
    }
}

/// Mutable scalar settings, edited only while the loop is stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub exit_key: ExitKey,
    pub multiplier: f64,
    pub deadzone: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            exit_key: ExitKey::default(),
            multiplier: DEFAULT_MULTIPLIER,
            deadzone: DEFAULT_DEADZONE,
        }
    }
}

impl Settings {
    /// Loads the scalar settings from the record at `path`.
    ///
    /// Never fails; see [`PersistedRecord::load`].
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        Self::from_record(&PersistedRecord::load(path))
    }

    fn from_record(record: &PersistedRecord) -> Self {
        Self {
            exit_key: ExitKey::parse(&record.key).unwrap_or_default(),
            multiplier: record.multiplier,
            deadzone: record.deadzone,
        }
    }

    /// Writes the scalar settings, keeping the record's curve untouched.
    ///
    /// # Errors
    ///
    /// Returns error if the record cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut record = PersistedRecord::load(path);
        record.key = self.exit_key.to_string();
        record.multiplier = self.multiplier;
        record.deadzone = self.deadzone;
        record.save(path)
    }

    #[must_use]
    pub fn get(&self, kind: SettingKind) -> SettingValue {
        match kind {
            SettingKind::Key => SettingValue::Key(self.exit_key),
            SettingKind::Multiplier => SettingValue::Multiplier(self.multiplier),
            SettingKind::Deadzone => SettingValue::Deadzone(self.deadzone),
        }
    }

    pub fn apply(&mut self, value: SettingValue) {
        match value {
            SettingValue::Key(key) => self.exit_key = key,
            SettingValue::Multiplier(m) => self.multiplier = m,
            SettingValue::Deadzone(d) => self.deadzone = d,
        }
    }

    /// Freezes the current values for a polling run.
    #[must_use]
    pub fn response_config(&self) -> ResponseConfig {
        ResponseConfig {
            deadzone: self.deadzone,
            multiplier: self.multiplier,
            exit_key: self.exit_key,
        }
    }
}

/// Immutable settings snapshot consumed by the polling loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseConfig {
    pub deadzone: f64,
    pub multiplier: f64,
    pub exit_key: ExitKey,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Settings::default().response_config()
    }
}

impl ResponseConfig {
    /// Evaluates the curve for one axis and applies the multiplier.
    ///
    /// # Examples
    ///
    /// ```
    /// use stick_cursor::curve::Curve;
    /// use stick_cursor::settings::{ExitKey, ResponseConfig};
    ///
    /// let response = ResponseConfig {
    ///     deadzone: 0.0,
    ///     multiplier: 0.5,
    ///     exit_key: ExitKey::default(),
    /// };
    /// assert!((response.respond(0.8, &Curve::default()) - 0.4).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn respond(&self, raw: f64, curve: &Curve) -> f64 {
        evaluate(raw, self.deadzone, curve) * self.multiplier
    }
}
