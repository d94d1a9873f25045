//! # Keyboard
//!
//! Exit-key detection. Every attached keyboard is watched so the key works
//! regardless of which one the user presses it on.

use evdev::{Device, Key};
use std::path::Path;
use tracing::{debug, info, warn};

use super::{drain_device, open_device, scan_devices, set_nonblocking};
use crate::error::{Result, StickCursorError};
use crate::settings::ExitKey;

/// Whether `device` looks like a full keyboard.
#[must_use]
pub fn is_keyboard(device: &Device) -> bool {
    device
        .supported_keys()
        .map(|keys| keys.contains(Key::KEY_A) && keys.contains(Key::KEY_Z) && keys.contains(Key::KEY_ENTER))
        .unwrap_or(false)
}

/// Key code for an exit key.
#[must_use]
pub fn key_for(exit_key: ExitKey) -> Option<Key> {
    let key = match exit_key.as_char() {
        'A' => Key::KEY_A,
        'B' => Key::KEY_B,
        'C' => Key::KEY_C,
        'D' => Key::KEY_D,
        'E' => Key::KEY_E,
        'F' => Key::KEY_F,
        'G' => Key::KEY_G,
        'H' => Key::KEY_H,
        'I' => Key::KEY_I,
        'J' => Key::KEY_J,
        'K' => Key::KEY_K,
        'L' => Key::KEY_L,
        'M' => Key::KEY_M,
        'N' => Key::KEY_N,
        'O' => Key::KEY_O,
        'P' => Key::KEY_P,
        'Q' => Key::KEY_Q,
        'R' => Key::KEY_R,
        'S' => Key::KEY_S,
        'T' => Key::KEY_T,
        'U' => Key::KEY_U,
        'V' => Key::KEY_V,
        'W' => Key::KEY_W,
        'X' => Key::KEY_X,
        'Y' => Key::KEY_Y,
        'Z' => Key::KEY_Z,
        '0' => Key::KEY_0,
        '1' => Key::KEY_1,
        '2' => Key::KEY_2,
        '3' => Key::KEY_3,
        '4' => Key::KEY_4,
        '5' => Key::KEY_5,
        '6' => Key::KEY_6,
        '7' => Key::KEY_7,
        '8' => Key::KEY_8,
        '9' => Key::KEY_9,
        _ => return None,
    };
    Some(key)
}

struct KeyboardDevice {
    path: String,
    device: Device,
}

/// Set of open keyboards.
pub struct Keyboards {
    devices: Vec<KeyboardDevice>,
}

impl std::fmt::Debug for Keyboards {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keyboards")
            .field("paths", &self.paths().collect::<Vec<_>>())
            .finish()
    }
}

impl Keyboards {
    /// Open every keyboard under `/dev/input`.
    ///
    /// # Errors
    ///
    /// - `KeyboardNotFound`: no readable keyboard is attached
    /// - `Controller`: `/dev/input` is missing or unreadable
    pub fn open_all() -> Result<Self> {
        Self::open_all_in(Path::new(super::INPUT_DIR))
    }

    /// Open every keyboard under `dir`.
    pub fn open_all_in(dir: &Path) -> Result<Self> {
        let found = scan_devices(dir, is_keyboard)?;
        if found.is_empty() {
            return Err(StickCursorError::KeyboardNotFound);
        }
        Self::from_devices(found)
    }

    /// Open one keyboard by path.
    ///
    /// # Errors
    ///
    /// Returns `Controller` error if the device cannot be opened or is not a
    /// keyboard.
    pub fn open_path(path: &str) -> Result<Self> {
        let device = open_device(path, is_keyboard, "keyboard")?;
        Self::from_devices(vec![(path.to_string(), device)])
    }

    pub(super) fn from_devices(found: Vec<(String, Device)>) -> Result<Self> {
        let mut devices = Vec::with_capacity(found.len());
        for (path, device) in found {
            set_nonblocking(&device).map_err(|e| {
                StickCursorError::Controller(format!("Failed to configure {}: {}", path, e))
            })?;
            info!(
                "Watching keyboard '{}' at: {}",
                device.name().unwrap_or("unknown"),
                path
            );
            devices.push(KeyboardDevice { path, device });
        }
        Ok(Self { devices })
    }

    /// Paths of the open keyboards.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.devices.iter().map(|kb| kb.path.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Discard queued events; keyboards that fail to read are dropped.
    pub fn drain_events(&mut self) {
        self.devices.retain_mut(|kb| match drain_device(&mut kb.device) {
            Ok(_) => true,
            Err(e) => {
                warn!("Keyboard {} disconnected: {}", kb.path, e);
                false
            }
        });
    }

    /// Whether `exit_key` is held on any open keyboard.
    pub fn is_pressed(&self, exit_key: ExitKey) -> bool {
        let Some(key) = key_for(exit_key) else {
            return false;
        };

        self.devices.iter().any(|kb| match kb.device.get_key_state() {
            Ok(state) => state.contains(key),
            Err(e) => {
                debug!("Failed to read key state from {}: {}", kb.path, e);
                false
            }
        })
    }
}
