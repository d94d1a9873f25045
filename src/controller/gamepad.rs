//! # Gamepad
//!
//! Detection and stick reading for any evdev game controller.
//!
//! A device counts as a gamepad when it reports both `ABS_X` and `ABS_Y` and
//! has a gamepad button (`BTN_SOUTH`) or joystick trigger (`BTN_TRIGGER`).
//! The button check keeps touchpads and tablets, which also report
//! `ABS_X`/`ABS_Y`, from being picked up.
//!
//! ## Axes
//!
//! Only the left stick is read. Ranges differ per vendor:
//! - DualSense / DualShock: 0..255
//! - Xbox controllers: -32768..32767
//!
//! Both are normalized with [`normalize_axis`] using the range the device
//! reports.

use evdev::{AbsoluteAxisType, Device, Key};
use std::path::Path;
use tracing::{debug, info};

use super::{drain_device, normalize_axis, open_device, scan_devices, set_nonblocking, AxisSample};
use crate::error::{Result, StickCursorError};

/// Whether `device` looks like a game controller.
#[must_use]
pub fn is_gamepad(device: &Device) -> bool {
    let has_stick = device
        .supported_absolute_axes()
        .map(|axes| axes.contains(AbsoluteAxisType::ABS_X) && axes.contains(AbsoluteAxisType::ABS_Y))
        .unwrap_or(false);

    let has_buttons = device
        .supported_keys()
        .map(|keys| keys.contains(Key::BTN_SOUTH) || keys.contains(Key::BTN_TRIGGER))
        .unwrap_or(false);

    has_stick && has_buttons
}

/// Open game controller handle.
pub struct Gamepad {
    device: Device,
    device_path: String,
}

impl std::fmt::Debug for Gamepad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gamepad")
            .field("device_path", &self.device_path)
            .field("name", &self.name())
            .finish()
    }
}

impl Gamepad {
    /// Detect and open the first game controller under `/dev/input`.
    ///
    /// # Errors
    ///
    /// - `ControllerNotFound`: no device passed [`is_gamepad`]
    /// - `Controller`: `/dev/input` is missing or unreadable
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use stick_cursor::controller::gamepad::Gamepad;
    ///
    /// let gamepad = Gamepad::open()?;
    /// println!("Connected to controller at: {}", gamepad.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open() -> Result<Self> {
        Self::open_in(Path::new(super::INPUT_DIR))
    }

    /// Detect and open the first game controller under `dir`.
    pub fn open_in(dir: &Path) -> Result<Self> {
        let mut found = scan_devices(dir, is_gamepad)?;
        if found.is_empty() {
            return Err(StickCursorError::ControllerNotFound);
        }
        let (device_path, device) = found.remove(0);
        Self::from_device(device_path, device)
    }

    /// Open a specific event device as the controller.
    ///
    /// # Errors
    ///
    /// Returns `Controller` error if the device cannot be opened or does not
    /// look like a game controller.
    pub fn open_path(path: &str) -> Result<Self> {
        let device = open_device(path, is_gamepad, "game controller")?;
        Self::from_device(path.to_string(), device)
    }

    fn from_device(device_path: String, device: Device) -> Result<Self> {
        set_nonblocking(&device).map_err(|e| {
            StickCursorError::Controller(format!("Failed to configure {}: {}", device_path, e))
        })?;
        info!(
            "Found game controller '{}' at: {}",
            device.name().unwrap_or("unknown"),
            device_path
        );
        Ok(Self {
            device,
            device_path,
        })
    }

    /// The `/dev/input/eventX` path this controller was opened from.
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Human-readable device name, e.g. "Wireless Controller".
    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }

    /// Discard queued events.
    ///
    /// # Errors
    ///
    /// Returns `Controller` error if the device can no longer be read,
    /// usually because it was unplugged.
    pub fn drain_events(&mut self) -> Result<usize> {
        let drained = drain_device(&mut self.device).map_err(|e| {
            StickCursorError::Controller(format!("Failed to read {}: {}", self.device_path, e))
        })?;
        if drained > 0 {
            debug!("Drained {} controller events", drained);
        }
        Ok(drained)
    }

    /// Current left stick position.
    ///
    /// # Errors
    ///
    /// Returns `Controller` error if the axis state query fails.
    pub fn read_axes(&self) -> Result<AxisSample> {
        let state = self.device.get_abs_state().map_err(|e| {
            StickCursorError::Controller(format!("Failed to read axes from {}: {}", self.device_path, e))
        })?;

        let x = state[AbsoluteAxisType::ABS_X.0 as usize];
        let y = state[AbsoluteAxisType::ABS_Y.0 as usize];

        Ok(AxisSample::new(
            normalize_axis(x.value, x.minimum, x.maximum),
            normalize_axis(y.value, y.minimum, y.maximum),
        ))
    }
}
