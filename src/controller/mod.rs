//! # Controller Module
//!
//! Raw input for the polling loop.
//!
//! This module handles:
//! - Game controller detection and connection via evdev ([`gamepad`])
//! - Exit-key state from keyboard devices ([`keyboard`])
//! - Combining both behind the [`InputSource`] trait ([`evdev_input`])
//! - Normalizing raw axis values to -1.0..1.0
//!
//! Devices are opened non-blocking so draining their event queues never
//! stalls a tick. Current axis and key state is read with evdev's state
//! queries rather than by replaying events.

pub mod evdev_input;
pub mod gamepad;
pub mod keyboard;

use evdev::Device;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, StickCursorError};
use crate::settings::ExitKey;

/// Directory scanned for event devices
pub const INPUT_DIR: &str = "/dev/input";

/// One reading of the stick, each axis in -1.0..1.0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisSample {
    pub x: f64,
    pub y: f64,
}

impl AxisSample {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Raw input consumed once per tick.
#[cfg_attr(test, mockall::automock)]
pub trait InputSource {
    /// Discards queued events.
    fn drain_events(&mut self);

    /// Whether a controller is attached.
    fn controller_connected(&self) -> bool;

    /// Current stick position, or `None` if the controller cannot be read.
    fn read_axes(&mut self) -> Option<AxisSample>;

    /// Whether `key` is held right now.
    fn key_pressed(&mut self, key: ExitKey) -> bool;
}

/// Converts a raw axis value to -1.0..1.0 given the axis range.
///
/// The midpoint of `[minimum, maximum]` maps to 0.0. Values outside the range
/// are clamped; a degenerate range reads as centred.
///
/// # Examples
///
/// ```
/// use stick_cursor::controller::normalize_axis;
///
/// // 8-bit stick (DualSense)
/// assert_eq!(normalize_axis(0, 0, 255), -1.0);
/// assert_eq!(normalize_axis(255, 0, 255), 1.0);
/// assert!(normalize_axis(128, 0, 255).abs() < 0.01);
///
/// // Signed 16-bit stick (Xbox)
/// assert_eq!(normalize_axis(-32768, -32768, 32767), -1.0);
/// ```
#[must_use]
pub fn normalize_axis(value: i32, minimum: i32, maximum: i32) -> f64 {
    if maximum <= minimum {
        return 0.0;
    }
    let span = f64::from(maximum) - f64::from(minimum);
    let offset = f64::from(value) - f64::from(minimum);
    (offset / span * 2.0 - 1.0).clamp(-1.0, 1.0)
}

/// Opens every `event*` device under `dir` that satisfies `accept`.
///
/// Devices are visited in path order for deterministic selection. Devices
/// that cannot be opened (usually permissions) are skipped.
pub(crate) fn scan_devices<F>(dir: &Path, mut accept: F) -> Result<Vec<(String, Device)>>
where
    F: FnMut(&Device) -> bool,
{
    if !dir.exists() {
        return Err(StickCursorError::Controller(format!(
            "{} directory not found",
            dir.display()
        )));
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| StickCursorError::Controller(format!("Failed to read {}: {}", dir.display(), e)))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| StickCursorError::Controller(format!("Failed to read directory entry: {}", e)))?;

    entries.sort_by_key(|entry| entry.path());

    let mut found = Vec::new();
    for entry in entries {
        let path = entry.path();

        let is_event_node = path
            .file_name()
            .map(|name| name.to_string_lossy().starts_with("event"))
            .unwrap_or(false);
        if !is_event_node {
            continue;
        }

        match Device::open(&path) {
            Ok(device) => {
                let id = device.input_id();
                debug!(
                    "Found input device: {} '{}' (vendor: 0x{:04x}, product: 0x{:04x})",
                    path.display(),
                    device.name().unwrap_or("unknown"),
                    id.vendor(),
                    id.product()
                );
                if accept(&device) {
                    found.push((path.to_string_lossy().to_string(), device));
                }
            }
            Err(e) => {
                debug!("Could not open {}: {}", path.display(), e);
            }
        }
    }

    Ok(found)
}

/// Opens one device by path, checking it with `accept`.
pub(crate) fn open_device<F>(path: &str, accept: F, kind: &str) -> Result<Device>
where
    F: FnOnce(&Device) -> bool,
{
    let device = Device::open(path)
        .map_err(|e| StickCursorError::Controller(format!("Failed to open {}: {}", path, e)))?;
    if !accept(&device) {
        return Err(StickCursorError::Controller(format!(
            "{} ({}) is not a {}",
            path,
            device.name().unwrap_or("unknown"),
            kind
        )));
    }
    Ok(device)
}

/// Puts a device's file descriptor in non-blocking mode.
pub(crate) fn set_nonblocking<D: AsRawFd>(device: &D) -> io::Result<()> {
    let fd = device.as_raw_fd();
    let flags = OFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFL)?);
    fcntl(fd, FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK))?;
    Ok(())
}

/// Reads and discards every queued event, returning how many were dropped.
///
/// An empty queue (`WouldBlock`) ends the drain; other errors are returned,
/// typically `ENODEV` after the device was unplugged.
pub(crate) fn drain_device(device: &mut Device) -> io::Result<usize> {
    let mut drained = 0;
    loop {
        match device.fetch_events() {
            Ok(events) => {
                let count = events.count();
                if count == 0 {
                    return Ok(drained);
                }
                drained += count;
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(drained),
            Err(e) => return Err(e),
        }
    }
}
