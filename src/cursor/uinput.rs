//! # Virtual Absolute Pointer
//!
//! Moves the OS cursor by emitting absolute `ABS_X` / `ABS_Y` events from a
//! uinput virtual device. The device advertises `BTN_LEFT` and absolute axes
//! spanning the screen, which the desktop's input stack treats as an absolute
//! pointer (the same class as a VM tablet).
//!
//! Requires write access to `/dev/uinput`.

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AbsInfo, AbsoluteAxisType, AttributeSet, EventType, InputEvent, Key, UinputAbsSetup};
use tracing::{debug, info};

use super::{CursorSink, PixelPosition, ScreenSize};
use crate::error::{Result, StickCursorError};

/// Name the virtual device registers with
pub const DEVICE_NAME: &str = "stick-cursor virtual pointer";

/// Cursor sink backed by a uinput absolute pointer.
///
/// The device is created lazily on the first move and destroyed on
/// [`release`](CursorSink::release).
pub struct UinputCursor {
    screen: ScreenSize,
    device: Option<VirtualDevice>,
}

impl std::fmt::Debug for UinputCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UinputCursor")
            .field("screen", &self.screen)
            .field("active", &self.device.is_some())
            .finish()
    }
}

impl UinputCursor {
    /// Creates the sink and its virtual device.
    ///
    /// # Errors
    ///
    /// Returns `Cursor` error if `/dev/uinput` cannot be opened or the device
    /// cannot be registered.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use stick_cursor::cursor::ScreenSize;
    /// use stick_cursor::cursor::uinput::UinputCursor;
    ///
    /// let cursor = UinputCursor::create(ScreenSize::new(1920, 1080))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn create(screen: ScreenSize) -> Result<Self> {
        let device = build_device(screen)?;
        info!("Created virtual pointer for {} screen", screen);
        Ok(Self {
            screen,
            device: Some(device),
        })
    }

    fn device(&mut self) -> Result<&mut VirtualDevice> {
        if self.device.is_none() {
            debug!("Recreating virtual pointer");
            self.device = Some(build_device(self.screen)?);
        }
        self.device
            .as_mut()
            .ok_or_else(|| StickCursorError::Cursor("virtual pointer unavailable".to_string()))
    }
}

impl CursorSink for UinputCursor {
    fn screen_size(&self) -> ScreenSize {
        self.screen
    }

    fn move_to(&mut self, position: PixelPosition) -> Result<()> {
        let (x, y) = clamp_to_screen(position, self.screen);
        let events = [
            InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_X.0, x),
            InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_Y.0, y),
        ];
        self.device()?
            .emit(&events)
            .map_err(|e| StickCursorError::Cursor(format!("Failed to emit position: {}", e)))
    }

    fn release(&mut self) {
        if self.device.take().is_some() {
            debug!("Released virtual pointer");
        }
    }
}

/// Largest valid coordinate on each axis.
fn axis_max(screen: ScreenSize) -> (i32, i32) {
    let max = |extent: u32| i32::try_from(extent.saturating_sub(1)).unwrap_or(i32::MAX);
    (max(screen.width), max(screen.height))
}

/// Clamps a position onto the screen.
fn clamp_to_screen(position: PixelPosition, screen: ScreenSize) -> (i32, i32) {
    let (max_x, max_y) = axis_max(screen);
    (position.x.clamp(0, max_x), position.y.clamp(0, max_y))
}

fn build_device(screen: ScreenSize) -> Result<VirtualDevice> {
    let (max_x, max_y) = axis_max(screen);
    let abs_x = UinputAbsSetup::new(AbsoluteAxisType::ABS_X, AbsInfo::new(0, 0, max_x, 0, 0, 1));
    let abs_y = UinputAbsSetup::new(AbsoluteAxisType::ABS_Y, AbsInfo::new(0, 0, max_y, 0, 0, 1));

    let mut keys = AttributeSet::<Key>::new();
    keys.insert(Key::BTN_LEFT);

    let cursor_error = |e: std::io::Error| {
        StickCursorError::Cursor(format!("Failed to create virtual pointer: {}", e))
    };

    VirtualDeviceBuilder::new()
        .map_err(cursor_error)?
        .name(DEVICE_NAME)
        .with_keys(&keys)
        .map_err(cursor_error)?
        .with_absolute_axis(&abs_x)
        .map_err(cursor_error)?
        .with_absolute_axis(&abs_y)
        .map_err(cursor_error)?
        .build()
        .map_err(cursor_error)
}
