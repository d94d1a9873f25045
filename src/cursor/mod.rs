//! # Cursor Module
//!
//! Final stage of every tick: turning normalized outputs into a screen
//! position and handing it to the OS pointer.
//!
//! This module handles:
//! - Mapping normalized outputs to absolute pixels ([`map_to_screen`])
//! - Detecting the primary screen resolution ([`screen`])
//! - Driving a uinput virtual pointer ([`uinput`])
//!
//! ## Mapping
//!
//! Both axes are scaled by half the screen **height**, so a full deflection
//! covers a centred square rather than stretching to the screen's aspect:
//!
//! ```text
//! px = width / 2  + out_x * (height / 2)
//! py = height / 2 + out_y * (height / 2)
//! ```
//!
//! ```
//! use stick_cursor::cursor::{map_to_screen, PixelPosition, ScreenSize};
//!
//! let screen = ScreenSize::new(1920, 1080);
//! assert_eq!(map_to_screen(0.0, 0.0, screen), PixelPosition::new(960, 540));
//! assert_eq!(map_to_screen(1.0, -1.0, screen), PixelPosition::new(1500, 0));
//! ```

pub mod screen;
pub mod uinput;

use std::fmt;

use crate::error::Result;

/// Screen dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for ScreenSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Absolute cursor position in pixels.
///
/// May fall outside the screen; clamping is the sink's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPosition {
    pub x: i32,
    pub y: i32,
}

impl PixelPosition {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Maps a pair of normalized outputs to an absolute pixel position.
///
/// Screen halves use integer division and the result is truncated toward
/// zero. No bounds clamping is done here.
#[must_use]
pub fn map_to_screen(output_x: f64, output_y: f64, screen: ScreenSize) -> PixelPosition {
    let half_width = f64::from(screen.width / 2);
    let half_height = f64::from(screen.height / 2);

    PixelPosition {
        x: (half_width + output_x * half_height) as i32,
        y: (half_height + output_y * half_height) as i32,
    }
}

/// Destination for absolute cursor positions.
#[cfg_attr(test, mockall::automock)]
pub trait CursorSink {
    /// Dimensions positions are expressed in.
    fn screen_size(&self) -> ScreenSize;

    /// Moves the OS cursor to `position`.
    fn move_to(&mut self, position: PixelPosition) -> Result<()>;

    /// Releases any device held for the current run.
    fn release(&mut self);
}
