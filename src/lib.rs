//! # Stick Cursor Library
//!
//! Drive the mouse cursor with a game controller's analog stick.
//!
//! Each axis reading passes through a deadzone, a user-editable
//! piecewise-linear response curve and a multiplier, and the result is mapped
//! to an absolute position around the centre of the screen:
//!
//! ```text
//! evdev stick -> deadzone -> curve -> multiplier -> screen mapping -> uinput pointer
//! ```
//!
//! ## Modules
//!
//! - [`curve`]: response curve model, evaluation, persistence and editing
//! - [`settings`]: exit key, multiplier and deadzone
//! - [`controller`]: game controller and keyboard input via evdev
//! - [`cursor`]: screen mapping and the virtual pointer
//! - [`poll_loop`]: the fixed-rate loop tying them together
//! - [`config`]: runtime configuration (TOML)

pub mod config;
pub mod controller;
pub mod cursor;
pub mod curve;
pub mod error;
pub mod logging;
pub mod poll_loop;
pub mod settings;
