//! # Evdev Input Source
//!
//! [`InputSource`] backed by a game controller and the system keyboards.
//!
//! The controller is optional: when none is attached (or it is unplugged
//! mid-run) the source reports it as disconnected and re-scans every
//! `rescan_interval_ticks` drains. A keyboard is required to start, since
//! without one the loop could never be stopped. Keyboards that disappear
//! mid-run are re-scanned on the same interval.

use tracing::{debug, info, warn};

use super::gamepad::Gamepad;
use super::keyboard::Keyboards;
use super::{AxisSample, InputSource};
use crate::config::InputConfig;
use crate::error::{Result, StickCursorError};
use crate::settings::ExitKey;

/// Counts drains between device scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RescanTimer {
    interval: u32,
    elapsed: u32,
}

impl RescanTimer {
    fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            elapsed: 0,
        }
    }

    /// Counts one drain. Returns true once every `interval` drains.
    fn tick(&mut self) -> bool {
        self.elapsed += 1;
        if self.elapsed < self.interval {
            return false;
        }
        self.elapsed = 0;
        true
    }

    fn reset(&mut self) {
        self.elapsed = 0;
    }
}

/// Controller and keyboards read through evdev.
#[derive(Debug)]
pub struct EvdevInput {
    gamepad: Option<Gamepad>,
    gamepad_path: Option<String>,
    keyboards: Keyboards,
    keyboard_path: Option<String>,
    gamepad_rescan: RescanTimer,
    keyboard_rescan: RescanTimer,
}

impl EvdevInput {
    /// Opens the keyboards and, if one is attached, the controller.
    ///
    /// # Errors
    ///
    /// - `KeyboardNotFound`: no keyboard could be opened
    /// - `Controller`: a configured device path is invalid
    pub fn open(config: &InputConfig) -> Result<Self> {
        let keyboard_path = config.keyboard_path().map(str::to_string);
        let keyboards = open_keyboards(keyboard_path.as_deref())?;

        let gamepad_path = config.gamepad_path().map(str::to_string);
        let gamepad = match open_gamepad(gamepad_path.as_deref()) {
            Ok(gamepad) => Some(gamepad),
            Err(StickCursorError::ControllerNotFound) => {
                warn!("No game controller connected, waiting for one");
                None
            }
            Err(e) if gamepad_path.is_some() => return Err(e),
            Err(e) => {
                warn!("Controller scan failed: {}", e);
                None
            }
        };

        Ok(Self {
            gamepad,
            gamepad_path,
            keyboards,
            keyboard_path,
            gamepad_rescan: RescanTimer::new(config.rescan_interval_ticks),
            keyboard_rescan: RescanTimer::new(config.rescan_interval_ticks),
        })
    }

    fn rescan_gamepad(&mut self) {
        if !self.gamepad_rescan.tick() {
            return;
        }

        match open_gamepad(self.gamepad_path.as_deref()) {
            Ok(gamepad) => {
                info!("Game controller connected: {}", gamepad.device_path());
                self.gamepad = Some(gamepad);
            }
            Err(e) => debug!("Controller rescan: {}", e),
        }
    }

    fn rescan_keyboards(&mut self) {
        if !self.keyboard_rescan.tick() {
            return;
        }

        match open_keyboards(self.keyboard_path.as_deref()) {
            Ok(keyboards) => {
                info!("Keyboard reconnected, exit key active again");
                self.keyboards = keyboards;
            }
            Err(e) => debug!("Keyboard rescan: {}", e),
        }
    }

    fn disconnect(&mut self, reason: &StickCursorError) {
        if let Some(gamepad) = self.gamepad.take() {
            warn!("Game controller {} disconnected: {}", gamepad.device_path(), reason);
        }
        self.gamepad_rescan.reset();
    }
}

fn open_keyboards(path: Option<&str>) -> Result<Keyboards> {
    match path {
        Some(path) => Keyboards::open_path(path),
        None => Keyboards::open_all(),
    }
}

fn open_gamepad(path: Option<&str>) -> Result<Gamepad> {
    match path {
        Some(path) => Gamepad::open_path(path),
        None => Gamepad::open(),
    }
}

impl InputSource for EvdevInput {
    fn drain_events(&mut self) {
        self.keyboards.drain_events();
        if self.keyboards.is_empty() {
            self.rescan_keyboards();
        }

        match self.gamepad.as_mut().map(Gamepad::drain_events) {
            Some(Ok(_)) => {}
            Some(Err(e)) => self.disconnect(&e),
            None => self.rescan_gamepad(),
        }
    }

    fn controller_connected(&self) -> bool {
        self.gamepad.is_some()
    }

    fn read_axes(&mut self) -> Option<AxisSample> {
        match self.gamepad.as_ref()?.read_axes() {
            Ok(sample) => Some(sample),
            Err(e) => {
                self.disconnect(&e);
                None
            }
        }
    }

    fn key_pressed(&mut self, key: ExitKey) -> bool {
        self.keyboards.is_pressed(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_missing_keyboard_path() {
        let config = InputConfig {
            keyboard_path: "/nonexistent/event99".to_string(),
            ..InputConfig::default()
        };
        assert!(matches!(
            EvdevInput::open(&config),
            Err(StickCursorError::Controller(_))
        ));
    }

    fn detached_input(interval: u32) -> EvdevInput {
        EvdevInput {
            gamepad: None,
            gamepad_path: Some("/nonexistent/event98".to_string()),
            keyboards: Keyboards::from_devices(Vec::new()).unwrap(),
            keyboard_path: Some("/nonexistent/event99".to_string()),
            gamepad_rescan: RescanTimer::new(interval),
            keyboard_rescan: RescanTimer::new(interval),
        }
    }

    #[test]
    fn test_rescan_timer_fires_every_interval() {
        let mut timer = RescanTimer::new(3);
        let fired: Vec<bool> = (0..7).map(|_| timer.tick()).collect();
        assert_eq!(fired, vec![false, false, true, false, false, true, false]);
    }

    #[test]
    fn test_rescan_timer_reset_restarts_count() {
        let mut timer = RescanTimer::new(3);
        timer.tick();
        timer.tick();
        timer.reset();
        assert!(!timer.tick());
        assert!(!timer.tick());
        assert!(timer.tick());
    }

    #[test]
    fn test_rescan_timer_zero_interval_fires_every_tick() {
        let mut timer = RescanTimer::new(0);
        assert!(timer.tick());
        assert!(timer.tick());
    }

    #[test]
    fn test_lost_keyboards_are_rescanned() {
        let mut input = detached_input(3);
        assert!(input.keyboards.is_empty());

        input.drain_events();
        input.drain_events();
        assert_eq!(input.keyboard_rescan.elapsed, 2);
        assert_eq!(input.gamepad_rescan.elapsed, 2);

        // third drain scans both, finds nothing and starts over
        input.drain_events();
        assert_eq!(input.keyboard_rescan.elapsed, 0);
        assert_eq!(input.gamepad_rescan.elapsed, 0);
        assert!(input.keyboards.is_empty());
        assert!(!input.controller_connected());
        assert!(!input.key_pressed(ExitKey::new('c').unwrap()));
    }

    // Integration test - only runs with a keyboard and controller attached
    #[test]
    #[ignore]
    fn test_read_with_real_devices() {
        let mut input = EvdevInput::open(&InputConfig::default()).unwrap();
        input.drain_events();
        assert!(input.controller_connected());
        assert!(input.read_axes().is_some());
    }
}
