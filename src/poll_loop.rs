//! # Polling Loop
//!
//! Fixed-rate loop that turns stick readings into cursor positions.
//!
//! Each tick:
//! 1. Drain queued input events
//! 2. Suspend if the exit key is held
//! 3. Skip the tick if no controller is attached
//! 4. Evaluate the response curve per axis, map to pixels, move the cursor
//!
//! The loop runs on a `tokio` interval with missed ticks skipped, so a stall
//! never produces a burst of catch-up moves. Ctrl+C suspends the loop as
//! well.
//!
//! Settings and curve are an immutable snapshot taken when the loop is
//! built; edits made while it is stopped take effect through
//! [`PollLoop::update_snapshot`].

use std::fmt;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::controller::InputSource;
use crate::cursor::{map_to_screen, CursorSink, PixelPosition};
use crate::curve::Curve;
use crate::settings::ResponseConfig;

/// Default tick rate in Hz
pub const DEFAULT_TICK_RATE_HZ: u32 = 60;

/// Number of ticks between status log messages
pub const LOG_INTERVAL_TICKS: u64 = 300;

/// Loop lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Suspended,
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Cursor was moved to this position
    Moved(PixelPosition),
    /// Nothing to do (no controller, unreadable axes or failed move)
    Idle,
    /// Exit key was pressed; the loop is now suspended
    Exit,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendReason {
    ExitKey,
    Interrupted,
}

impl fmt::Display for SuspendReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExitKey => write!(f, "exit key pressed"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Statistics for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub moves: u64,
    pub reason: SuspendReason,
}

/// Polling loop driving `cursor` from `input`.
pub struct PollLoop<I, C> {
    input: I,
    cursor: C,
    response: ResponseConfig,
    curve: Curve,
    tick_rate_hz: u32,
    state: LoopState,
}

impl<I: InputSource, C: CursorSink> PollLoop<I, C> {
    /// Creates a suspended loop. A `tick_rate_hz` of zero is treated as one.
    pub fn new(input: I, cursor: C, response: ResponseConfig, curve: Curve, tick_rate_hz: u32) -> Self {
        Self {
            input,
            cursor,
            response,
            curve,
            tick_rate_hz: tick_rate_hz.max(1),
            state: LoopState::Suspended,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.tick_rate_hz))
    }

    /// Replaces the settings and curve used by the next run.
    pub fn update_snapshot(&mut self, response: ResponseConfig, curve: Curve) {
        self.response = response;
        self.curve = curve;
    }

    pub fn into_parts(self) -> (I, C) {
        (self.input, self.cursor)
    }

    /// Performs one iteration.
    pub fn tick(&mut self) -> TickOutcome {
        self.input.drain_events();

        if self.input.key_pressed(self.response.exit_key) {
            info!("Exit key {} pressed", self.response.exit_key);
            self.suspend();
            return TickOutcome::Exit;
        }

        if !self.input.controller_connected() {
            return TickOutcome::Idle;
        }

        let Some(sample) = self.input.read_axes() else {
            return TickOutcome::Idle;
        };

        let output_x = self.response.respond(sample.x, &self.curve);
        let output_y = self.response.respond(sample.y, &self.curve);
        let position = map_to_screen(output_x, output_y, self.cursor.screen_size());

        match self.cursor.move_to(position) {
            Ok(()) => {
                trace!(
                    "Stick ({:.3}, {:.3}) -> output ({:.3}, {:.3}) -> ({}, {})",
                    sample.x,
                    sample.y,
                    output_x,
                    output_y,
                    position.x,
                    position.y
                );
                TickOutcome::Moved(position)
            }
            Err(e) => {
                warn!("Failed to move cursor: {}", e);
                TickOutcome::Idle
            }
        }
    }

    fn suspend(&mut self) {
        self.state = LoopState::Suspended;
        self.cursor.release();
    }

    /// Runs until the exit key or Ctrl+C.
    pub async fn run(&mut self) -> RunSummary {
        self.state = LoopState::Running;

        let mut ticker = interval(self.tick_period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Polling at {}Hz, press {} to stop",
            self.tick_rate_hz, self.response.exit_key
        );

        let mut ticks: u64 = 0;
        let mut moves: u64 = 0;
        let mut last_log_ticks: u64 = 0;

        let reason = loop {
            tokio::select! {
                _ = ticker.tick() => {
                    ticks += 1;
                    match self.tick() {
                        TickOutcome::Moved(_) => moves += 1,
                        TickOutcome::Idle => {}
                        TickOutcome::Exit => break SuspendReason::ExitKey,
                    }

                    if ticks - last_log_ticks >= LOG_INTERVAL_TICKS {
                        debug!(
                            "{} ticks, {} moves, controller {}",
                            ticks,
                            moves,
                            if self.input.controller_connected() { "connected" } else { "absent" }
                        );
                        last_log_ticks = ticks;
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl+C, stopping...");
                    self.suspend();
                    break SuspendReason::Interrupted;
                }
            }
        };

        info!("Stopped after {} ticks ({} moves): {}", ticks, moves, reason);
        RunSummary { ticks, moves, reason }
    }
}
