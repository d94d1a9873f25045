//! `run`: drive the cursor until the user quits.
//!
//! After the exit key stops the loop the command waits on stdin. Enter
//! starts a new run with freshly loaded settings; `q` (or end of input, or
//! Ctrl+C) quits.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::time::{sleep, Duration};
use tracing::info;

use stick_cursor::config::Config;
use stick_cursor::controller::evdev_input::EvdevInput;
use stick_cursor::cursor::screen::resolve_screen_size;
use stick_cursor::cursor::uinput::UinputCursor;
use stick_cursor::curve::store::CurveStore;
use stick_cursor::curve::Curve;
use stick_cursor::poll_loop::{PollLoop, SuspendReason};
use stick_cursor::settings::{ResponseConfig, Settings};

pub async fn run(config: &Config, settings_path: &Path, no_delay: bool) -> Result<()> {
    let input = EvdevInput::open(&config.input).context("Failed to open input devices")?;
    let screen = resolve_screen_size(&config.cursor);
    let cursor = UinputCursor::create(screen).context("Failed to create virtual pointer")?;

    let (response, curve) = load_snapshot(settings_path);
    let mut poll = PollLoop::new(input, cursor, response, curve, config.poll.tick_rate_hz);
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if !no_delay && config.poll.start_delay_ms > 0 {
            println!(
                "Starting in {:.1}s, switch to the target window now.",
                config.poll.start_delay_ms as f64 / 1000.0
            );
            sleep(Duration::from_millis(config.poll.start_delay_ms)).await;
        }

        let summary = poll.run().await;
        if summary.reason == SuspendReason::Interrupted {
            break;
        }

        println!("Stopped. Press Enter to start again, or q then Enter to quit.");
        if !wait_for_restart(&mut stdin).await? {
            break;
        }

        let (response, curve) = load_snapshot(settings_path);
        poll.update_snapshot(response, curve);
    }

    info!("Goodbye");
    Ok(())
}

/// Settings and curve for the next run.
fn load_snapshot(settings_path: &Path) -> (ResponseConfig, Curve) {
    let settings = Settings::load(settings_path);
    let curve = CurveStore::open(settings_path).curve().clone();
    info!(
        "Loaded settings: key {}, multiplier {}, deadzone {}, {} curve points",
        settings.exit_key,
        settings.multiplier,
        settings.deadzone,
        curve.len()
    );
    (settings.response_config(), curve)
}

/// Waits for the user's choice; `true` means start again.
async fn wait_for_restart<R>(lines: &mut Lines<R>) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    tokio::select! {
        line = lines.next_line() => {
            let line = line.context("Failed to read stdin")?;
            Ok(matches!(line, Some(text) if !is_quit(&text)))
        }
        _ = tokio::signal::ctrl_c() => Ok(false),
    }
}

fn is_quit(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("q")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_quit() {
        assert!(is_quit("q"));
        assert!(is_quit(" Q \n"));
        assert!(!is_quit(""));
        assert!(!is_quit("quit"));
    }

    #[tokio::test]
    async fn test_enter_restarts() {
        let mut lines = BufReader::new(&b"\n"[..]).lines();
        assert!(wait_for_restart(&mut lines).await.unwrap());
    }

    #[tokio::test]
    async fn test_q_quits() {
        let mut lines = BufReader::new(&b"q\n"[..]).lines();
        assert!(!wait_for_restart(&mut lines).await.unwrap());
    }

    #[tokio::test]
    async fn test_end_of_input_quits() {
        let mut lines = BufReader::new(&b""[..]).lines();
        assert!(!wait_for_restart(&mut lines).await.unwrap());
    }

    #[test]
    fn test_load_snapshot_defaults_without_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let (response, curve) = load_snapshot(&dir.path().join("config.json"));
        assert_eq!(response, ResponseConfig::default());
        assert_eq!(curve, Curve::default());
    }
}
