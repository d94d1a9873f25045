//! # Stick Cursor
//!
//! Drive the mouse cursor with a game controller's analog stick.
//!
//! Usage:
//!   stick-cursor run                     Start moving the cursor
//!   stick-cursor settings show           Show exit key, multiplier and deadzone
//!   stick-cursor settings set KEY VALUE  Change one setting
//!   stick-cursor curve show              List the response curve points
//!   stick-cursor curve add X Y           Add a point
//!   stick-cursor curve remove X Y        Remove the point near (X, Y)
//!   stick-cursor curve drag FX FY TX TY  Move the point near (FX, FY)
//!   stick-cursor curve reset             Restore the straight-line curve

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use stick_cursor::config::Config;
use stick_cursor::logging::init_logging;
use stick_cursor::settings::SettingKind;

mod commands;

/// Default runtime configuration file
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Parser)]
#[command(
    name = "stick-cursor",
    about = "Drive the mouse cursor with a game controller's analog stick",
    version
)]
#[command(long_about = "Drive the mouse cursor with a game controller's analog stick

The stick position is shaped by a deadzone, an editable response curve and a
multiplier, then mapped to an absolute position around the screen centre.

EXAMPLES:
    stick-cursor run                        Start after a short delay
    stick-cursor settings set deadzone 0.15
    stick-cursor curve add 0.5 0.2
    stick-cursor curve drag 0.5 0.2 0.6 0.3

ENVIRONMENT VARIABLES:
    RUST_LOG=debug         Override the configured log level")]
struct Cli {
    /// Runtime configuration file (TOML)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Settings and curve file (JSON); overrides storage.settings_path
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Move the cursor with the stick until the exit key is pressed
    Run {
        /// Skip the start delay
        #[arg(long)]
        no_delay: bool,
    },

    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Show or edit the response curve
    #[command(subcommand)]
    Curve(CurveCommands),
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show all settings
    Show,

    /// Change one setting
    #[command(allow_negative_numbers = true)]
    Set {
        /// key, multiplier or deadzone
        name: SettingKind,

        /// New value
        value: String,
    },
}

#[derive(Subcommand)]
enum CurveCommands {
    /// List the curve points
    Show,

    /// Add a point at (X, Y)
    #[command(allow_negative_numbers = true)]
    Add { x: f64, y: f64 },

    /// Remove the point nearest (X, Y)
    #[command(allow_negative_numbers = true)]
    Remove { x: f64, y: f64 },

    /// Drag the point nearest (FROM_X, FROM_Y) to (TO_X, TO_Y)
    #[command(allow_negative_numbers = true)]
    Drag {
        from_x: f64,
        from_y: f64,
        to_x: f64,
        to_y: f64,
    },

    /// Restore the straight-line curve
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    let _log_guard = init_logging(&config.logging);

    let settings_path = cli
        .settings
        .unwrap_or_else(|| PathBuf::from(&config.storage.settings_path));

    match cli.command {
        Commands::Run { no_delay } => {
            info!("Stick Cursor v{} starting...", env!("CARGO_PKG_VERSION"));
            commands::run::run(&config, &settings_path, no_delay).await
        }
        Commands::Settings(SettingsCommands::Show) => commands::settings::show(&settings_path),
        Commands::Settings(SettingsCommands::Set { name, value }) => {
            commands::settings::set(&settings_path, name, &value)
        }
        Commands::Curve(CurveCommands::Show) => commands::curve::show(&settings_path),
        Commands::Curve(CurveCommands::Add { x, y }) => commands::curve::add(&settings_path, x, y),
        Commands::Curve(CurveCommands::Remove { x, y }) => {
            commands::curve::remove(&settings_path, x, y)
        }
        Commands::Curve(CurveCommands::Drag {
            from_x,
            from_y,
            to_x,
            to_y,
        }) => commands::curve::drag(&settings_path, (from_x, from_y), (to_x, to_y)),
        Commands::Curve(CurveCommands::Reset) => commands::curve::reset(&settings_path),
    }
}
