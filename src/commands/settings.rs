//! `settings show` / `settings set`.

use anyhow::{Context, Result};
use std::path::Path;

use stick_cursor::settings::{SettingKind, Settings};

pub fn show(settings_path: &Path) -> Result<()> {
    let settings = Settings::load(settings_path);
    println!("Settings ({})", settings_path.display());
    for kind in SettingKind::ALL {
        println!("  {:<12} {:<10} {}", kind.to_string(), settings.get(kind).to_string(), kind.label());
    }
    Ok(())
}

pub fn set(settings_path: &Path, kind: SettingKind, text: &str) -> Result<()> {
    let value = kind.parse_value(text)?;

    let mut settings = Settings::load(settings_path);
    let previous = settings.get(kind);
    settings.apply(value);
    settings
        .save(settings_path)
        .with_context(|| format!("Failed to save settings to {}", settings_path.display()))?;

    println!("{}: {} -> {}", kind, previous, value);
    Ok(())
}
