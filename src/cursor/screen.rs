//! # Screen Resolution Detection
//!
//! Reads the active mode of the first connected display from DRM sysfs
//! (`/sys/class/drm/card*-*/`). Each connector directory has a `status` file
//! (`connected` / `disconnected`) and a `modes` file whose first line is the
//! preferred mode, e.g. `1920x1080`.

use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::ScreenSize;
use crate::config::CursorConfig;

/// DRM connector directory
const DRM_CLASS_DIR: &str = "/sys/class/drm";

/// Used when no override is configured and detection fails
pub const FALLBACK_SCREEN: ScreenSize = ScreenSize::new(1920, 1080);

/// Parses a DRM mode line such as `2560x1440` or `1920x1080i`.
#[must_use]
pub fn parse_mode(line: &str) -> Option<ScreenSize> {
    let (width, height) = line.trim().split_once('x')?;
    let height: String = height.chars().take_while(char::is_ascii_digit).collect();
    let size = ScreenSize::new(width.parse().ok()?, height.parse().ok()?);
    (size.width > 0 && size.height > 0).then_some(size)
}

/// Resolution of the first connected display under `drm_dir`.
///
/// Connectors are visited in name order so the choice is deterministic.
#[must_use]
pub fn detect_resolution_in(drm_dir: &Path) -> Option<ScreenSize> {
    let mut entries: Vec<_> = fs::read_dir(drm_dir).ok()?.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();
        let status = match fs::read_to_string(path.join("status")) {
            Ok(status) => status,
            Err(_) => continue,
        };
        if status.trim() != "connected" {
            continue;
        }

        let modes = match fs::read_to_string(path.join("modes")) {
            Ok(modes) => modes,
            Err(e) => {
                debug!("Could not read modes for {}: {}", path.display(), e);
                continue;
            }
        };

        if let Some(size) = modes.lines().next().and_then(parse_mode) {
            debug!("Display {} reports {}", path.display(), size);
            return Some(size);
        }
    }

    None
}

/// Resolution of the primary display.
#[must_use]
pub fn detect_primary_resolution() -> Option<ScreenSize> {
    detect_resolution_in(Path::new(DRM_CLASS_DIR))
}

/// Screen size from the config override, detection, or the fallback.
#[must_use]
pub fn resolve_screen_size(config: &CursorConfig) -> ScreenSize {
    if config.screen_width > 0 && config.screen_height > 0 {
        let size = ScreenSize::new(config.screen_width, config.screen_height);
        info!("Using configured screen size {}", size);
        return size;
    }

    match detect_primary_resolution() {
        Some(size) => {
            info!("Detected screen size {}", size);
            size
        }
        None => {
            warn!(
                "Could not detect screen size, assuming {}. Set cursor.screen_width/height to override.",
                FALLBACK_SCREEN
            );
            FALLBACK_SCREEN
        }
    }
}
