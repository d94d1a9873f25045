//! `curve` subcommands, mapped onto the editor's pointer gestures.
//!
//! Coordinates are plot coordinates (0.0 to 1.0 on both axes). A refused
//! gesture is reported but is not an error.

use anyhow::{Context, Result};
use std::path::Path;

use stick_cursor::curve::editor::{plot_position, CurveEditor, EditOutcome};
use stick_cursor::curve::store::CurveStore;
use stick_cursor::curve::Curve;
use stick_cursor::settings::Settings;

pub fn show(settings_path: &Path) -> Result<()> {
    let store = CurveStore::open(settings_path);
    println!("Response curve ({})", settings_path.display());
    for (index, point) in store.curve().points().iter().enumerate() {
        let marker = if store.curve().is_anchor_index(index) { " (anchor)" } else { "" };
        println!("  {:>2}  {}{}", index, point, marker);
    }
    Ok(())
}

pub fn add(settings_path: &Path, x: f64, y: f64) -> Result<()> {
    let mut editor = open_editor(settings_path);
    report(editor.add(plot_position(x, y)));
    Ok(())
}

pub fn remove(settings_path: &Path, x: f64, y: f64) -> Result<()> {
    let mut editor = open_editor(settings_path);
    report(editor.remove(plot_position(x, y)));
    Ok(())
}

pub fn drag(settings_path: &Path, from: (f64, f64), to: (f64, f64)) -> Result<()> {
    let mut editor = open_editor(settings_path);
    let selected = editor.press(plot_position(from.0, from.1));
    if let EditOutcome::Ignored(_) = selected {
        report(selected);
        return Ok(());
    }
    report(editor.drag_to(plot_position(to.0, to.1)));
    editor.release();
    Ok(())
}

pub fn reset(settings_path: &Path) -> Result<()> {
    let mut store = CurveStore::open(settings_path);
    store.replace(Curve::default());
    store
        .persist()
        .with_context(|| format!("Failed to save curve to {}", settings_path.display()))?;
    println!("Curve reset to a straight line");
    Ok(())
}

fn open_editor(settings_path: &Path) -> CurveEditor {
    let deadzone = Settings::load(settings_path).deadzone;
    CurveEditor::new(CurveStore::open(settings_path), deadzone)
}

fn report(outcome: EditOutcome) {
    match outcome {
        EditOutcome::Added(point) => println!("Added {}", point),
        EditOutcome::Removed(point) => println!("Removed {}", point),
        EditOutcome::Moved { from, to } => println!("Moved {} -> {}", from, to),
        EditOutcome::Selected(point) => println!("Selected {}", point),
        EditOutcome::Released => {}
        EditOutcome::Ignored(reason) => println!("Nothing changed: {}", reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stick_cursor::curve::ControlPoint;
    use tempfile::TempDir;

    fn points(path: &Path) -> Vec<ControlPoint> {
        CurveStore::open(path).curve().points().to_vec()
    }

    #[test]
    fn test_add_drag_remove_reset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        add(&path, 0.5, 0.2).unwrap();
        assert_eq!(points(&path)[1], ControlPoint::new(0.5, 0.2));

        drag(&path, (0.51, 0.21), (0.6, 0.3)).unwrap();
        assert_eq!(points(&path)[1], ControlPoint::new(0.6, 0.3));

        remove(&path, 0.6, 0.3).unwrap();
        assert_eq!(points(&path).len(), 2);

        add(&path, 0.3, 0.5).unwrap();
        reset(&path).unwrap();
        assert_eq!(points(&path), Curve::default().points());
    }

    #[test]
    fn test_add_clamps_to_deadzone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        add(&path, 0.4, 0.0).unwrap();
        // default deadzone is 0.1
        assert_eq!(points(&path)[1], ControlPoint::new(0.4, 0.1));
    }

    #[test]
    fn test_refused_gestures_leave_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        add(&path, 1.5, 0.5).unwrap();
        remove(&path, 0.5, 0.5).unwrap();
        drag(&path, (0.5, 0.5), (0.6, 0.6)).unwrap();
        assert!(!path.exists());
    }
}
