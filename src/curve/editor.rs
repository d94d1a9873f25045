//! # Curve Editor
//!
//! Applies pointer gestures from a 2-D plot to the curve store.
//!
//! ## Gestures
//!
//! | Gesture | Method | Effect |
//! |---------|--------|--------|
//! | Secondary click | [`CurveEditor::add`] | Insert a point under the pointer |
//! | Tertiary click | [`CurveEditor::remove`] | Delete the point under the pointer |
//! | Primary press | [`CurveEditor::press`] | Select the point under the pointer |
//! | Pointer move | [`CurveEditor::drag_to`] | Move the selected point |
//! | Primary release | [`CurveEditor::release`] | Drop the selection |
//!
//! Pointer positions are in curve coordinates (both axes 0.0 to 1.0) and are
//! `None` when the pointer is outside the plot.
//!
//! "Under the pointer" means inside a [`PICK_TOLERANCE`] box on both axes;
//! when several points qualify the closest one wins, then the lowest index.
//!
//! Every accepted edit is saved immediately. Refused gestures leave the curve
//! untouched and report why through [`EditOutcome::Ignored`].
//!
//! ## Usage
//!
//! ```no_run
//! use stick_cursor::curve::editor::CurveEditor;
//! use stick_cursor::curve::store::CurveStore;
//!
//! let mut editor = CurveEditor::new(CurveStore::open("config.json"), 0.1);
//! editor.add(Some((0.5, 0.2)));
//! editor.press(Some((0.5, 0.2)));
//! editor.drag_to(Some((0.6, 0.3)));
//! editor.release();
//! ```

use std::fmt;
use tracing::{debug, warn};

use super::store::CurveStore;
use super::{ControlPoint, Curve};

/// Half-width of the pick box on each axis.
pub const PICK_TOLERANCE: f64 = 0.05;

/// Pointer position in curve coordinates, or `None` outside the plot.
pub type PointerPosition = Option<(f64, f64)>;

/// Converts raw plot coordinates into a pointer position.
///
/// Positions outside the unit square are off the plot.
#[must_use]
pub fn plot_position(x: f64, y: f64) -> PointerPosition {
    let on_plot = |v: f64| (0.0..=1.0).contains(&v);
    (on_plot(x) && on_plot(y)).then_some((x, y))
}

/// Why a gesture did not change the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Pointer is outside the plot
    OutsidePlot,
    /// No point inside the pick box
    NothingNearby,
    /// Curve is already at its minimum size
    MinimumPoints,
    /// Anchors cannot be moved
    AnchorLocked,
    /// Another point already has this x
    DuplicateX,
    /// New points must lie strictly between the anchors
    OutsideDomain,
    /// No drag in progress
    NotDragging,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::OutsidePlot => "pointer is outside the plot",
            Self::NothingNearby => "no point near the pointer",
            Self::MinimumPoints => "curve needs at least two points",
            Self::AnchorLocked => "anchor points cannot move",
            Self::DuplicateX => "another point already uses this x",
            Self::OutsideDomain => "x must lie strictly between 0 and 1",
            Self::NotDragging => "no point is being dragged",
        };
        f.write_str(text)
    }
}

/// Result of one gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditOutcome {
    Added(ControlPoint),
    Removed(ControlPoint),
    Selected(ControlPoint),
    Moved { from: ControlPoint, to: ControlPoint },
    Released,
    Ignored(IgnoreReason),
}

impl EditOutcome {
    /// Whether the curve was changed.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Added(_) | Self::Removed(_) | Self::Moved { .. })
    }
}

/// Drag state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    /// Index of the selected point in the sorted curve
    Dragging { selected: usize },
}

/// Gesture-driven editor over a [`CurveStore`].
#[derive(Debug)]
pub struct CurveEditor {
    store: CurveStore,
    deadzone: f64,
    drag: DragState,
}

impl CurveEditor {
    /// Creates an editor; `deadzone` is the lower bound for point outputs.
    pub fn new(store: CurveStore, deadzone: f64) -> Self {
        Self {
            store,
            deadzone: deadzone.clamp(0.0, 1.0),
            drag: DragState::Idle,
        }
    }

    #[must_use]
    pub fn curve(&self) -> &Curve {
        self.store.curve()
    }

    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    #[must_use]
    pub fn into_store(self) -> CurveStore {
        self.store
    }

    /// Inserts a point at the pointer.
    ///
    /// The output is clamped to `[deadzone, 1]`. Points on or outside the
    /// domain ends, or sharing an x with an existing point, are refused.
    pub fn add(&mut self, pointer: PointerPosition) -> EditOutcome {
        let Some((px, py)) = pointer else {
            return self.ignore("add", IgnoreReason::OutsidePlot);
        };

        if !(px > 0.0 && px < 1.0) {
            return self.ignore("add", IgnoreReason::OutsideDomain);
        }
        if self.curve().has_point_at_x(px, None) {
            return self.ignore("add", IgnoreReason::DuplicateX);
        }

        let point = ControlPoint::new(px, self.clamp_output(py));
        let index = self.store.insert_point(point);
        self.shift_selection_after_insert(index);
        debug!("Added curve point ({:.3}, {:.3})", point.x, point.y);
        self.persist();
        EditOutcome::Added(point)
    }

    /// Removes the point under the pointer.
    ///
    /// Refused while the curve has only its anchors; anchors are never picked.
    pub fn remove(&mut self, pointer: PointerPosition) -> EditOutcome {
        let Some(position) = pointer else {
            return self.ignore("remove", IgnoreReason::OutsidePlot);
        };

        if self.curve().len() <= super::MIN_POINTS {
            return self.ignore("remove", IgnoreReason::MinimumPoints);
        }

        let Some(index) = self.pick(position, false) else {
            return self.ignore("remove", IgnoreReason::NothingNearby);
        };

        match self.store.remove_at(index) {
            Ok(point) => {
                self.shift_selection_after_remove(index);
                debug!("Removed curve point ({:.3}, {:.3})", point.x, point.y);
                self.persist();
                EditOutcome::Removed(point)
            }
            Err(e) => {
                debug!("Remove refused: {}", e);
                EditOutcome::Ignored(IgnoreReason::MinimumPoints)
            }
        }
    }

    /// Selects the point under the pointer and starts a drag.
    ///
    /// Anchors can be selected; dragging them has no effect.
    pub fn press(&mut self, pointer: PointerPosition) -> EditOutcome {
        let Some(position) = pointer else {
            return self.ignore("press", IgnoreReason::OutsidePlot);
        };

        match self.pick(position, true) {
            Some(index) => {
                self.drag = DragState::Dragging { selected: index };
                EditOutcome::Selected(self.curve().points()[index])
            }
            None => self.ignore("press", IgnoreReason::NothingNearby),
        }
    }

    /// Moves the selected point to the pointer.
    ///
    /// x is clamped to `[0, 1]` and y to `[deadzone, 1]`. Anchors stay put, and
    /// a move onto another point's x is refused.
    pub fn drag_to(&mut self, pointer: PointerPosition) -> EditOutcome {
        let DragState::Dragging { selected } = self.drag else {
            return self.ignore("drag", IgnoreReason::NotDragging);
        };
        let Some((px, py)) = pointer else {
            return self.ignore("drag", IgnoreReason::OutsidePlot);
        };

        if self.curve().is_anchor_index(selected) {
            return self.ignore("drag", IgnoreReason::AnchorLocked);
        }

        let target = ControlPoint::new(px.clamp(0.0, 1.0), self.clamp_output(py));
        if self.curve().has_point_at_x(target.x, Some(selected)) {
            return self.ignore("drag", IgnoreReason::DuplicateX);
        }

        let from = match self.store.remove_at(selected) {
            Ok(point) => point,
            Err(e) => {
                warn!("Selected point {} could not be moved: {}", selected, e);
                self.drag = DragState::Idle;
                return EditOutcome::Ignored(IgnoreReason::NothingNearby);
            }
        };
        let index = self.store.insert_point(target);
        self.drag = DragState::Dragging { selected: index };

        debug!(
            "Moved curve point ({:.3}, {:.3}) -> ({:.3}, {:.3})",
            from.x, from.y, target.x, target.y
        );
        self.persist();
        EditOutcome::Moved { from, to: target }
    }

    /// Ends the drag and clears the selection.
    pub fn release(&mut self) -> EditOutcome {
        self.drag = DragState::Idle;
        EditOutcome::Released
    }

    /// Index of the closest point inside the pick box.
    fn pick(&self, (px, py): (f64, f64), include_anchors: bool) -> Option<usize> {
        let curve = self.curve();
        curve
            .points()
            .iter()
            .enumerate()
            .filter(|&(i, _)| include_anchors || !curve.is_anchor_index(i))
            .filter(|(_, p)| {
                (p.x - px).abs() <= PICK_TOLERANCE && (p.y - py).abs() <= PICK_TOLERANCE
            })
            .map(|(i, p)| (i, (p.x - px).hypot(p.y - py)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    fn clamp_output(&self, y: f64) -> f64 {
        y.clamp(self.deadzone, 1.0)
    }

    fn shift_selection_after_insert(&mut self, inserted: usize) {
        if let DragState::Dragging { selected } = &mut self.drag {
            if *selected >= inserted {
                *selected += 1;
            }
        }
    }

    fn shift_selection_after_remove(&mut self, removed: usize) {
        if let DragState::Dragging { selected } = self.drag {
            self.drag = match selected.cmp(&removed) {
                std::cmp::Ordering::Less => DragState::Dragging { selected },
                std::cmp::Ordering::Equal => DragState::Idle,
                std::cmp::Ordering::Greater => DragState::Dragging {
                    selected: selected - 1,
                },
            };
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.persist() {
            warn!("Failed to save curve to {}: {}", self.store.path().display(), e);
        }
    }

    fn ignore(&self, gesture: &str, reason: IgnoreReason) -> EditOutcome {
        debug!("Ignored {} gesture: {}", gesture, reason);
        EditOutcome::Ignored(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{END_ANCHOR, START_ANCHOR};
    use tempfile::TempDir;

    fn editor_in(dir: &TempDir) -> CurveEditor {
        CurveEditor::new(CurveStore::open(dir.path().join("config.json")), 0.1)
    }

    fn assert_invariants(curve: &Curve) {
        assert!(curve.len() >= 2);
        assert!(curve.is_sorted());
        assert_eq!(curve.points()[0], START_ANCHOR);
        assert_eq!(curve.points()[curve.len() - 1], END_ANCHOR);
    }

    // ==================== Plot Position Tests ====================

    #[test]
    fn test_plot_position() {
        assert_eq!(plot_position(0.5, 0.5), Some((0.5, 0.5)));
        assert_eq!(plot_position(0.0, 1.0), Some((0.0, 1.0)));
        assert_eq!(plot_position(-0.1, 0.5), None);
        assert_eq!(plot_position(0.5, 1.01), None);
    }

    // ==================== Add Tests ====================

    #[test]
    fn test_add_inserts_sorted_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);

        assert!(editor.add(Some((0.7, 0.5))).is_mutation());
        assert!(editor.add(Some((0.3, 0.2))).is_mutation());

        let xs: Vec<f64> = editor.curve().points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 0.3, 0.7, 1.0]);
        assert_invariants(editor.curve());

        let reopened = CurveStore::open(dir.path().join("config.json"));
        assert_eq!(reopened.curve(), editor.curve());
    }

    #[test]
    fn test_add_clamps_output_to_deadzone() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);

        let outcome = editor.add(Some((0.4, 0.02)));
        assert_eq!(outcome, EditOutcome::Added(ControlPoint::new(0.4, 0.1)));
    }

    #[test]
    fn test_add_outside_plot_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);

        assert_eq!(editor.add(None), EditOutcome::Ignored(IgnoreReason::OutsidePlot));
        assert_eq!(editor.curve(), &Curve::default());
    }

    #[test]
    fn test_add_on_domain_ends_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);

        assert_eq!(
            editor.add(Some((0.0, 0.5))),
            EditOutcome::Ignored(IgnoreReason::OutsideDomain)
        );
        assert_eq!(
            editor.add(Some((1.0, 0.5))),
            EditOutcome::Ignored(IgnoreReason::OutsideDomain)
        );
        assert_invariants(editor.curve());
    }

    #[test]
    fn test_add_duplicate_x_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);

        editor.add(Some((0.5, 0.2)));
        assert_eq!(
            editor.add(Some((0.5, 0.8))),
            EditOutcome::Ignored(IgnoreReason::DuplicateX)
        );
        assert_eq!(editor.curve().len(), 3);
    }

    // ==================== Remove Tests ====================

    #[test]
    fn test_remove_within_tolerance() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);
        editor.add(Some((0.5, 0.2)));

        let outcome = editor.remove(Some((0.54, 0.16)));
        assert_eq!(outcome, EditOutcome::Removed(ControlPoint::new(0.5, 0.2)));
        assert_eq!(editor.curve(), &Curve::default());
    }

    #[test]
    fn test_remove_outside_tolerance_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);
        editor.add(Some((0.5, 0.2)));

        assert_eq!(
            editor.remove(Some((0.56, 0.2))),
            EditOutcome::Ignored(IgnoreReason::NothingNearby)
        );
        assert_eq!(editor.curve().len(), 3);
    }

    #[test]
    fn test_remove_on_two_point_curve_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);

        assert_eq!(
            editor.remove(Some((0.0, 0.0))),
            EditOutcome::Ignored(IgnoreReason::MinimumPoints)
        );
        assert_eq!(editor.curve().len(), 2);
    }

    #[test]
    fn test_remove_never_picks_anchor() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);
        editor.add(Some((0.5, 0.5)));

        assert_eq!(
            editor.remove(Some((1.0, 1.0))),
            EditOutcome::Ignored(IgnoreReason::NothingNearby)
        );
        assert_invariants(editor.curve());
    }

    #[test]
    fn test_remove_picks_nearest() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);
        editor.add(Some((0.50, 0.3)));
        editor.add(Some((0.53, 0.3)));

        let outcome = editor.remove(Some((0.52, 0.3)));
        assert_eq!(outcome, EditOutcome::Removed(ControlPoint::new(0.53, 0.3)));
    }

    // ==================== Drag Tests ====================

    #[test]
    fn test_drag_moves_point_and_resorts() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);
        editor.add(Some((0.3, 0.2)));
        editor.add(Some((0.6, 0.5)));

        assert_eq!(
            editor.press(Some((0.31, 0.21))),
            EditOutcome::Selected(ControlPoint::new(0.3, 0.2))
        );
        assert_eq!(editor.drag_state(), DragState::Dragging { selected: 1 });

        let outcome = editor.drag_to(Some((0.8, 0.7)));
        assert_eq!(
            outcome,
            EditOutcome::Moved {
                from: ControlPoint::new(0.3, 0.2),
                to: ControlPoint::new(0.8, 0.7),
            }
        );
        assert_eq!(editor.drag_state(), DragState::Dragging { selected: 2 });
        assert_invariants(editor.curve());

        // Selection follows the point across subsequent moves
        editor.drag_to(Some((0.85, 0.75)));
        assert_eq!(editor.curve().points()[2], ControlPoint::new(0.85, 0.75));

        assert_eq!(editor.release(), EditOutcome::Released);
        assert_eq!(editor.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_drag_clamps_to_plot() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);
        editor.add(Some((0.5, 0.5)));
        editor.press(Some((0.5, 0.5)));

        let outcome = editor.drag_to(Some((0.4, 0.0)));
        assert_eq!(
            outcome,
            EditOutcome::Moved {
                from: ControlPoint::new(0.5, 0.5),
                to: ControlPoint::new(0.4, 0.1),
            }
        );
    }

    #[test]
    fn test_drag_onto_anchor_x_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);
        editor.add(Some((0.95, 0.9)));
        editor.press(Some((0.95, 0.9)));

        assert_eq!(
            editor.drag_to(Some((1.0, 0.9))),
            EditOutcome::Ignored(IgnoreReason::DuplicateX)
        );
        assert_invariants(editor.curve());
        assert_eq!(editor.curve().points()[1], ControlPoint::new(0.95, 0.9));
    }

    #[test]
    fn test_anchor_drag_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);
        editor.add(Some((0.5, 0.5)));

        assert_eq!(editor.press(Some((0.02, 0.03))), EditOutcome::Selected(START_ANCHOR));
        assert_eq!(
            editor.drag_to(Some((0.2, 0.4))),
            EditOutcome::Ignored(IgnoreReason::AnchorLocked)
        );

        editor.release();
        assert_eq!(editor.press(Some((1.0, 1.0))), EditOutcome::Selected(END_ANCHOR));
        assert_eq!(
            editor.drag_to(Some((0.7, 0.9))),
            EditOutcome::Ignored(IgnoreReason::AnchorLocked)
        );
        assert_invariants(editor.curve());
    }

    #[test]
    fn test_point_near_anchor_stays_movable() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);
        editor.add(Some((0.99, 0.99)));

        // The interior point is closer to the pointer than the end anchor
        assert_eq!(
            editor.press(Some((0.985, 0.985))),
            EditOutcome::Selected(ControlPoint::new(0.99, 0.99))
        );
        assert!(editor.drag_to(Some((0.7, 0.6))).is_mutation());
        assert_invariants(editor.curve());
    }

    #[test]
    fn test_drag_without_press_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);
        editor.add(Some((0.5, 0.5)));

        assert_eq!(
            editor.drag_to(Some((0.6, 0.6))),
            EditOutcome::Ignored(IgnoreReason::NotDragging)
        );
    }

    #[test]
    fn test_press_on_empty_area_stays_idle() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);

        assert_eq!(
            editor.press(Some((0.5, 0.5))),
            EditOutcome::Ignored(IgnoreReason::NothingNearby)
        );
        assert_eq!(editor.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_drag_outside_plot_keeps_selection() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);
        editor.add(Some((0.5, 0.5)));
        editor.press(Some((0.5, 0.5)));

        assert_eq!(
            editor.drag_to(None),
            EditOutcome::Ignored(IgnoreReason::OutsidePlot)
        );
        assert_eq!(editor.drag_state(), DragState::Dragging { selected: 1 });
    }

    #[test]
    fn test_drag_persists_each_move() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);
        editor.add(Some((0.5, 0.5)));
        editor.press(Some((0.5, 0.5)));
        editor.drag_to(Some((0.4, 0.3)));

        let reopened = CurveStore::open(dir.path().join("config.json"));
        assert_eq!(reopened.curve().points()[1], ControlPoint::new(0.4, 0.3));
    }

    #[test]
    fn test_invariants_hold_across_gesture_sequence() {
        let dir = TempDir::new().unwrap();
        let mut editor = editor_in(&dir);

        let gestures: [(f64, f64); 6] = [
            (0.2, 0.15),
            (0.4, 0.35),
            (0.6, 0.4),
            (0.8, 0.9),
            (0.1, 0.5),
            (0.9, 0.2),
        ];
        for &(x, y) in &gestures {
            editor.add(Some((x, y)));
            assert_invariants(editor.curve());
        }

        editor.press(Some((0.2, 0.15)));
        for target in [(0.95, 0.2), (0.0, 0.5), (0.45, 1.2), (0.05, 0.3)] {
            editor.drag_to(Some(target));
            assert_invariants(editor.curve());
        }
        editor.release();

        for &(x, y) in &gestures {
            editor.remove(Some((x, y)));
            assert_invariants(editor.curve());
        }
    }
}
