//! # Response Curve Module
//!
//! The response curve shapes how far the cursor travels for a given stick
//! deflection. It is a piecewise-linear function defined by a sorted list of
//! control points.
//!
//! This module handles:
//! - The point-set model and its structural invariants ([`Curve`])
//! - Evaluating a raw axis reading against the curve ([`evaluator`])
//! - Loading and saving the curve alongside the other settings ([`store`])
//! - Pointer-driven editing of the points ([`editor`])
//!
//! ## Invariants
//!
//! | Invariant | Enforced by |
//! |-----------|-------------|
//! | At least 2 points | [`Curve::remove_at`] |
//! | First point is `(0, 0)`, last is `(1, 1)` | [`Curve::from_points`], [`Curve::insert`] |
//! | Points sorted ascending by x | [`Curve::insert`] |
//! | No duplicate x after an edit | [`editor::CurveEditor`] |
//!
//! ## Usage
//!
//! ```
//! use stick_cursor::curve::{ControlPoint, Curve};
//!
//! let mut curve = Curve::default();
//! curve.insert(ControlPoint::new(0.5, 0.2));
//!
//! assert_eq!(curve.len(), 3);
//! assert_eq!(curve.points()[1], ControlPoint::new(0.5, 0.2));
//! ```

pub mod editor;
pub mod evaluator;
pub mod store;

use thiserror::Error;

/// Fewest points a curve may hold (the two anchors).
pub const MIN_POINTS: usize = 2;

/// Anchor at the start of the input domain.
pub const START_ANCHOR: ControlPoint = ControlPoint { x: 0.0, y: 0.0 };

/// Anchor at the end of the input domain.
pub const END_ANCHOR: ControlPoint = ControlPoint { x: 1.0, y: 1.0 };

/// Reasons a curve mutation was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    /// Removing the point would leave fewer than [`MIN_POINTS`] points
    #[error("curve must keep at least 2 points")]
    CannotRemove,

    /// Anchors cannot be removed or moved
    #[error("anchor points cannot be modified")]
    AnchorLocked,

    /// The requested point is not part of the curve
    #[error("point ({x}, {y}) is not on the curve")]
    PointNotFound { x: f64, y: f64 },

    /// No point at the given index
    #[error("no point at index {0}")]
    IndexOutOfRange(usize),

    /// A point list does not describe a valid curve
    #[error("invalid curve: {0}")]
    Invalid(String),
}

/// One control point of the response curve.
///
/// `x` is the normalized input magnitude (0.0 to 1.0) and `y` the normalized
/// output magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    pub x: f64,
    pub y: f64,
}

impl ControlPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for ControlPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

impl From<[f64; 2]> for ControlPoint {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<ControlPoint> for [f64; 2] {
    fn from(point: ControlPoint) -> Self {
        [point.x, point.y]
    }
}

/// Piecewise-linear response curve.
///
/// Always anchored at `(0, 0)` and `(1, 1)` and sorted by x, so evaluation can
/// walk the segments in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    points: Vec<ControlPoint>,
}

impl Default for Curve {
    /// The identity curve: just the two anchors.
    fn default() -> Self {
        Self {
            points: vec![START_ANCHOR, END_ANCHOR],
        }
    }
}

impl Curve {
    /// Builds a curve from an arbitrary point list.
    ///
    /// Points are sorted by x (stable, so equal x keep their order). The result
    /// must hold at least two finite points inside the unit domain, starting at
    /// `(0, 0)` and ending at `(1, 1)`.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::Invalid`] if any of those conditions fail.
    ///
    /// # Examples
    ///
    /// ```
    /// use stick_cursor::curve::{ControlPoint, Curve};
    ///
    /// let curve = Curve::from_points(vec![
    ///     ControlPoint::new(1.0, 1.0),
    ///     ControlPoint::new(0.0, 0.0),
    ///     ControlPoint::new(0.4, 0.3),
    /// ])?;
    /// assert_eq!(curve.points()[1].x, 0.4);
    ///
    /// assert!(Curve::from_points(vec![ControlPoint::new(0.0, 0.0)]).is_err());
    /// # Ok::<(), stick_cursor::curve::CurveError>(())
    /// ```
    pub fn from_points(mut points: Vec<ControlPoint>) -> Result<Self, CurveError> {
        if points.len() < MIN_POINTS {
            return Err(CurveError::Invalid(format!(
                "expected at least {} points, got {}",
                MIN_POINTS,
                points.len()
            )));
        }

        if let Some(bad) = points.iter().find(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(CurveError::Invalid(format!(
                "non-finite point ({}, {})",
                bad.x, bad.y
            )));
        }

        if let Some(bad) = points.iter().find(|p| !(0.0..=1.0).contains(&p.x)) {
            return Err(CurveError::Invalid(format!(
                "x = {} is outside the input domain [0, 1]",
                bad.x
            )));
        }

        points.sort_by(|a, b| a.x.total_cmp(&b.x));

        if points[0] != START_ANCHOR {
            return Err(CurveError::Invalid("first point must be (0, 0)".to_string()));
        }
        if points[points.len() - 1] != END_ANCHOR {
            return Err(CurveError::Invalid("last point must be (1, 1)".to_string()));
        }

        Ok(Self { points })
    }

    /// Builds a curve from persisted `[x, y]` pairs.
    pub fn from_pairs(pairs: &[[f64; 2]]) -> Result<Self, CurveError> {
        Self::from_points(pairs.iter().copied().map(ControlPoint::from).collect())
    }

    /// Returns the points as `[x, y]` pairs for persistence.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<[f64; 2]> {
        self.points.iter().copied().map(Into::into).collect()
    }

    #[must_use]
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; a curve keeps its anchors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the point at `index` is one of the two anchors.
    ///
    /// Anchors are identified by position (first or last), never by comparing
    /// coordinates.
    #[must_use]
    pub fn is_anchor_index(&self, index: usize) -> bool {
        index == 0 || index + 1 == self.points.len()
    }

    /// Whether any point other than `except` sits at exactly `x`.
    #[must_use]
    pub fn has_point_at_x(&self, x: f64, except: Option<usize>) -> bool {
        self.points
            .iter()
            .enumerate()
            .any(|(i, p)| Some(i) != except && p.x == x)
    }

    /// Inserts a point keeping the curve sorted by x, returning its index.
    ///
    /// `x` is clamped into the input domain and the insertion position is kept
    /// strictly between the anchors. Points sharing an x are allowed here;
    /// the new point goes after the existing ones.
    pub fn insert(&mut self, point: ControlPoint) -> usize {
        let point = ControlPoint::new(point.x.clamp(0.0, 1.0), point.y);
        let index = self
            .points
            .partition_point(|p| p.x <= point.x)
            .clamp(1, self.points.len() - 1);
        self.points.insert(index, point);
        index
    }

    /// Removes the point at `index`.
    ///
    /// # Errors
    ///
    /// - [`CurveError::CannotRemove`] if only the anchors are left
    /// - [`CurveError::AnchorLocked`] if `index` is an anchor
    /// - [`CurveError::IndexOutOfRange`] if `index` is out of range
    pub fn remove_at(&mut self, index: usize) -> Result<ControlPoint, CurveError> {
        if self.points.len() <= MIN_POINTS {
            return Err(CurveError::CannotRemove);
        }
        if index >= self.points.len() {
            return Err(CurveError::IndexOutOfRange(index));
        }
        if self.is_anchor_index(index) {
            return Err(CurveError::AnchorLocked);
        }
        Ok(self.points.remove(index))
    }

    /// Removes the first point exactly equal to `point`.
    pub fn remove(&mut self, point: ControlPoint) -> Result<ControlPoint, CurveError> {
        if self.points.len() <= MIN_POINTS {
            return Err(CurveError::CannotRemove);
        }
        let index = self
            .points
            .iter()
            .position(|p| *p == point)
            .ok_or(CurveError::PointNotFound {
                x: point.x,
                y: point.y,
            })?;
        self.remove_at(index)
    }

    /// Whether the points are in ascending x order.
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.points.windows(2).all(|w| w[0].x <= w[1].x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_point_curve() -> Curve {
        Curve::from_points(vec![
            START_ANCHOR,
            ControlPoint::new(0.5, 0.2),
            END_ANCHOR,
        ])
        .unwrap()
    }

    // ==================== Construction Tests ====================

    #[test]
    fn test_default_curve_is_two_anchors() {
        let curve = Curve::default();
        assert_eq!(curve.points(), &[START_ANCHOR, END_ANCHOR]);
        assert!(!curve.is_empty());
    }

    #[test]
    fn test_from_points_sorts_by_x() {
        let curve = Curve::from_points(vec![
            END_ANCHOR,
            ControlPoint::new(0.7, 0.5),
            START_ANCHOR,
            ControlPoint::new(0.3, 0.2),
        ])
        .unwrap();

        let xs: Vec<f64> = curve.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 0.3, 0.7, 1.0]);
    }

    #[test]
    fn test_from_points_rejects_single_point() {
        let result = Curve::from_points(vec![START_ANCHOR]);
        assert!(matches!(result, Err(CurveError::Invalid(_))));
    }

    #[test]
    fn test_from_points_rejects_missing_anchor() {
        let result = Curve::from_points(vec![START_ANCHOR, ControlPoint::new(1.0, 0.8)]);
        assert!(result.is_err());

        let result = Curve::from_points(vec![ControlPoint::new(0.0, 0.1), END_ANCHOR]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_points_rejects_non_finite() {
        let result = Curve::from_points(vec![
            START_ANCHOR,
            ControlPoint::new(f64::NAN, 0.5),
            END_ANCHOR,
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_points_rejects_out_of_domain() {
        let result = Curve::from_points(vec![
            START_ANCHOR,
            ControlPoint::new(1.5, 0.5),
            END_ANCHOR,
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_pairs_round_trip() {
        let curve = three_point_curve();
        let pairs = curve.to_pairs();
        assert_eq!(pairs, vec![[0.0, 0.0], [0.5, 0.2], [1.0, 1.0]]);
        assert_eq!(Curve::from_pairs(&pairs).unwrap(), curve);
    }

    // ==================== Insert Tests ====================

    #[test]
    fn test_insert_keeps_sorted() {
        let mut curve = three_point_curve();
        assert_eq!(curve.insert(ControlPoint::new(0.25, 0.1)), 1);
        assert_eq!(curve.insert(ControlPoint::new(0.75, 0.6)), 3);
        assert!(curve.is_sorted());
        assert_eq!(curve.len(), 5);
    }

    #[test]
    fn test_insert_allows_duplicate_x() {
        let mut curve = three_point_curve();
        let index = curve.insert(ControlPoint::new(0.5, 0.4));
        assert_eq!(index, 2);
        assert_eq!(curve.points()[1], ControlPoint::new(0.5, 0.2));
        assert_eq!(curve.points()[2], ControlPoint::new(0.5, 0.4));
    }

    #[test]
    fn test_insert_never_displaces_anchors() {
        let mut curve = Curve::default();
        curve.insert(ControlPoint::new(0.0, 0.3));
        curve.insert(ControlPoint::new(1.0, 0.9));
        curve.insert(ControlPoint::new(2.0, 0.9));

        assert_eq!(curve.points()[0], START_ANCHOR);
        assert_eq!(curve.points()[curve.len() - 1], END_ANCHOR);
        assert!(curve.is_sorted());
    }

    // ==================== Remove Tests ====================

    #[test]
    fn test_remove_interior_point() {
        let mut curve = three_point_curve();
        let removed = curve.remove(ControlPoint::new(0.5, 0.2)).unwrap();
        assert_eq!(removed, ControlPoint::new(0.5, 0.2));
        assert_eq!(curve, Curve::default());
    }

    #[test]
    fn test_remove_from_two_points_is_refused() {
        let mut curve = Curve::default();
        assert_eq!(curve.remove(START_ANCHOR), Err(CurveError::CannotRemove));
        assert_eq!(curve.remove_at(1), Err(CurveError::CannotRemove));
        assert_eq!(curve.len(), 2);
    }

    #[test]
    fn test_remove_anchor_is_refused() {
        let mut curve = three_point_curve();
        assert_eq!(curve.remove_at(0), Err(CurveError::AnchorLocked));
        assert_eq!(curve.remove(END_ANCHOR), Err(CurveError::AnchorLocked));
        assert_eq!(curve.len(), 3);
    }

    #[test]
    fn test_remove_missing_point() {
        let mut curve = three_point_curve();
        let result = curve.remove(ControlPoint::new(0.6, 0.2));
        assert!(matches!(result, Err(CurveError::PointNotFound { .. })));
    }

    #[test]
    fn test_anchor_index() {
        let curve = three_point_curve();
        assert!(curve.is_anchor_index(0));
        assert!(!curve.is_anchor_index(1));
        assert!(curve.is_anchor_index(2));
    }

    #[test]
    fn test_has_point_at_x() {
        let curve = three_point_curve();
        assert!(curve.has_point_at_x(0.5, None));
        assert!(!curve.has_point_at_x(0.5, Some(1)));
        assert!(curve.has_point_at_x(1.0, Some(1)));
    }
}
