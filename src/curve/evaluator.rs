//! # Response Curve Evaluator
//!
//! Turns one raw axis reading into a normalized output value.
//!
//! ## Pipeline
//!
//! 1. Split the reading into sign and magnitude
//! 2. Readings with magnitude below the deadzone produce 0.0
//! 3. Locate the curve segment containing the magnitude
//! 4. Interpolate linearly inside that segment
//! 5. Reapply the sign
//!
//! The multiplier is not part of evaluation; callers scale the result
//! (see [`ResponseConfig::respond`](crate::settings::ResponseConfig::respond)).
//!
//! ## Boundaries
//!
//! A magnitude at or past the last point's x yields the last point's y.
//! A magnitude below the first point's x (impossible for anchored curves)
//! yields the first point's y.
//!
//! ## Usage
//!
//! ```
//! use stick_cursor::curve::{ControlPoint, Curve};
//! use stick_cursor::curve::evaluator::evaluate;
//!
//! let curve = Curve::from_points(vec![
//!     ControlPoint::new(0.0, 0.0),
//!     ControlPoint::new(0.5, 0.2),
//!     ControlPoint::new(1.0, 1.0),
//! ])?;
//!
//! // Inside the deadzone
//! assert_eq!(evaluate(0.05, 0.1, &curve), 0.0);
//!
//! // 0.3 is 60% of the way through the first segment
//! assert!((evaluate(0.3, 0.1, &curve) - 0.12).abs() < 1e-9);
//! assert!((evaluate(-0.3, 0.1, &curve) + 0.12).abs() < 1e-9);
//! # Ok::<(), stick_cursor::curve::CurveError>(())
//! ```

use super::{ControlPoint, Curve};

/// Where a magnitude falls on the curve's domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentLookup {
    /// `points[i].x <= magnitude < points[i + 1].x`
    Within(usize),
    /// Magnitude is at or beyond the last point's x
    AboveLast,
    /// Magnitude precedes the first point's x
    NoSegment,
}

/// Finds the segment whose half-open x interval contains `magnitude`.
///
/// Zero-width segments (two points sharing an x) never match, so duplicate
/// x values cannot cause a division by zero during interpolation.
#[must_use]
pub fn locate_segment(points: &[ControlPoint], magnitude: f64) -> SegmentLookup {
    match points.last() {
        Some(last) if magnitude >= last.x => return SegmentLookup::AboveLast,
        None => return SegmentLookup::NoSegment,
        _ => {}
    }

    points
        .windows(2)
        .position(|w| w[0].x <= magnitude && magnitude < w[1].x)
        .map_or(SegmentLookup::NoSegment, SegmentLookup::Within)
}

/// Evaluates the curve for one raw axis value.
///
/// # Arguments
///
/// * `raw` - Raw axis reading (-1.0 to 1.0)
/// * `deadzone` - Magnitudes strictly below this produce 0.0
/// * `curve` - Response curve to interpolate
///
/// # Returns
///
/// Signed curve output; odd in `raw`. Non-finite input produces 0.0.
#[must_use]
pub fn evaluate(raw: f64, deadzone: f64, curve: &Curve) -> f64 {
    if raw == 0.0 || !raw.is_finite() {
        return 0.0;
    }

    let sign = raw.signum();
    let magnitude = raw.abs();

    if magnitude < deadzone {
        return 0.0;
    }

    let points = curve.points();
    let interpolated = match locate_segment(points, magnitude) {
        SegmentLookup::Within(i) => interpolate(points[i], points[i + 1], magnitude),
        SegmentLookup::AboveLast => points[points.len() - 1].y,
        SegmentLookup::NoSegment => points.first().map_or(0.0, |p| p.y),
    };

    sign * interpolated
}

#[inline]
fn interpolate(a: ControlPoint, b: ControlPoint, magnitude: f64) -> f64 {
    let ratio = (magnitude - a.x) / (b.x - a.x);
    a.y + ratio * (b.y - a.y)
}
