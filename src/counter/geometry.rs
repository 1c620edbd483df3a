//! Planar geometry used to decide line crossings.
//!
//! All functions are pure and operate in frame-pixel coordinates.

use nalgebra::Point2;

/// A point in frame-pixel coordinates.
pub type Position = Point2<f64>;

/// Determinant magnitude below which two segments are treated as parallel.
const PARALLEL_EPSILON: f64 = 1e-10;

/// Whether the finite segments `a1-a2` and `b1-b2` intersect.
///
/// Parallel, collinear and zero-length segments never intersect here; the
/// caller falls back to a proximity test for those.
pub fn segments_intersect(a1: Position, a2: Position, b1: Position, b2: Position) -> bool {
    let denom = (a1.x - a2.x) * (b1.y - b2.y) - (a1.y - a2.y) * (b1.x - b2.x);
    if denom.abs() < PARALLEL_EPSILON {
        return false;
    }

    // Position of the intersection along a (t) and along b (u).
    let t = ((a1.x - b1.x) * (b1.y - b2.y) - (a1.y - b1.y) * (b1.x - b2.x)) / denom;
    let u = -((a1.x - a2.x) * (a1.y - b1.y) - (a1.y - a2.y) * (a1.x - b1.x)) / denom;

    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

/// Perpendicular distance from `point` to the infinite line through
/// `seg_start` and `seg_end`.
///
/// The distance is not clamped to the segment. A zero-length segment yields
/// `f64::INFINITY`, which never passes a proximity threshold.
pub fn distance_to_segment(point: Position, seg_start: Position, seg_end: Position) -> f64 {
    let length = (seg_end - seg_start).norm();
    if length < PARALLEL_EPSILON {
        return f64::INFINITY;
    }
    side_of(point, seg_start, seg_end).abs() / length
}

/// Signed 2D cross product of `seg_end - seg_start` and `point - seg_start`.
///
/// Only the sign matters: it tells which half-plane `point` lies in, and is
/// zero when `point` is on the line.
#[inline]
pub fn side_of(point: Position, seg_start: Position, seg_end: Position) -> f64 {
    (seg_end - seg_start).perp(&(point - seg_start))
}

/// Whether two endpoints coincide, making a segment unusable as a line.
#[inline]
pub fn is_degenerate(seg_start: Position, seg_end: Position) -> bool {
    (seg_end - seg_start).norm() < PARALLEL_EPSILON
}
