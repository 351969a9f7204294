//! Approximate comparisons for floating point geometry
//!
//! Every comparison in the region engine goes through these helpers so that a single
//! epsilon (see [`crate::config::RegionConfig`]) controls how close two values must be
//! before they are treated as the same.
//!
//! Comparisons are relative: a value is "almost zero" when it is smaller than
//! `epsilon * max(1, |reference|)`, so large coordinates get a proportionally larger
//! tolerance.

use kurbo::{Point, Rect};
use std::sync::atomic::{AtomicU64, Ordering};

/// Default relative epsilon used for all approximate comparisons
pub const DEFAULT_EPSILON: f64 = 1.0e-8;

/// Bit pattern of the active epsilon (0 means the default is in use)
static EPSILON_BITS: AtomicU64 = AtomicU64::new(0);

/// The epsilon currently in use
pub fn epsilon() -> f64 {
    match EPSILON_BITS.load(Ordering::Relaxed) {
        0 => DEFAULT_EPSILON,
        bits => f64::from_bits(bits),
    }
}

/// Replace the process-wide epsilon. Non-positive or non-finite values restore the default.
pub(crate) fn set_epsilon(value: f64) {
    let bits = if value.is_finite() && value > 0.0 {
        value.to_bits()
    } else {
        0
    };
    EPSILON_BITS.store(bits, Ordering::Relaxed);
}

/// Tolerance for comparing curve parameters (which live in [0, 1])
pub fn param_tolerance() -> f64 {
    epsilon() * 100.0
}

/// Tolerance for comparing two points whose coordinates are around `reference`
pub fn distance_tolerance(reference: f64) -> f64 {
    epsilon() * 100.0 * reference.abs().max(1.0)
}

/// True if `value` is zero within the relative epsilon
#[inline]
pub fn almost_zero(value: f64, reference: f64) -> bool {
    value == 0.0 || value.abs() < epsilon() * reference.abs().max(1.0)
}

/// True if two values are equal within the relative epsilon
#[inline]
pub fn almost_equal(a: f64, b: f64) -> bool {
    a == b || almost_zero(a - b, a.abs().max(b.abs()))
}

/// True if two curve parameters are the same within [`param_tolerance`]
#[inline]
pub fn param_almost_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= param_tolerance()
}

/// Component-wise approximate equality for points
#[inline]
pub fn point_almost_equal(p: Point, q: Point) -> bool {
    almost_equal(p.x, q.x) && almost_equal(p.y, q.y)
}

/// True if two points are within [`distance_tolerance`] of each other
#[inline]
pub fn points_coincide(p: Point, q: Point, reference: f64) -> bool {
    (p - q).hypot() <= distance_tolerance(reference)
}

/// Largest absolute coordinate of a rectangle, used as the reference magnitude for tolerances
pub fn rect_magnitude(rect: Rect) -> f64 {
    rect.x0
        .abs()
        .max(rect.x1.abs())
        .max(rect.y0.abs())
        .max(rect.y1.abs())
        .max(1.0)
}

/// Check if two bounding boxes overlap once both are grown by `inset`
pub fn boxes_intersect(a: Rect, b: Rect, inset: f64) -> bool {
    a.x0 - inset <= b.x1 + inset
        && a.x1 + inset >= b.x0 - inset
        && a.y0 - inset <= b.y1 + inset
        && a.y1 + inset >= b.y0 - inset
}

/// Snap a parameter that is within tolerance of 0 or 1 onto the endpoint
#[inline]
pub fn snap_param(t: f64) -> f64 {
    if t.abs() <= param_tolerance() {
        0.0
    } else if (t - 1.0).abs() <= param_tolerance() {
        1.0
    } else {
        t
    }
}
