//! Intersection, overlap and proximity queries between Bezier segments
//!
//! Lines are intersected in closed form, lines against curves by solving the curve's
//! signed distance to the line, and curves against curves by recursive subdivision
//! with bounding box pruning followed by Newton refinement.
//!
//! All returned parameters are snapped onto 0 or 1 when they are within tolerance of
//! an endpoint, so callers can recognise vertex hits exactly.

use crate::config;
use crate::segment::{BezierSegment, Segment};
use crate::tolerance::{self, param_almost_equal, points_coincide, snap_param};
use kurbo::common::{solve_cubic, solve_quadratic};
use kurbo::{ParamCurveNearest, Point, Vec2};

/// Accuracy passed to kurbo's nearest point search
const NEAREST_ACCURACY: f64 = 1e-12;

/// Upper bound on subdivision steps for a single curve/curve query
const MAX_SUBDIVISION_STEPS: usize = 1 << 14;

/// Newton iterations used to polish curve/curve intersections
const NEWTON_ITERATIONS: usize = 16;

/// Find every point where two segments cross or touch
///
/// Returns `(t_a, t_b)` parameter pairs, sorted by `t_a`. Segments that overlap along a
/// stretch report nothing here; use [`overlap`] to detect that case.
pub fn intersect(a: &BezierSegment, b: &BezierSegment) -> Vec<(f64, f64)> {
    if a.is_point() || b.is_point() {
        return Vec::new();
    }

    let mut hits = match (a.is_line(), b.is_line()) {
        (true, true) => line_line(a, b),
        (true, false) => line_curve(a, b),
        (false, true) => line_curve(b, a).into_iter().map(|(t, s)| (s, t)).collect(),
        (false, false) => curve_curve(a, b),
    };

    for hit in hits.iter_mut() {
        hit.0 = snap_param(hit.0);
        hit.1 = snap_param(hit.1);
    }
    hits.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.total_cmp(&y.1)));
    hits.dedup_by(|x, y| param_almost_equal(x.0, y.0) && param_almost_equal(x.1, y.1));
    hits
}

/// True if two segments share a stretch of non-zero length
pub fn overlap(a: &BezierSegment, b: &BezierSegment) -> bool {
    if a.is_point() || b.is_point() {
        return false;
    }

    // Parameters on `a` where the shared stretch could begin or end
    let mut params: Vec<f64> = Vec::with_capacity(4);
    if let Some(t) = point_on(a, b.start) {
        params.push(t);
    }
    if let Some(t) = point_on(a, b.end()) {
        params.push(t);
    }
    if point_on(b, a.start).is_some() {
        params.push(0.0);
    }
    if point_on(b, a.end()).is_some() {
        params.push(1.0);
    }
    if params.len() < 2 {
        return false;
    }

    let min = params.iter().copied().fold(f64::INFINITY, f64::min);
    let max = params.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max - min <= tolerance::param_tolerance() {
        return false;
    }

    // The interior of the stretch must also lie on `b`
    [0.25, 0.5, 0.75]
        .iter()
        .all(|f| point_on(b, a.eval(min + (max - min) * f)).is_some())
}

/// Parameter of the point on `segment` nearest to `point`
pub fn closest_point(segment: &BezierSegment, point: Point) -> f64 {
    match segment.segment {
        Segment::Line { end } => {
            let dir = end - segment.start;
            let len2 = dir.hypot2();
            if len2 == 0.0 {
                0.0
            } else {
                ((point - segment.start).dot(dir) / len2).clamp(0.0, 1.0)
            }
        }
        _ => segment
            .to_path_seg()
            .nearest(point, NEAREST_ACCURACY)
            .t
            .clamp(0.0, 1.0),
    }
}

/// Parameter at which `point` lies on `segment`, if it does
pub fn point_on(segment: &BezierSegment, point: Point) -> Option<f64> {
    let reference = magnitude(segment, point);
    if points_coincide(segment.start, point, reference) {
        return Some(0.0);
    }
    if points_coincide(segment.end(), point, reference) {
        return Some(1.0);
    }

    let t = closest_point(segment, point);
    if points_coincide(segment.eval(t), point, reference) {
        Some(snap_param(t))
    } else {
        None
    }
}

/// Parameters `(t0, t1)` with `t0 < t1` where a cubic crosses itself
///
/// Lines and quadratics never self-intersect, so they always give `None`.
pub fn self_intersect(segment: &BezierSegment) -> Option<(f64, f64)> {
    let Segment::Cubic {
        control1,
        control2,
        end,
    } = segment.segment
    else {
        return None;
    };

    // Power basis: P(t) = a t^3 + b t^2 + c t + d
    let p0 = segment.start.to_vec2();
    let p1 = control1.to_vec2();
    let p2 = control2.to_vec2();
    let p3 = end.to_vec2();
    let a = p3 - p0 + 3.0 * (p1 - p2);
    let b = 3.0 * (p0 - 2.0 * p1 + p2);
    let c = 3.0 * (p1 - p0);

    let reference = magnitude(segment, segment.start);
    let ab = a.cross(b);
    if tolerance::almost_zero(a.hypot(), reference) || tolerance::almost_zero(ab, reference * reference) {
        return None;
    }

    // P(s) = P(t) for s != t reduces to s + t = sigma, s * t = pi
    let sigma = -a.cross(c) / ab;
    let pi = sigma * sigma + a.dot(b * sigma + c) / a.hypot2();
    let discriminant = sigma * sigma - 4.0 * pi;
    if discriminant <= tolerance::param_tolerance() {
        return None;
    }

    let root = discriminant.sqrt();
    let t0 = snap_param((sigma - root) / 2.0);
    let t1 = snap_param((sigma + root) / 2.0);
    let in_range = |t: f64| (0.0..=1.0).contains(&t);
    if !in_range(t0) || !in_range(t1) || param_almost_equal(t0, t1) {
        return None;
    }
    Some((t0, t1))
}

/// Reference magnitude for distance comparisons near a segment
fn magnitude(segment: &BezierSegment, point: Point) -> f64 {
    tolerance::rect_magnitude(segment.hull_box().union_pt(point))
}

fn line_line(a: &BezierSegment, b: &BezierSegment) -> Vec<(f64, f64)> {
    let d1 = a.end() - a.start;
    let d2 = b.end() - b.start;
    let denom = d1.cross(d2);
    if tolerance::almost_zero(denom, d1.hypot() * d2.hypot()) {
        // Parallel lines only meet along an overlap
        return Vec::new();
    }

    let offset = b.start - a.start;
    let t = snap_param(offset.cross(d2) / denom);
    let s = snap_param(offset.cross(d1) / denom);
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&s) {
        vec![(t, s)]
    } else {
        Vec::new()
    }
}

/// Intersect a straight segment with a curve, returning `(t_line, t_curve)` pairs
fn line_curve(line: &BezierSegment, curve: &BezierSegment) -> Vec<(f64, f64)> {
    let origin = line.start;
    let dir = line.end() - origin;
    let len2 = dir.hypot2();
    if len2 == 0.0 {
        return Vec::new();
    }

    // Signed distance of the curve from the line, as a polynomial in t
    let roots: Vec<f64> = match curve.segment {
        Segment::Line { .. } => return Vec::new(),
        Segment::Quad { control, end } => {
            let q0 = curve.start - origin;
            let c1 = 2.0 * (control - curve.start);
            let c2 = curve.start.to_vec2() - 2.0 * control.to_vec2() + end.to_vec2();
            solve_quadratic(dir.cross(q0), dir.cross(c1), dir.cross(c2))
                .into_iter()
                .collect()
        }
        Segment::Cubic {
            control1,
            control2,
            end,
        } => {
            let p0 = curve.start.to_vec2();
            let p1 = control1.to_vec2();
            let p2 = control2.to_vec2();
            let p3 = end.to_vec2();
            let c0 = curve.start - origin;
            let c1 = 3.0 * (p1 - p0);
            let c2 = 3.0 * (p0 - 2.0 * p1 + p2);
            let c3 = p3 - p0 + 3.0 * (p1 - p2);
            solve_cubic(dir.cross(c0), dir.cross(c1), dir.cross(c2), dir.cross(c3))
                .into_iter()
                .collect()
        }
    };

    let slack = tolerance::param_tolerance();
    roots
        .into_iter()
        .filter(|t| t.is_finite() && *t >= -slack && *t <= 1.0 + slack)
        .filter_map(|t| {
            let t = snap_param(t.clamp(0.0, 1.0));
            let p = curve.eval(t);
            let s = snap_param((p - origin).dot(dir) / len2);
            (-slack..=1.0 + slack)
                .contains(&s)
                .then(|| (s.clamp(0.0, 1.0), t))
        })
        .collect()
}

/// Intersect two curves by subdivision
///
/// Both curves are cut in half until their bounding boxes stop overlapping or become
/// tiny; surviving pairs are then refined with Newton's method.
fn curve_curve(a: &BezierSegment, b: &BezierSegment) -> Vec<(f64, f64)> {
    let reference = tolerance::rect_magnitude(a.hull_box().union(b.hull_box()));
    let dist_tol = tolerance::distance_tolerance(reference);
    let leaf_size = (a.hull_box().width() + a.hull_box().height())
        .max(b.hull_box().width() + b.hull_box().height())
        * 1e-4;
    let max_depth = config::subdivision_depth();

    let mut results: Vec<(f64, f64)> = Vec::new();
    let mut stack = vec![(0.0, 1.0, 0.0, 1.0, 0usize)];
    let mut steps = 0;

    while let Some((a0, a1, b0, b1, depth)) = stack.pop() {
        steps += 1;
        if steps > MAX_SUBDIVISION_STEPS {
            log::warn!("Curve intersection gave up after {} subdivision steps", steps);
            break;
        }

        let piece_a = a.subsegment(a0, a1);
        let piece_b = b.subsegment(b0, b1);
        let box_a = piece_a.hull_box();
        let box_b = piece_b.hull_box();
        if !tolerance::boxes_intersect(box_a, box_b, dist_tol) {
            continue;
        }

        let small = box_a.width() + box_a.height() <= leaf_size
            && box_b.width() + box_b.height() <= leaf_size;
        if small || depth >= max_depth {
            let guess = ((a0 + a1) / 2.0, (b0 + b1) / 2.0);
            match newton_refine(a, b, guess, dist_tol) {
                Some(hit) => results.push(hit),
                None => {
                    if (a.eval(guess.0) - b.eval(guess.1)).hypot() <= dist_tol {
                        results.push(guess);
                    }
                }
            }
            continue;
        }

        let am = (a0 + a1) / 2.0;
        let bm = (b0 + b1) / 2.0;
        stack.push((a0, am, b0, bm, depth + 1));
        stack.push((a0, am, bm, b1, depth + 1));
        stack.push((am, a1, b0, bm, depth + 1));
        stack.push((am, a1, bm, b1, depth + 1));
    }

    // Neighbouring leaves usually converge onto the same crossing
    results.sort_by(|x, y| x.0.total_cmp(&y.0));
    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(results.len());
    for hit in results {
        let duplicate = merged.iter().any(|m| {
            (param_almost_equal(m.0, hit.0) && param_almost_equal(m.1, hit.1))
                || (a.eval(m.0) - a.eval(hit.0)).hypot() <= dist_tol
        });
        if !duplicate {
            merged.push(hit);
        }
    }
    merged
}

/// Solve A(s) = B(u) with Newton's method starting from `guess`
fn newton_refine(
    a: &BezierSegment,
    b: &BezierSegment,
    guess: (f64, f64),
    dist_tol: f64,
) -> Option<(f64, f64)> {
    let (mut s, mut u) = guess;
    for _ in 0..NEWTON_ITERATIONS {
        let f: Vec2 = a.eval(s) - b.eval(u);
        if f.hypot() <= dist_tol * 1e-3 {
            break;
        }
        let da = a.derivative(s);
        let db = b.derivative(u);
        // Jacobian [da, -db]
        let det = -da.cross(db);
        if det == 0.0 || !det.is_finite() {
            break;
        }
        let ds = (-f.x * -db.y + f.y * -db.x) / det;
        let du = (da.x * -f.y + da.y * f.x) / det;
        s = (s + ds).clamp(0.0, 1.0);
        u = (u + du).clamp(0.0, 1.0);
    }

    if (a.eval(s) - b.eval(u)).hypot() <= dist_tol {
        Some((s, u))
    } else {
        None
    }
}
