//! Bezier segments that make up a component outline
//!
//! A [`Segment`] only stores the points after its start, since the start is the end of
//! the previous segment in a closed outline. [`BezierSegment`] pairs a segment with the
//! point it starts from and carries all of the geometric operations.

use crate::tolerance::{self, point_almost_equal};
use kurbo::{
    Affine, CubicBez, Line, ParamCurve, ParamCurveArclen, ParamCurveArea, ParamCurveExtrema,
    PathSeg, Point, QuadBez, Rect, Vec2,
};
use serde::{Deserialize, Serialize};

/// Accuracy used when measuring arc length
const ARCLEN_ACCURACY: f64 = 1e-6;

/// The part of a Bezier segment that follows its start point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    /// Straight line to `end`
    Line { end: Point },
    /// Quadratic Bezier with one control point
    Quad { control: Point, end: Point },
    /// Cubic Bezier with two control points
    Cubic {
        control1: Point,
        control2: Point,
        end: Point,
    },
}

impl Segment {
    /// The point this segment finishes at
    pub fn end(&self) -> Point {
        match *self {
            Segment::Line { end } => end,
            Segment::Quad { end, .. } => end,
            Segment::Cubic { end, .. } => end,
        }
    }

    /// Apply an affine transform to every point
    pub fn transformed(&self, affine: Affine) -> Segment {
        match *self {
            Segment::Line { end } => Segment::Line { end: affine * end },
            Segment::Quad { control, end } => Segment::Quad {
                control: affine * control,
                end: affine * end,
            },
            Segment::Cubic {
                control1,
                control2,
                end,
            } => Segment::Cubic {
                control1: affine * control1,
                control2: affine * control2,
                end: affine * end,
            },
        }
    }
}

/// A segment together with the point it starts from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierSegment {
    pub start: Point,
    pub segment: Segment,
}

impl BezierSegment {
    /// Attach a start point to a segment, replacing collinear curves with lines
    pub fn new(start: Point, segment: Segment) -> Self {
        match segment {
            Segment::Line { .. } => Self { start, segment },
            Segment::Quad { control, end } => Self::quad(start, control, end),
            Segment::Cubic {
                control1,
                control2,
                end,
            } => Self::cubic(start, control1, control2, end),
        }
    }

    /// A straight line
    pub fn line(start: Point, end: Point) -> Self {
        Self {
            start,
            segment: Segment::Line { end },
        }
    }

    /// A quadratic curve. Collinear control points give a line.
    pub fn quad(start: Point, control: Point, end: Point) -> Self {
        if collinear(&[start, control, end]) {
            return Self::line(start, end);
        }
        Self {
            start,
            segment: Segment::Quad { control, end },
        }
    }

    /// A cubic curve. Collinear control points give a line.
    pub fn cubic(start: Point, control1: Point, control2: Point, end: Point) -> Self {
        if collinear(&[start, control1, control2, end]) {
            return Self::line(start, end);
        }
        Self {
            start,
            segment: Segment::Cubic {
                control1,
                control2,
                end,
            },
        }
    }

    /// Build from a kurbo segment, keeping the geometry exactly as given
    pub fn from_path_seg(seg: PathSeg) -> Self {
        match seg {
            PathSeg::Line(l) => Self {
                start: l.p0,
                segment: Segment::Line { end: l.p1 },
            },
            PathSeg::Quad(q) => Self {
                start: q.p0,
                segment: Segment::Quad {
                    control: q.p1,
                    end: q.p2,
                },
            },
            PathSeg::Cubic(c) => Self {
                start: c.p0,
                segment: Segment::Cubic {
                    control1: c.p1,
                    control2: c.p2,
                    end: c.p3,
                },
            },
        }
    }

    /// Convert to a kurbo segment
    pub fn to_path_seg(&self) -> PathSeg {
        match self.segment {
            Segment::Line { end } => PathSeg::Line(Line::new(self.start, end)),
            Segment::Quad { control, end } => {
                PathSeg::Quad(QuadBez::new(self.start, control, end))
            }
            Segment::Cubic {
                control1,
                control2,
                end,
            } => PathSeg::Cubic(CubicBez::new(self.start, control1, control2, end)),
        }
    }

    pub fn end(&self) -> Point {
        self.segment.end()
    }

    /// True for straight segments
    pub fn is_line(&self) -> bool {
        matches!(self.segment, Segment::Line { .. })
    }

    /// True if the segment has collapsed to (almost) a single point
    pub fn is_point(&self) -> bool {
        self.control_points()
            .iter()
            .all(|p| point_almost_equal(*p, self.start))
    }

    /// Start, control and end points in order
    pub fn control_points(&self) -> Vec<Point> {
        match self.segment {
            Segment::Line { end } => vec![self.start, end],
            Segment::Quad { control, end } => vec![self.start, control, end],
            Segment::Cubic {
                control1,
                control2,
                end,
            } => vec![self.start, control1, control2, end],
        }
    }

    /// Evaluate the curve at parameter `t`
    pub fn eval(&self, t: f64) -> Point {
        match t {
            t if t <= 0.0 => self.start,
            t if t >= 1.0 => self.end(),
            t => self.to_path_seg().eval(t),
        }
    }

    /// First derivative with respect to `t`
    pub fn derivative(&self, t: f64) -> Vec2 {
        let mt = 1.0 - t;
        match self.segment {
            Segment::Line { end } => end - self.start,
            Segment::Quad { control, end } => {
                2.0 * (mt * (control - self.start) + t * (end - control))
            }
            Segment::Cubic {
                control1,
                control2,
                end,
            } => {
                3.0 * (mt * mt * (control1 - self.start)
                    + 2.0 * t * mt * (control2 - control1)
                    + t * t * (end - control2))
            }
        }
    }

    /// Tight bounding box of the curve
    pub fn bounding_box(&self) -> Rect {
        match self.segment {
            Segment::Line { end } => Rect::from_points(self.start, end),
            _ => self.to_path_seg().bounding_box(),
        }
    }

    /// Bounding box of the control polygon, which always contains the curve
    pub fn hull_box(&self) -> Rect {
        let points = self.control_points();
        points
            .iter()
            .skip(1)
            .fold(Rect::from_points(points[0], points[0]), |rect, p| {
                rect.union_pt(*p)
            })
    }

    /// Signed area between the curve and the origin (positive for counter-clockwise
    /// contributions in a y-up coordinate system)
    pub fn signed_area(&self) -> f64 {
        self.to_path_seg().signed_area()
    }

    /// Arc length of the curve
    pub fn length(&self) -> f64 {
        match self.segment {
            Segment::Line { end } => (end - self.start).hypot(),
            _ => self.to_path_seg().arclen(ARCLEN_ACCURACY),
        }
    }

    /// Length of an 11-point polyline through the curve, a cheap length estimate
    pub fn approximate_length(&self) -> f64 {
        if self.is_line() {
            return self.length();
        }
        let mut last = self.start;
        let mut total = 0.0;
        for i in 1..=10 {
            let p = self.eval(i as f64 / 10.0);
            total += (p - last).hypot();
            last = p;
        }
        total
    }

    /// The portion of this segment between two parameters
    pub fn subsegment(&self, t0: f64, t1: f64) -> BezierSegment {
        let mut piece = match self.segment {
            Segment::Line { end } => {
                BezierSegment::line(self.start.lerp(end, t0), self.start.lerp(end, t1))
            }
            _ => BezierSegment::from_path_seg(self.to_path_seg().subsegment(t0..t1)),
        };
        // Pin exact endpoints so neighbouring pieces join without gaps
        if t0 <= 0.0 {
            piece.start = self.start;
        }
        if t1 >= 1.0 {
            piece.set_end(self.end());
        }
        piece
    }

    /// Split into two pieces at `t`. Both pieces share the exact same split point.
    pub fn split(&self, t: f64) -> (BezierSegment, BezierSegment) {
        let left = self.subsegment(0.0, t);
        let mut right = self.subsegment(t, 1.0);
        right.start = left.end();
        (left, right)
    }

    /// Split at several parameters, returning one more piece than there are parameters
    pub fn split_at(&self, params: &[f64]) -> Vec<BezierSegment> {
        let mut sorted: Vec<f64> = params
            .iter()
            .copied()
            .filter(|t| *t > 0.0 && *t < 1.0)
            .collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        sorted.dedup_by(|a, b| tolerance::param_almost_equal(*a, *b));

        let mut pieces = Vec::with_capacity(sorted.len() + 1);
        let mut last_t = 0.0;
        let mut last_point = self.start;
        for t in sorted {
            let mut piece = self.subsegment(last_t, t);
            piece.start = last_point;
            last_point = piece.end();
            last_t = t;
            pieces.push(piece);
        }
        let mut tail = self.subsegment(last_t, 1.0);
        tail.start = last_point;
        pieces.push(tail);
        pieces
    }

    /// The same curve traversed in the opposite direction
    pub fn reversed(&self) -> BezierSegment {
        let segment = match self.segment {
            Segment::Line { .. } => Segment::Line { end: self.start },
            Segment::Quad { control, .. } => Segment::Quad {
                control,
                end: self.start,
            },
            Segment::Cubic {
                control1,
                control2,
                ..
            } => Segment::Cubic {
                control1: control2,
                control2: control1,
                end: self.start,
            },
        };
        BezierSegment {
            start: self.end(),
            segment,
        }
    }

    /// Apply an affine transform to every point
    pub fn transformed(&self, affine: Affine) -> BezierSegment {
        BezierSegment {
            start: affine * self.start,
            segment: self.segment.transformed(affine),
        }
    }

    fn set_end(&mut self, point: Point) {
        match &mut self.segment {
            Segment::Line { end } => *end = point,
            Segment::Quad { end, .. } => *end = point,
            Segment::Cubic { end, .. } => *end = point,
        }
    }
}

/// True if all points lie on one line (within tolerance)
fn collinear(points: &[Point]) -> bool {
    let first = points[0];
    let last = points[points.len() - 1];
    let chord = last - first;
    let length = chord.hypot();

    if tolerance::almost_zero(length, 0.0) {
        // Closed curve: only degenerate if every point sits on the start
        return points.iter().all(|p| point_almost_equal(*p, first));
    }

    let reference = points
        .iter()
        .fold(1.0_f64, |acc, p| acc.max(p.x.abs()).max(p.y.abs()));
    points[1..points.len() - 1].iter().all(|p| {
        let distance = chord.cross(*p - first) / length;
        let along = chord.dot(*p - first) / (length * length);
        // Control points beyond the chord would make the curve double back
        tolerance::almost_zero(distance, reference) && (-1e-9..=1.0 + 1e-9).contains(&along)
    })
}
