//! Closed outlines made of Bezier segments
//!
//! A [`Component`] is a single closed contour: a start point followed by segments,
//! the last of which returns to the start. Its area sign records its orientation
//! (positive is counter-clockwise in a y-up coordinate system).

use crate::curve_intersection::overlap;
use crate::segment::{BezierSegment, Segment};
use crate::split::Split;
use crate::tolerance::{self, param_almost_equal, point_almost_equal};
use kurbo::{Affine, BezPath, ParamCurve, ParamCurveExtrema, PathSeg, Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Bisection steps used to locate a ray crossing on a monotonic curve piece
const CROSSING_BISECTION_STEPS: usize = 48;

/// Structural identity of a component, derived from its exact coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u64);

/// A closed outline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "ComponentData", into = "ComponentData")]
pub struct Component {
    start: Point,
    beziers: Vec<BezierSegment>,
    /// Bounding box of each segment, used to skip segment pairs that cannot meet
    spaces: Vec<Rect>,
    boundary: Rect,
    area: f64,
    id: ComponentId,
}

/// Serialized form of a component: the start point and its segments
#[derive(Serialize, Deserialize)]
struct ComponentData {
    start: Point,
    segments: Vec<Segment>,
}

impl From<ComponentData> for Component {
    fn from(data: ComponentData) -> Self {
        Component::new(data.start, data.segments)
    }
}

impl From<Component> for ComponentData {
    fn from(component: Component) -> Self {
        ComponentData {
            start: component.start,
            segments: component.segments().collect(),
        }
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.beziers == other.beziers
    }
}

impl Component {
    /// Create a component from a start point and segments
    ///
    /// Collinear curves become lines, zero-length segments are dropped and a closing
    /// line is added if the last segment does not end at the start.
    pub fn new(start: Point, segments: impl IntoIterator<Item = Segment>) -> Self {
        let mut beziers = Vec::new();
        let mut current = start;
        for segment in segments {
            let bezier = BezierSegment::new(current, segment);
            if bezier.is_point() {
                continue;
            }
            current = bezier.end();
            beziers.push(bezier);
        }
        Self::from_parts(start, beziers)
    }

    /// Create a component from segments that already carry their start points
    ///
    /// Each segment is assumed to begin where the previous one ended; only the end
    /// points of the segments are used.
    pub fn from_beziers(beziers: impl IntoIterator<Item = BezierSegment>) -> Option<Self> {
        let mut iter = beziers.into_iter().peekable();
        let start = iter.peek()?.start;
        Some(Self::new(start, iter.map(|b| b.segment)))
    }

    /// Build every closed contour in a kurbo path
    ///
    /// Open subpaths are closed with a straight line.
    pub fn from_bez_path(path: &BezPath) -> Vec<Component> {
        let mut builder = crate::builder::ComponentBuilder::new();
        for el in path.elements() {
            builder.push_element(*el);
        }
        builder.build()
    }

    fn from_parts(start: Point, mut beziers: Vec<BezierSegment>) -> Self {
        let end = beziers.last().map(|b| b.end()).unwrap_or(start);
        if !point_almost_equal(end, start) {
            beziers.push(BezierSegment::line(end, start));
        } else if let Some(last) = beziers.last_mut() {
            // Make the closure exact
            *last = BezierSegment::from_path_seg(match last.to_path_seg() {
                PathSeg::Line(mut l) => {
                    l.p1 = start;
                    PathSeg::Line(l)
                }
                PathSeg::Quad(mut q) => {
                    q.p2 = start;
                    PathSeg::Quad(q)
                }
                PathSeg::Cubic(mut c) => {
                    c.p3 = start;
                    PathSeg::Cubic(c)
                }
            });
        }
        if beziers.is_empty() {
            // Degenerate outline with no extent
            beziers.push(BezierSegment::line(start, start));
        }

        let spaces: Vec<Rect> = beziers.iter().map(|b| b.bounding_box()).collect();
        let boundary = spaces
            .iter()
            .skip(1)
            .fold(spaces[0], |acc, r| acc.union(*r));
        let area = beziers.iter().map(|b| b.signed_area()).sum();
        let id = structural_id(start, &beziers);

        Self {
            start,
            beziers,
            spaces,
            boundary,
            area,
            id,
        }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.beziers.len()
    }

    /// Always false: a component has at least one segment
    pub fn is_empty(&self) -> bool {
        self.beziers.is_empty()
    }

    /// Segment `index`, wrapping around the outline
    pub fn segment(&self, index: usize) -> &BezierSegment {
        &self.beziers[index % self.beziers.len()]
    }

    /// All segments with their start points
    pub fn beziers(&self) -> &[BezierSegment] {
        &self.beziers
    }

    /// Segments without their start points
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.beziers.iter().map(|b| b.segment)
    }

    /// Bounding box of segment `index`
    pub(crate) fn space(&self, index: usize) -> Rect {
        self.spaces[index]
    }

    /// Signed area (positive for counter-clockwise outlines)
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Bounding box of the whole outline
    pub fn boundary(&self) -> Rect {
        self.boundary
    }

    /// Structural hash identifying this exact outline
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// True if the outline encloses (almost) no area
    pub fn is_degenerate(&self) -> bool {
        let extent = self.boundary.width() + self.boundary.height();
        tolerance::almost_zero(self.area, extent * extent)
    }

    /// Total arc length of the outline
    pub fn length(&self) -> f64 {
        self.beziers.iter().map(|b| b.length()).sum()
    }

    /// The same outline traversed in the opposite direction
    pub fn reversed(&self) -> Component {
        let beziers: Vec<BezierSegment> = self.beziers.iter().rev().map(|b| b.reversed()).collect();
        Self::from_parts(self.start, beziers)
    }

    /// Apply an affine transform to every point
    pub fn transformed(&self, affine: Affine) -> Component {
        let beziers = self.beziers.iter().map(|b| b.transformed(affine)).collect();
        Self::from_parts(affine * self.start, beziers)
    }

    /// Append this outline to a kurbo path as a closed subpath
    pub fn append_to(&self, path: &mut BezPath) {
        path.move_to(self.start);
        for bezier in &self.beziers {
            match bezier.segment {
                Segment::Line { end } => path.line_to(end),
                Segment::Quad { control, end } => path.quad_to(control, end),
                Segment::Cubic {
                    control1,
                    control2,
                    end,
                } => path.curve_to(control1, control2, end),
            }
        }
        path.close_path();
    }

    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        self.append_to(&mut path);
        path
    }

    /// Winding number of the outline around `point`
    ///
    /// Counts crossings of a ray cast towards +x: upward crossings add one and
    /// downward crossings subtract one, so counter-clockwise outlines give +1 inside.
    pub fn winding(&self, point: Point) -> i32 {
        if point.x > self.boundary.x1
            || point.y < self.boundary.y0
            || point.y > self.boundary.y1
        {
            return 0;
        }
        self.beziers
            .iter()
            .map(|bezier| {
                let seg = bezier.to_path_seg();
                match seg {
                    PathSeg::Line(_) => monotonic_winding(&seg, point),
                    _ => seg
                        .extrema_ranges()
                        .into_iter()
                        .map(|range| monotonic_winding(&seg.subsegment(range), point))
                        .sum(),
                }
            })
            .sum()
    }

    /// A point on the outline strictly between two splits
    ///
    /// Used to decide whether the stretch of outline between the splits lies inside
    /// another component.
    pub fn mid_point(&self, from: &Split, to: &Split) -> Point {
        if from.index == to.index && from.t < to.t {
            return self.segment(from.index).eval((from.t + to.t) / 2.0);
        }
        let segment = self.segment(from.index);
        if from.t < 1.0 && !param_almost_equal(from.t, 1.0) {
            segment.eval((from.t + 1.0) / 2.0)
        } else {
            segment.end()
        }
    }

    /// The stretch of outline running forward from one split to another
    ///
    /// When `from` and `to` are the same position the result is empty. When `to` comes
    /// before `from` on the same segment the stretch wraps all the way around.
    pub fn split_path(&self, from: &Split, to: &Split) -> Vec<BezierSegment> {
        let count = self.beziers.len();
        if from.index == to.index && param_almost_equal(from.t, to.t) {
            return Vec::new();
        }

        let mut path = Vec::new();
        if from.index == to.index && from.t < to.t {
            path.push(self.beziers[from.index].subsegment(from.t, to.t));
            return path;
        }

        // Remainder of the first segment
        if !param_almost_equal(from.t, 1.0) {
            path.push(self.beziers[from.index].subsegment(from.t, 1.0));
        }

        // Whole segments in between, wrapping past the end if needed
        let mut index = (from.index + 1) % count;
        while index != to.index {
            path.push(self.beziers[index]);
            index = (index + 1) % count;
        }

        // Beginning of the last segment
        if !param_almost_equal(to.t, 0.0) {
            path.push(self.beziers[to.index].subsegment(0.0, to.t));
        }
        path
    }

    /// True if this outline encloses `other`
    pub fn contains(&self, other: &Component) -> bool {
        self.contains_with_hint(other, &[])
    }

    /// Containment test using segments of `other` known not to touch this outline
    ///
    /// The winding number is sampled at the middle of the longest such segment. With
    /// an empty hint the candidate segments are computed here.
    pub(crate) fn contains_with_hint(&self, other: &Component, hint: &[usize]) -> bool {
        if !tolerance::boxes_intersect(self.boundary, other.boundary, 0.0) {
            return false;
        }
        if self.area.abs() < other.area.abs() {
            return false;
        }

        let computed: Vec<usize>;
        let candidates = if hint.is_empty() {
            computed = (0..other.len())
                .filter(|&i| {
                    let seg = other.segment(i);
                    !self.beziers.iter().enumerate().any(|(j, mine)| {
                        tolerance::boxes_intersect(self.spaces[j], other.space(i), 0.0)
                            && overlap(mine, seg)
                    })
                })
                .collect();
            &computed[..]
        } else {
            hint
        };

        let longest = candidates.iter().copied().max_by(|&a, &b| {
            other
                .segment(a)
                .approximate_length()
                .total_cmp(&other.segment(b).approximate_length())
        });
        match longest {
            Some(index) => self.winding(other.segment(index).eval(0.5)) != 0,
            None => false,
        }
    }
}

/// Winding contribution of a piece that is monotonic in y
fn monotonic_winding(seg: &PathSeg, point: Point) -> i32 {
    let start = seg.start();
    let end = seg.end();

    // Half-open in y so a ray through a vertex is counted once
    let (direction, low, high) = if start.y < end.y {
        (1, start.y, end.y)
    } else if start.y > end.y {
        (-1, end.y, start.y)
    } else {
        return 0;
    };
    if point.y < low || point.y >= high {
        return 0;
    }

    let x = match seg {
        PathSeg::Line(l) => l.p0.x + (point.y - l.p0.y) * (l.p1.x - l.p0.x) / (l.p1.y - l.p0.y),
        _ => {
            let (mut t0, mut t1) = (0.0, 1.0);
            for _ in 0..CROSSING_BISECTION_STEPS {
                let mid = (t0 + t1) / 2.0;
                let below = seg.eval(mid).y < point.y;
                if below == (direction > 0) {
                    t0 = mid;
                } else {
                    t1 = mid;
                }
            }
            seg.eval((t0 + t1) / 2.0).x
        }
    };

    if x > point.x {
        direction
    } else {
        0
    }
}

fn structural_id(start: Point, beziers: &[BezierSegment]) -> ComponentId {
    fn write_point(p: Point, hasher: &mut DefaultHasher) {
        p.x.to_bits().hash(hasher);
        p.y.to_bits().hash(hasher);
    }

    let mut hasher = DefaultHasher::new();
    write_point(start, &mut hasher);
    for bezier in beziers {
        match bezier.segment {
            Segment::Line { end } => {
                0u8.hash(&mut hasher);
                write_point(end, &mut hasher);
            }
            Segment::Quad { control, end } => {
                1u8.hash(&mut hasher);
                write_point(control, &mut hasher);
                write_point(end, &mut hasher);
            }
            Segment::Cubic {
                control1,
                control2,
                end,
            } => {
                2u8.hash(&mut hasher);
                write_point(control1, &mut hasher);
                write_point(control2, &mut hasher);
                write_point(end, &mut hasher);
            }
        }
    }
    ComponentId(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Component {
        Component::new(
            Point::new(x, y),
            vec![
                Segment::Line {
                    end: Point::new(x + size, y),
                },
                Segment::Line {
                    end: Point::new(x + size, y + size),
                },
                Segment::Line {
                    end: Point::new(x, y + size),
                },
            ],
        )
    }

    #[test]
    fn test_auto_close_and_area() {
        let sq = square(0.0, 0.0, 10.0);
        assert_eq!(sq.len(), 4);
        assert!((sq.area() - 100.0).abs() < 1e-9);
        assert!((sq.reversed().area() + 100.0).abs() < 1e-9);
        assert_eq!(sq.boundary(), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!((sq.length() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_winding_sign_follows_orientation() {
        let sq = square(0.0, 0.0, 10.0);
        assert_eq!(sq.winding(Point::new(5.0, 5.0)), 1);
        assert_eq!(sq.reversed().winding(Point::new(5.0, 5.0)), -1);
        assert_eq!(sq.winding(Point::new(15.0, 5.0)), 0);
        assert_eq!(sq.winding(Point::new(-5.0, 5.0)), 0);
    }

    #[test]
    fn test_winding_of_curved_outline() {
        // Circle-ish outline made of two arches
        let c = Component::new(
            Point::new(0.0, 0.0),
            vec![
                Segment::Cubic {
                    control1: Point::new(0.0, -13.0),
                    control2: Point::new(20.0, -13.0),
                    end: Point::new(20.0, 0.0),
                },
                Segment::Cubic {
                    control1: Point::new(20.0, 13.0),
                    control2: Point::new(0.0, 13.0),
                    end: Point::new(0.0, 0.0),
                },
            ],
        );
        assert!(c.area() > 0.0);
        assert_eq!(c.winding(Point::new(10.0, 0.0)), 1);
        assert_eq!(c.winding(Point::new(10.0, 9.0)), 1);
        assert_eq!(c.winding(Point::new(10.0, 11.0)), 0);
    }

    #[test]
    fn test_contains() {
        let outer = square(0.0, 0.0, 10.0);
        let inner = square(2.0, 2.0, 2.0);
        let apart = square(20.0, 0.0, 2.0);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(!outer.contains(&apart));
    }

    #[test]
    fn test_split_path_forward_and_wrapping() {
        let sq = square(0.0, 0.0, 10.0);
        let a = Split::new(0, 0.5, Point::new(5.0, 0.0));
        let b = Split::new(2, 0.5, Point::new(5.0, 10.0));

        let forward = sq.split_path(&a, &b);
        assert_eq!(forward.len(), 3);
        assert_eq!(forward[0].start, Point::new(5.0, 0.0));
        assert_eq!(forward[2].end(), Point::new(5.0, 10.0));

        let back = sq.split_path(&b, &a);
        assert_eq!(back.len(), 3);
        assert_eq!(back[2].end(), Point::new(5.0, 0.0));

        // Same segment, going backwards wraps around the whole outline
        let c = Split::new(0, 0.25, Point::new(2.5, 0.0));
        let around = sq.split_path(&a, &c);
        assert_eq!(around.len(), 5);

        assert!(sq.split_path(&a, &a).is_empty());
    }

    #[test]
    fn test_mid_point_avoids_vertices() {
        let sq = square(0.0, 0.0, 10.0);
        let a = Split::new(0, 0.5, Point::new(5.0, 0.0));
        let b = Split::new(1, 0.5, Point::new(10.0, 5.0));
        assert_eq!(sq.mid_point(&a, &b), Point::new(7.5, 0.0));
        let c = Split::new(0, 0.75, Point::new(7.5, 0.0));
        assert_eq!(sq.mid_point(&a, &c), Point::new(6.25, 0.0));
    }

    #[test]
    fn test_structural_id() {
        assert_eq!(square(0.0, 0.0, 10.0).id(), square(0.0, 0.0, 10.0).id());
        assert_ne!(square(0.0, 0.0, 10.0).id(), square(0.0, 0.0, 11.0).id());
        assert_ne!(square(0.0, 0.0, 10.0).id(), square(0.0, 0.0, 10.0).reversed().id());
    }

    #[test]
    fn test_collinear_points_dropped() {
        let c = Component::new(
            Point::new(0.0, 0.0),
            vec![
                Segment::Line {
                    end: Point::new(0.0, 0.0),
                },
                Segment::Line {
                    end: Point::new(10.0, 0.0),
                },
                Segment::Line {
                    end: Point::new(10.0, 10.0),
                },
            ],
        );
        assert_eq!(c.len(), 3);
    }
}
