//! Regions: sets of disjoint solids and their boolean algebra
//!
//! A [`Region`] is the value type callers work with. It holds solids whose interiors do
//! not overlap and supports union, intersection, subtraction and symmetric difference,
//! set predicates built on top of those, and affine transforms.

use crate::component::Component;
use crate::segment::Segment;
use crate::solid::Solid;
use crate::tolerance;
use crate::winding::{self, WindingRule};
use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::Mul;

/// Control point distance for approximating a quarter circle with a cubic
const KAPPA: f64 = 0.5522847498;

/// A set of disjoint solids
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "RegionData", into = "RegionData")]
pub struct Region {
    solids: Vec<Solid>,
    boundary: Rect,
}

#[derive(Serialize, Deserialize)]
struct RegionData {
    solids: Vec<Solid>,
}

impl From<RegionData> for Region {
    fn from(data: RegionData) -> Self {
        Region::from_solids(data.solids)
    }
}

impl From<Region> for RegionData {
    fn from(region: Region) -> Self {
        RegionData {
            solids: region.solids,
        }
    }
}

impl From<Solid> for Region {
    fn from(solid: Solid) -> Self {
        Region::from_solids([solid])
    }
}

impl Region {
    /// The empty region
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap solids that are already known to be disjoint
    pub(crate) fn from_solids(solids: impl IntoIterator<Item = Solid>) -> Self {
        let solids: Vec<Solid> = solids.into_iter().collect();
        let boundary = solids
            .iter()
            .map(|s| s.boundary())
            .reduce(|acc, r| acc.union(r))
            .unwrap_or(Rect::ZERO);
        Self { solids, boundary }
    }

    /// The area enclosed by a single simple outline
    pub fn from_component(component: Component) -> Self {
        Self::from_solids(Solid::from_component(component))
    }

    /// The area enclosed by arbitrary outlines under a fill rule
    ///
    /// Outlines may cross themselves and each other.
    pub fn from_contours(contours: impl IntoIterator<Item = Component>, rule: WindingRule) -> Self {
        winding::normalize(contours, rule)
    }

    /// The area a kurbo path fills under a fill rule
    pub fn from_bez_path(path: &BezPath, rule: WindingRule) -> Self {
        Self::from_contours(Component::from_bez_path(path), rule)
    }

    /// An axis-aligned rectangle
    pub fn rectangle(rect: Rect) -> Self {
        let rect = rect.abs();
        let corners = [
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ];
        Self::from_component(Component::new(
            Point::new(rect.x0, rect.y0),
            corners.map(|end| Segment::Line { end }),
        ))
    }

    /// An axis-aligned ellipse made of four cubic arcs
    pub fn ellipse(center: Point, rx: f64, ry: f64) -> Self {
        if rx <= 0.0 || ry <= 0.0 {
            return Self::new();
        }
        let (cx, cy) = (center.x, center.y);
        let (kx, ky) = (KAPPA * rx, KAPPA * ry);
        let arc = |c1: (f64, f64), c2: (f64, f64), end: (f64, f64)| Segment::Cubic {
            control1: Point::new(cx + c1.0, cy + c1.1),
            control2: Point::new(cx + c2.0, cy + c2.1),
            end: Point::new(cx + end.0, cy + end.1),
        };
        Self::from_component(Component::new(
            Point::new(cx + rx, cy),
            [
                arc((rx, ky), (kx, ry), (0.0, ry)),
                arc((-kx, ry), (-rx, ky), (-rx, 0.0)),
                arc((-rx, -ky), (-kx, -ry), (0.0, -ry)),
                arc((kx, -ry), (rx, -ky), (rx, 0.0)),
            ],
        ))
    }

    /// A regular polygon with `edges` sides (at least three)
    pub fn polygon(center: Point, radius: f64, edges: usize) -> Self {
        if edges < 3 || radius <= 0.0 {
            return Self::new();
        }
        let vertex = |k: usize| {
            let angle = 2.0 * PI * k as f64 / edges as f64;
            Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        };
        Self::from_component(Component::new(
            vertex(0),
            (1..edges).map(|k| Segment::Line { end: vertex(k) }),
        ))
    }

    pub fn solids(&self) -> impl Iterator<Item = &Solid> {
        self.solids.iter()
    }

    pub fn into_solids(self) -> Vec<Solid> {
        self.solids
    }

    /// Number of solids
    pub fn len(&self) -> usize {
        self.solids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solids.is_empty()
    }

    /// Total net area of all solids
    pub fn area(&self) -> f64 {
        self.solids.iter().map(|s| s.area()).sum()
    }

    /// Bounding box of all solids (zero-sized for the empty region)
    pub fn boundary(&self) -> Rect {
        self.boundary
    }

    /// Every outline, outer boundaries counter-clockwise and holes clockwise
    pub fn components(&self) -> Vec<Component> {
        self.components_wound(true)
    }

    pub(crate) fn components_wound(&self, positive: bool) -> Vec<Component> {
        self.solids
            .iter()
            .flat_map(|s| s.components(positive))
            .collect()
    }

    /// A path that fills this region under the non-zero rule
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for component in self.components() {
            component.append_to(&mut path);
        }
        path
    }

    /// Points covered by either region
    pub fn union(&self, other: &Region) -> Region {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        if !tolerance::boxes_intersect(self.boundary, other.boundary, 0.0) {
            return Region::from_solids(self.solids.iter().chain(other.solids.iter()).cloned());
        }

        // Solids from the same group are already disjoint and never compared again
        let mut result: Vec<(Solid, usize)> = self.solids.iter().map(|s| (s.clone(), 0)).collect();
        let mut remain: Vec<(Solid, usize)> = other.solids.iter().map(|s| (s.clone(), 1)).collect();
        let mut next_group = 2;

        'pending: while let Some((solid, group)) = remain.pop() {
            for idx in 0..result.len() {
                if result[idx].1 == group {
                    continue;
                }
                let (pieces, merged) = result[idx].0.union(&solid);
                if merged {
                    result.remove(idx);
                    remain.extend(pieces.into_iter().map(|p| (p, next_group)));
                    next_group += 1;
                    continue 'pending;
                }
            }
            result.push((solid, group));
        }

        Region::from_solids(result.into_iter().map(|(s, _)| s))
    }

    /// Points covered by both regions
    pub fn intersection(&self, other: &Region) -> Region {
        if self.is_empty()
            || other.is_empty()
            || !tolerance::boxes_intersect(self.boundary, other.boundary, 0.0)
        {
            return Region::new();
        }

        let mut solids = Vec::new();
        for mine in &self.solids {
            if !tolerance::boxes_intersect(mine.boundary(), other.boundary, 0.0) {
                continue;
            }
            for theirs in &other.solids {
                solids.extend(mine.intersection(theirs));
            }
        }
        Region::from_solids(solids)
    }

    /// Points covered by this region but not by `other`
    pub fn subtracting(&self, other: &Region) -> Region {
        if self.is_empty()
            || other.is_empty()
            || !tolerance::boxes_intersect(self.boundary, other.boundary, 0.0)
        {
            return self.clone();
        }

        let mut solids = Vec::new();
        for mine in &self.solids {
            let mut pieces = vec![mine.clone()];
            for theirs in &other.solids {
                if !tolerance::boxes_intersect(mine.boundary(), theirs.boundary(), 0.0) {
                    continue;
                }
                pieces = pieces.iter().flat_map(|p| p.subtracting(theirs)).collect();
                if pieces.is_empty() {
                    break;
                }
            }
            solids.extend(pieces);
        }
        Region::from_solids(solids)
    }

    /// Points covered by exactly one of the regions
    pub fn symmetric_difference(&self, other: &Region) -> Region {
        let mine = self.subtracting(other);
        let theirs = other.subtracting(self);
        Region::from_solids(mine.solids.into_iter().chain(theirs.solids))
    }

    pub fn form_union(&mut self, other: &Region) {
        *self = self.union(other);
    }

    pub fn form_intersection(&mut self, other: &Region) {
        *self = self.intersection(other);
    }

    pub fn subtract(&mut self, other: &Region) {
        *self = self.subtracting(other);
    }

    pub fn form_symmetric_difference(&mut self, other: &Region) {
        *self = self.symmetric_difference(other);
    }

    /// Both regions cover the same points
    pub fn is_equal(&self, other: &Region) -> bool {
        self.negligible(&self.symmetric_difference(other), other)
    }

    /// Every point of this region is also in `other`
    pub fn is_subset(&self, other: &Region) -> bool {
        self.negligible(&self.subtracting(other), other)
    }

    /// Every point of `other` is also in this region
    pub fn is_superset(&self, other: &Region) -> bool {
        other.is_subset(self)
    }

    /// The regions share no interior points
    pub fn is_disjoint(&self, other: &Region) -> bool {
        self.negligible(&self.intersection(other), other)
    }

    pub fn is_strict_subset(&self, other: &Region) -> bool {
        self.is_subset(other) && !other.is_subset(self)
    }

    pub fn is_strict_superset(&self, other: &Region) -> bool {
        other.is_strict_subset(self)
    }

    /// True if `difference` is empty up to rounding noise relative to both operands
    fn negligible(&self, difference: &Region, other: &Region) -> bool {
        difference.is_empty()
            || tolerance::almost_zero(difference.area(), self.area().max(other.area()))
    }

    /// Apply an affine transform. Singular transforms collapse the region to nothing.
    pub fn transformed(&self, affine: Affine) -> Region {
        if is_singular(affine) {
            return Region::new();
        }
        Region::from_solids(self.solids.iter().map(|s| s.transformed(affine)))
    }
}

/// True if the transform squashes the plane onto a line or point
pub(crate) fn is_singular(affine: Affine) -> bool {
    let [a, b, c, d, _, _] = affine.as_coeffs();
    let scale = a.abs().max(b.abs()).max(c.abs()).max(d.abs());
    !affine.determinant().is_finite()
        || affine.determinant().abs() <= tolerance::epsilon() * scale * scale
}

impl Mul<Affine> for &Region {
    type Output = Region;

    fn mul(self, affine: Affine) -> Region {
        self.transformed(affine)
    }
}

impl Mul<Affine> for Region {
    type Output = Region;

    fn mul(self, affine: Affine) -> Region {
        self.transformed(affine)
    }
}

impl Mul<Affine> for &Solid {
    type Output = Region;

    fn mul(self, affine: Affine) -> Region {
        if is_singular(affine) {
            return Region::new();
        }
        Region::from(self.transformed(affine))
    }
}
