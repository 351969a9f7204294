//! Solids: one outer outline with holes
//!
//! A [`Solid`] is a simple outer component together with a [`Region`] of holes that lie
//! inside it. The holes are themselves solids, so islands inside holes nest naturally.
//!
//! The pairwise operations here are the building blocks of the region algebra. Each one
//! classifies the two outer outlines and then fixes up the holes.

use crate::classification::{classify, split_touching, Classification};
use crate::component::Component;
use crate::region::Region;
use crate::segment::BezierSegment;
use crate::tolerance;
use kurbo::{Affine, BezPath, Rect};
use serde::{Deserialize, Serialize};

/// A simple closed outline with zero or more holes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "SolidData", into = "SolidData")]
pub struct Solid {
    outer: Component,
    holes: Region,
    boundary: Rect,
    area: f64,
}

#[derive(Serialize, Deserialize)]
struct SolidData {
    outer: Component,
    #[serde(default)]
    holes: Region,
}

impl From<SolidData> for Solid {
    fn from(data: SolidData) -> Self {
        Solid::new(data.outer, data.holes)
    }
}

impl From<Solid> for SolidData {
    fn from(solid: Solid) -> Self {
        SolidData {
            outer: solid.outer,
            holes: solid.holes,
        }
    }
}

impl Solid {
    pub(crate) fn new(outer: Component, holes: Region) -> Self {
        let boundary = outer.boundary();
        let area = outer.area().abs() - holes.area();
        Self {
            outer,
            holes,
            boundary,
            area,
        }
    }

    /// A solid without holes. Outlines that enclose no area give `None`.
    pub fn from_component(outer: Component) -> Option<Self> {
        if outer.is_degenerate() {
            return None;
        }
        Some(Self::new(outer, Region::new()))
    }

    /// A solid bounded by a chain of segments, closed if needed
    ///
    /// Zero-length segments are dropped. Chains that enclose no area give `None`.
    pub fn from_segments(segments: impl IntoIterator<Item = BezierSegment>) -> Option<Self> {
        let outline = Component::from_beziers(segments.into_iter().filter(|s| !s.is_point()))?;
        Self::from_component(outline)
    }

    pub fn outer(&self) -> &Component {
        &self.outer
    }

    pub fn holes(&self) -> &Region {
        &self.holes
    }

    /// Net area: the outer area minus the net area of the holes
    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn boundary(&self) -> Rect {
        self.boundary
    }

    /// True if the outer outline winds counter-clockwise
    pub fn is_positive(&self) -> bool {
        self.outer.area() >= 0.0
    }

    /// The same solid with its outer outline traversed the other way
    pub fn reversed(&self) -> Solid {
        Solid::new(self.outer.reversed(), self.holes.clone())
    }

    /// The same solid with the outer outline wound as requested
    pub fn oriented(&self, positive: bool) -> Solid {
        if self.is_positive() == positive {
            self.clone()
        } else {
            self.reversed()
        }
    }

    /// Outlines ready for filling: the outer outline wound `positive` (counter-clockwise
    /// when true), holes the opposite way, islands in holes the same way again
    pub fn components(&self, positive: bool) -> Vec<Component> {
        let outer = if self.is_positive() == positive {
            self.outer.clone()
        } else {
            self.outer.reversed()
        };
        let mut components = vec![outer];
        components.extend(self.holes.components_wound(!positive));
        components
    }

    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for component in self.components(true) {
            component.append_to(&mut path);
        }
        path
    }

    /// Apply an affine transform to the outline and holes
    pub fn transformed(&self, affine: Affine) -> Solid {
        Solid::new(self.outer.transformed(affine), self.holes.transformed(affine))
    }

    /// Just the outer outline, as a solid without holes
    fn outline(&self) -> Region {
        Region::from(Solid::new(self.outer.clone(), Region::new()))
    }

    /// Union of two solids
    ///
    /// Returns the resulting solids and whether the two were merged. Solids that do not
    /// overlap come back unchanged with `false`.
    pub fn union(&self, other: &Solid) -> (Vec<Solid>, bool) {
        if !tolerance::boxes_intersect(self.boundary, other.boundary, 0.0) {
            return (vec![self.clone(), other.clone()], false);
        }

        let aligned = other.oriented(self.is_positive());
        let Some(merged) = union_outlines(&self.outer, &aligned.outer) else {
            return (vec![self.clone(), other.clone()], false);
        };

        let shared = self.holes.intersection(&aligned.holes);
        let own = self.holes.subtracting(&aligned.outline());
        let theirs = aligned.holes.subtracting(&self.outline());
        let holes = Region::from_solids(
            shared
                .into_solids()
                .into_iter()
                .chain(own.into_solids())
                .chain(theirs.into_solids()),
        );
        (merged.subtracting(&holes).into_solids(), true)
    }

    /// Intersection of two solids
    pub fn intersection(&self, other: &Solid) -> Vec<Solid> {
        if !tolerance::boxes_intersect(self.boundary, other.boundary, 0.0) {
            return Vec::new();
        }

        let aligned = other.oriented(self.is_positive());
        let common = intersect_outlines(&self.outer, &aligned.outer);
        if common.is_empty() {
            return Vec::new();
        }
        common
            .subtracting(&self.holes)
            .subtracting(&aligned.holes)
            .into_solids()
    }

    /// This solid with `other` removed
    pub fn subtracting(&self, other: &Solid) -> Vec<Solid> {
        if !tolerance::boxes_intersect(self.boundary, other.boundary, 0.0) {
            return vec![self.clone()];
        }

        let opposed = other.oriented(!self.is_positive());
        match subtract_outlines(&self.outer, &opposed.outer) {
            Subtraction::Unchanged => vec![self.clone()],
            Subtraction::Hole => {
                let holes = self.holes.union(&Region::from(opposed));
                vec![Solid::new(self.outer.clone(), holes)]
            }
            Subtraction::Pieces(pieces) => {
                // Islands inside the removed solid survive
                let islands = opposed.holes.intersection(&self.outline());
                let remaining = Region::from_solids(
                    pieces.into_solids().into_iter().chain(islands.into_solids()),
                );
                if self.holes.is_empty() {
                    remaining.into_solids()
                } else {
                    remaining.subtracting(&self.holes).into_solids()
                }
            }
        }
    }
}

/// Outcome of removing one outline from another
enum Subtraction {
    /// The outlines do not overlap
    Unchanged,
    /// The removed outline lies inside and becomes a hole
    Hole,
    /// What is left, possibly nothing
    Pieces(Region),
}

/// Union of two outlines wound the same way, or `None` if they do not overlap
fn union_outlines(left: &Component, right: &Component) -> Option<Region> {
    match classify(left, right) {
        Classification::None => None,
        Classification::Equal | Classification::Superset => {
            Some(Region::from_component(left.clone()))
        }
        Classification::Subset => Some(Region::from_component(right.clone())),
        Classification::Regions(l, r) => Some(l.union(&r)),
        Classification::Loops { outer, inner } => {
            // The outermost loops bound the union; opposite loops inside them are holes
            let solids = outer
                .iter()
                .enumerate()
                .filter(|(i, loop_)| {
                    !outer
                        .iter()
                        .enumerate()
                        .any(|(j, other)| *i != j && other.outer().contains(loop_.outer()))
                })
                .map(|(_, loop_)| {
                    let holes = Region::from_solids(
                        inner
                            .iter()
                            .filter(|hole| loop_.outer().contains(hole.outer()))
                            .cloned(),
                    );
                    Solid::new(loop_.outer().clone(), holes)
                });
            Some(Region::from_solids(solids))
        }
    }
}

/// Intersection of two outlines wound the same way
fn intersect_outlines(left: &Component, right: &Component) -> Region {
    match classify(left, right) {
        Classification::None => Region::new(),
        Classification::Equal | Classification::Subset => Region::from_component(left.clone()),
        Classification::Superset => Region::from_component(right.clone()),
        Classification::Regions(l, r) => l.intersection(&r),
        Classification::Loops { outer, .. } => {
            // Loops covered by both sides sit inside one of the union's loops
            Region::from_solids(outer.iter().enumerate().filter_map(|(i, loop_)| {
                outer
                    .iter()
                    .enumerate()
                    .any(|(j, other)| i != j && other.outer().contains(loop_.outer()))
                    .then(|| loop_.clone())
            }))
        }
    }
}

/// Remove `right` (wound opposite to `left`) from `left`
fn subtract_outlines(left: &Component, right: &Component) -> Subtraction {
    match classify(left, right) {
        Classification::None => Subtraction::Unchanged,
        Classification::Equal | Classification::Subset => Subtraction::Pieces(Region::new()),
        // A hole has to stay clear of the outline, one touching it cuts the solid apart
        Classification::Superset => match split_touching(left, right) {
            Some(pieces) => Subtraction::Pieces(Region::from_solids(pieces)),
            None => Subtraction::Hole,
        },
        Classification::Regions(l, r) => Subtraction::Pieces(l.subtracting(&r)),
        Classification::Loops { outer, .. } => Subtraction::Pieces(Region::from_solids(outer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;

    fn square(x: f64, y: f64, size: f64) -> Solid {
        Region::rectangle(Rect::new(x, y, x + size, y + size))
            .into_solids()
            .remove(0)
    }

    #[test]
    fn test_union_of_disjoint_solids_is_not_merged() {
        let (solids, merged) = square(0.0, 0.0, 10.0).union(&square(20.0, 20.0, 10.0));
        assert!(!merged);
        assert_eq!(solids.len(), 2);
    }

    #[test]
    fn test_union_of_overlapping_solids() {
        let (solids, merged) = square(0.0, 0.0, 10.0).union(&square(5.0, 5.0, 10.0));
        assert!(merged);
        assert_eq!(solids.len(), 1);
        assert!((solids[0].area() - 175.0).abs() < 1e-9);
    }

    #[test]
    fn test_union_ignores_orientation() {
        let (solids, merged) = square(0.0, 0.0, 10.0).union(&square(5.0, 5.0, 10.0).reversed());
        assert!(merged);
        assert!((solids[0].area() - 175.0).abs() < 1e-9);
    }

    #[test]
    fn test_intersection_and_subtraction() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(5.0, 5.0, 10.0);
        let common = a.intersection(&b);
        assert_eq!(common.len(), 1);
        assert!((common[0].area() - 25.0).abs() < 1e-9);

        let rest = a.subtracting(&b);
        assert_eq!(rest.len(), 1);
        assert!((rest[0].area() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_subtracting_inner_solid_makes_hole() {
        let rest = square(0.0, 0.0, 10.0).subtracting(&square(2.0, 2.0, 2.0));
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].holes().len(), 1);
        assert!((rest[0].outer().area().abs() - 100.0).abs() < 1e-9);
        assert!((rest[0].area() - 96.0).abs() < 1e-9);

        let components = rest[0].components(true);
        assert_eq!(components.len(), 2);
        assert!(components[0].area() > 0.0);
        assert!(components[1].area() < 0.0);
    }

    #[test]
    fn test_subtracting_touching_diamond_leaves_corners() {
        let diamond = Solid::from_component(Component::new(
            kurbo::Point::new(5.0, 0.0),
            [(10.0, 5.0), (5.0, 10.0), (0.0, 5.0)].map(|(x, y)| crate::segment::Segment::Line {
                end: kurbo::Point::new(x, y),
            }),
        ))
        .unwrap();
        let rest = square(0.0, 0.0, 10.0).subtracting(&diamond);
        assert_eq!(rest.len(), 4);
        assert!(rest.iter().all(|s| s.holes().is_empty()));
        assert!(rest.iter().all(|s| (s.area() - 12.5).abs() < 1e-9));
    }

    #[test]
    fn test_subtracting_flush_solid_notches_outline() {
        let rest = square(0.0, 0.0, 10.0).subtracting(&square(0.0, 2.0, 4.0));
        assert_eq!(rest.len(), 1);
        assert!(rest[0].holes().is_empty());
        assert!((rest[0].area() - 84.0).abs() < 1e-9);
    }

    #[test]
    fn test_union_fills_hole() {
        let ring = square(0.0, 0.0, 10.0).subtracting(&square(2.0, 2.0, 2.0)).remove(0);
        let (solids, merged) = ring.union(&square(1.0, 1.0, 4.0));
        assert!(merged);
        assert_eq!(solids.len(), 1);
        assert!(solids[0].holes().is_empty());
        assert!((solids[0].area() - 100.0).abs() < 1e-9);
    }
}
