//! How two components relate to each other
//!
//! [`classify`] is the single entry point the solid operations use. It either reports a
//! plain relationship (disjoint, equal, nested) or hands back the loops obtained by
//! stitching the two outlines together at their crossings.

use crate::cache;
use crate::component::Component;
use crate::intersection_table::{IntersectionTable, Overlap};
use crate::loop_breaker;
use crate::region::Region;
use crate::solid::Solid;
use crate::split::Split;
use crate::tolerance;

/// Relationship between a left and a right component
#[derive(Debug, Clone)]
pub enum Classification {
    /// The outlines do not cross and neither encloses the other
    None,
    /// Both outlines trace the same boundary
    Equal,
    /// Left encloses right
    Superset,
    /// Right encloses left
    Subset,
    /// At least one outline passes through itself where the outlines meet. Each side is
    /// given as the region its outline encloses once the self-touching is resolved, so
    /// the operation can be redone on regions.
    Regions(Region, Region),
    /// The loops formed by stitching the outlines at their crossings. `outer` loops wind
    /// the same way as the left component, `inner` loops the opposite way.
    Loops { outer: Vec<Solid>, inner: Vec<Solid> },
}

impl From<Overlap> for Classification {
    fn from(overlap: Overlap) -> Self {
        match overlap {
            Overlap::None => Classification::None,
            Overlap::Equal => Classification::Equal,
            Overlap::Superset => Classification::Superset,
            Overlap::Subset => Classification::Subset,
        }
    }
}

impl Classification {
    /// The classification with left and right exchanged
    ///
    /// `same_orientation` tells whether both components wind the same way, which decides
    /// whether the loop partition flips.
    pub fn swapped(self, same_orientation: bool) -> Self {
        match self {
            Classification::Superset => Classification::Subset,
            Classification::Subset => Classification::Superset,
            Classification::Regions(left, right) => Classification::Regions(right, left),
            Classification::Loops { outer, inner } if !same_orientation => Classification::Loops {
                outer: inner,
                inner: outer,
            },
            other => other,
        }
    }
}

/// Classify `left` against `right`, consulting the shared cache first
pub fn classify(left: &Component, right: &Component) -> Classification {
    let cache = cache::global();
    if let Some(hit) = cache.get(left.id(), right.id()) {
        log::debug!("Classification cache hit for {:?}/{:?}", left.id(), right.id());
        return hit;
    }
    if let Some(hit) = cache.get(right.id(), left.id()) {
        log::debug!("Classification cache hit (swapped) for {:?}/{:?}", left.id(), right.id());
        let same_orientation = (left.area() >= 0.0) == (right.area() >= 0.0);
        return hit.swapped(same_orientation);
    }

    let classification = compute(left, right);
    cache.insert(left.id(), right.id(), classification.clone());
    classification
}

fn compute(left: &Component, right: &Component) -> Classification {
    let table = IntersectionTable::new(left, right);
    log::debug!(
        "Intersection table: {} crossings, overlap {:?}, looping {}",
        table.pairs().len(),
        table.overlap(),
        table.is_looping()
    );

    if table.is_looping() {
        let left_region = separate(left, &table.looping_left);
        let right_region = separate(right, &table.looping_right);
        if left_region.is_some() || right_region.is_some() {
            return Classification::Regions(
                left_region.unwrap_or_else(|| Region::from_component(left.clone())),
                right_region.unwrap_or_else(|| Region::from_component(right.clone())),
            );
        }
        log::warn!("Could not separate self-touching outlines, falling back to containment");
        return containment(left, right);
    }

    if !table.has_crossings() {
        return table.overlap().into();
    }

    match create_solids(left, right, &table) {
        Some(solids) => {
            let positive = left.area() >= 0.0;
            let (outer, inner): (Vec<Solid>, Vec<Solid>) = solids
                .into_iter()
                .partition(|solid| (solid.outer().area() >= 0.0) == positive);
            Classification::Loops { outer, inner }
        }
        None => {
            log::warn!("Crossing graph did not close, falling back to containment");
            containment(left, right)
        }
    }
}

/// Coarse relationship based on point containment alone
fn containment(left: &Component, right: &Component) -> Classification {
    if left.contains(right) {
        Classification::Superset
    } else if right.contains(left) {
        Classification::Subset
    } else {
        Classification::None
    }
}

/// Resolve a self-touching outline into the region it encloses
///
/// Returns `None` when the given points do not split the outline into several loops.
fn separate(component: &Component, points: &[(Split, Split)]) -> Option<Region> {
    if points.is_empty() {
        return None;
    }
    let loops = loop_breaker::break_loop_at(component, points);
    if loops.len() < 2 {
        return None;
    }

    let positive = component.area() >= 0.0;
    let (same, opposite): (Vec<Solid>, Vec<Solid>) = loops
        .into_iter()
        .partition(|solid| (solid.outer().area() >= 0.0) == positive);
    let covered = same
        .into_iter()
        .fold(Region::new(), |acc, solid| acc.union(&Region::from(solid)));
    let uncovered = opposite
        .into_iter()
        .fold(Region::new(), |acc, solid| acc.union(&Region::from(solid)));
    Some(covered.subtracting(&uncovered))
}

/// Cut the area between `outer` and an enclosed outline that touches it into pieces
///
/// `inner` winds opposite to `outer`. Returns `None` when the outlines meet in fewer than
/// two points or the pieces do not add up to the area between them.
pub(crate) fn split_touching(outer: &Component, inner: &Component) -> Option<Vec<Solid>> {
    let mut table = IntersectionTable::new(outer, inner);
    if !table.link_contacts() {
        return None;
    }
    let positive = outer.area() >= 0.0;
    let pieces: Vec<Solid> = create_solids(outer, inner, &table)?
        .into_iter()
        .filter(|solid| (solid.outer().area() >= 0.0) == positive)
        .collect();

    let expected = outer.area().abs() - inner.area().abs();
    let total: f64 = pieces.iter().map(|solid| solid.area()).sum();
    if (total - expected).abs() > tolerance::distance_tolerance(expected) {
        log::debug!(
            "Touching outlines gave pieces of area {} instead of {}, keeping a hole",
            total,
            expected
        );
        return None;
    }
    log::debug!("Enclosed outline touches at {} points, {} pieces", table.pairs().len(), pieces.len());
    Some(pieces)
}

/// Walk the crossing graphs, alternating between the outlines, to build closed loops
///
/// Returns `None` if a crossing reached on the left outline has no continuation on the
/// right one.
fn create_solids(
    left: &Component,
    right: &Component,
    table: &IntersectionTable,
) -> Option<Vec<Solid>> {
    let mut left_graph = table.left_graph.clone();
    let mut right_graph = table.right_graph.clone();
    let mut solids = Vec::new();

    while let Some((&first, _)) = left_graph.iter().next() {
        let mut segments = Vec::new();
        let mut key = first;
        while let Some(chain) = left_graph.remove(&key) {
            segments.extend(left.split_path(&chain.from, &chain.until));
            let back = right_graph.remove(&chain.to)?;
            segments.extend(right.split_path(&back.from, &back.until));
            key = back.to;
        }
        if let Some(solid) = Solid::from_segments(segments) {
            solids.push(solid);
        }
    }
    Some(solids)
}
