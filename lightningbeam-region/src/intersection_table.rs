//! Intersection tables between two components
//!
//! The table records every point where the outlines of two components meet, works out
//! which stretches of the left outline run inside the right one, and links the crossing
//! points into two successor graphs. Walking the graphs alternately stitches together the
//! closed loops that make up boolean results.

use crate::component::Component;
use crate::curve_intersection::{closest_point, intersect, overlap, point_on};
use crate::segment::BezierSegment;
use crate::split::{Split, SplitId};
use crate::tolerance;
use std::collections::{BTreeMap, BTreeSet};

/// How two components relate when their outlines do not cross
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// Disjoint (or touching without either containing the other)
    None,
    /// Same outline
    Equal,
    /// Left encloses right
    Superset,
    /// Right encloses left
    Subset,
}

/// A crossing seen from both components
#[derive(Debug, Clone, Copy)]
pub struct SplitPair {
    pub left: Split,
    pub right: Split,
}

/// Edge of a successor graph: follow the outline from `from` to `until`, arriving at
/// crossing number `to`
#[derive(Debug, Clone, Copy)]
pub struct Chain {
    pub to: usize,
    pub from: Split,
    pub until: Split,
}

/// Stretch of the left outline between two consecutive crossings
#[derive(Debug, Clone, Copy)]
struct Arc {
    from: usize,
    to: usize,
    /// Some(true) inside the right component, None if it runs along the right outline
    inside: Option<bool>,
    /// For stretches along the right outline: true if both outlines run the same way
    same_direction: Option<bool>,
}

/// Crossings between two components and the graphs that link them
#[derive(Debug, Clone)]
pub struct IntersectionTable {
    pub(crate) pairs: Vec<SplitPair>,
    pub(crate) left_graph: BTreeMap<usize, Chain>,
    pub(crate) right_graph: BTreeMap<usize, Chain>,
    pub(crate) overlap: Overlap,
    pub(crate) looping_left: Vec<(Split, Split)>,
    pub(crate) looping_right: Vec<(Split, Split)>,
}

impl IntersectionTable {
    /// Build the table for `left` against `right`
    pub fn new(left: &Component, right: &Component) -> Self {
        let mut table = IntersectionTable {
            pairs: Vec::new(),
            left_graph: BTreeMap::new(),
            right_graph: BTreeMap::new(),
            overlap: Overlap::None,
            looping_left: Vec::new(),
            looping_right: Vec::new(),
        };

        let reference = tolerance::rect_magnitude(left.boundary().union(right.boundary()));
        let inset = tolerance::distance_tolerance(reference);
        let left_count = left.len();
        let right_count = right.len();
        let left_boundary = left.boundary().inflate(inset, inset);

        let mut overlap_left: Vec<(Split, bool)> = Vec::new();
        let mut overlap_left_index = BTreeSet::new();
        let mut overlap_right_index = BTreeSet::new();

        for r_idx in 0..right_count {
            let r_space = right.space(r_idx);
            if !tolerance::boxes_intersect(left_boundary, r_space, 0.0) {
                continue;
            }
            let r_seg = right.segment(r_idx);

            for l_idx in 0..left_count {
                if !tolerance::boxes_intersect(left.space(l_idx), r_space, inset) {
                    continue;
                }
                let l_seg = left.segment(l_idx);

                if overlap(l_seg, r_seg) {
                    overlap_left_index.insert(l_idx);
                    overlap_right_index.insert(r_idx);
                    let t = overlap_start(l_seg, r_seg);
                    let split = Split::normalized(l_idx, t, l_seg.eval(t), left_count);
                    let forward = closest_point(l_seg, r_seg.start) < closest_point(l_seg, r_seg.end());
                    overlap_left.push((split, forward));
                    continue;
                }

                let mut hits = intersect(l_seg, r_seg);
                if hits.is_empty() {
                    hits = touch_points(l_seg, r_seg);
                }
                if !hits.is_empty() {
                    log::trace!("Segments {} and {} meet at {:?}", l_idx, r_idx, hits);
                }
                for (t1, t2) in hits {
                    push_pair(
                        &mut table.pairs,
                        SplitPair {
                            left: Split::normalized(l_idx, t1, l_seg.eval(t1), left_count),
                            right: Split::normalized(r_idx, t2, r_seg.eval(t2), right_count),
                        },
                    );
                }
            }
        }

        if overlap_left_index.len() == left_count && overlap_right_index.len() == right_count {
            table.overlap = Overlap::Equal;
            return table;
        }

        for (i, pair) in table.pairs.iter_mut().enumerate() {
            let id = SplitId(i as u32);
            pair.left = pair.left.with_id(id);
            pair.right = pair.right.with_id(id);
        }

        // Two crossings at one place on one outline but at different places on the
        // other: the other outline passes through itself here
        let data = &table.pairs;
        for i in 0..data.len() {
            for j in (i + 1)..data.len() {
                if data[i].right.almost_equal(&data[j].right) {
                    table.looping_left.push((data[i].left, data[j].left));
                }
                if data[i].left.almost_equal(&data[j].left) {
                    table.looping_right.push((data[i].right, data[j].right));
                }
            }
        }
        if !table.looping_left.is_empty() || !table.looping_right.is_empty() {
            log::debug!(
                "Intersection table found self-touching outlines ({} left, {} right)",
                table.looping_left.len(),
                table.looping_right.len()
            );
            return table;
        }

        let hint_left: Vec<usize> = (0..left_count)
            .filter(|i| !overlap_left_index.contains(i))
            .collect();
        let hint_right: Vec<usize> = (0..right_count)
            .filter(|i| !overlap_right_index.contains(i))
            .collect();
        let containment = || {
            if left.contains_with_hint(right, &hint_right) {
                Overlap::Superset
            } else if right.contains_with_hint(left, &hint_left) {
                Overlap::Subset
            } else {
                Overlap::None
            }
        };

        if table.pairs.len() < 2 {
            table.overlap = containment();
            return table;
        }

        let mut arcs = classify_arcs(left, right, &table.pairs, &overlap_left);

        let Some(check) = arcs.iter().find_map(|arc| arc.inside) else {
            table.overlap = containment();
            return table;
        };
        let crosses = arcs.iter().any(|arc| match arc.inside {
            Some(inside) => inside != check,
            None => arc.same_direction == Some(false),
        });
        if !crosses {
            table.overlap = containment();
            return table;
        }

        // Stretches shared with the right outline in the same direction belong with
        // whatever follows them
        let n = arcs.len();
        for i in 0..n {
            if arcs[i].inside.is_none() && arcs[i].same_direction == Some(true) {
                let next = (1..n).find_map(|k| arcs[(i + k) % n].inside);
                arcs[i].inside = next;
            }
        }

        table.left_graph = left_runs(&arcs, &table.pairs);
        table.right_graph = right_cycle(&table.left_graph, &table.pairs);
        table
    }

    /// Relationship found when the outlines do not cross
    pub fn overlap(&self) -> Overlap {
        self.overlap
    }

    /// True if either outline passes through one of its own crossing points
    pub fn is_looping(&self) -> bool {
        !self.looping_left.is_empty() || !self.looping_right.is_empty()
    }

    /// True if the outlines cross and can be stitched into loops
    pub fn has_crossings(&self) -> bool {
        !self.left_graph.is_empty()
    }

    /// Every crossing, seen from both components
    pub fn pairs(&self) -> &[SplitPair] {
        &self.pairs
    }

    /// Link each contact to the next one along the left outline
    ///
    /// For outlines that meet without crossing. Walking the resulting graphs cuts the
    /// area between the two outlines apart at every contact. Returns false when there are
    /// fewer than two contacts or the graphs already exist.
    pub(crate) fn link_contacts(&mut self) -> bool {
        if self.pairs.len() < 2 || self.is_looping() || self.has_crossings() {
            return false;
        }
        let pairs = &self.pairs;
        let mut order: Vec<usize> = (0..pairs.len()).collect();
        order.sort_by(|&a, &b| pairs[a].left.cmp_position(&pairs[b].left));

        let n = order.len();
        let left_graph: BTreeMap<usize, Chain> = (0..n)
            .map(|k| {
                let from = order[k];
                let to = order[(k + 1) % n];
                (
                    from,
                    Chain {
                        to,
                        from: pairs[from].left,
                        until: pairs[to].left,
                    },
                )
            })
            .collect();
        self.right_graph = right_cycle(&left_graph, pairs);
        self.left_graph = left_graph;
        true
    }
}

/// Parameter on `l_seg` where its shared stretch with `r_seg` begins
fn overlap_start(l_seg: &BezierSegment, r_seg: &BezierSegment) -> f64 {
    let mut params = Vec::with_capacity(4);
    params.extend(point_on(l_seg, r_seg.start));
    params.extend(point_on(l_seg, r_seg.end()));
    if point_on(r_seg, l_seg.start).is_some() {
        params.push(0.0);
    }
    if point_on(r_seg, l_seg.end()).is_some() {
        params.push(1.0);
    }
    params.into_iter().fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.min(t))))
        .unwrap_or(0.0)
}

/// Endpoint contacts that the algebraic intersection missed
pub(crate) fn touch_points(a: &BezierSegment, b: &BezierSegment) -> Vec<(f64, f64)> {
    let mut hits = Vec::new();
    if let Some(t) = point_on(a, b.start) {
        hits.push((t, 0.0));
    }
    if let Some(t) = point_on(a, b.end()) {
        hits.push((t, 1.0));
    }
    if let Some(t) = point_on(b, a.start) {
        hits.push((0.0, t));
    }
    if let Some(t) = point_on(b, a.end()) {
        hits.push((1.0, t));
    }
    hits
}

/// Add a crossing unless it is already known; duplicates keep the earliest left split
fn push_pair(pairs: &mut Vec<SplitPair>, pair: SplitPair) {
    if let Some(existing) = pairs
        .iter_mut()
        .find(|p| p.left.almost_equal(&pair.left) && p.right.almost_equal(&pair.right))
    {
        if pair.left.cmp_position(&existing.left).is_lt() {
            *existing = pair;
        }
        return;
    }
    pairs.push(pair);
}

/// Stretches of the left outline between consecutive crossings, with their status
fn classify_arcs(
    left: &Component,
    right: &Component,
    pairs: &[SplitPair],
    overlap_left: &[(Split, bool)],
) -> Vec<Arc> {
    let mut order: Vec<usize> = (0..pairs.len()).collect();
    order.sort_by(|&a, &b| pairs[a].left.cmp_position(&pairs[b].left));

    let n = order.len();
    (0..n)
        .map(|k| {
            let from = order[k];
            let to = order[(k + 1) % n];
            let start = &pairs[from].left;
            if let Some((_, forward)) = overlap_left
                .iter()
                .find(|(split, _)| split.almost_equal(start))
            {
                Arc {
                    from,
                    to,
                    inside: None,
                    same_direction: Some(*forward),
                }
            } else {
                let mid = left.mid_point(start, &pairs[to].left);
                Arc {
                    from,
                    to,
                    inside: Some(right.winding(mid) != 0),
                    same_direction: None,
                }
            }
        })
        .collect()
}

/// Merge consecutive arcs with equal status into chains of the left graph
fn left_runs(arcs: &[Arc], pairs: &[SplitPair]) -> BTreeMap<usize, Chain> {
    let n = arcs.len();
    let first_change = arcs
        .iter()
        .position(|arc| arc.inside != arcs[0].inside)
        .unwrap_or(0);

    let mut graph = BTreeMap::new();
    let mut begin: Option<usize> = None;
    let mut last = 0;
    let mut record = None;
    for k in 0..n {
        let arc = arcs[(first_change + k) % n];
        let Some(first) = begin else {
            begin = Some(arc.from);
            last = arc.from;
            record = arc.inside;
            continue;
        };
        if record != arc.inside {
            graph.insert(
                last,
                Chain {
                    to: arc.from,
                    from: pairs[last].left,
                    until: pairs[arc.from].left,
                },
            );
            last = arc.from;
            record = arc.inside;
        }
        if arc.to == first {
            graph.insert(
                last,
                Chain {
                    to: arc.to,
                    from: pairs[last].left,
                    until: pairs[arc.to].left,
                },
            );
        }
    }
    graph
}

/// Link the crossings used by the left graph in the order they occur on the right outline
fn right_cycle(left_graph: &BTreeMap<usize, Chain>, pairs: &[SplitPair]) -> BTreeMap<usize, Chain> {
    let mut nodes: Vec<usize> = left_graph
        .iter()
        .flat_map(|(&key, chain)| [key, chain.to])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    nodes.sort_by(|&a, &b| pairs[a].right.cmp_position(&pairs[b].right));

    let m = nodes.len();
    (0..m)
        .map(|k| {
            let from = nodes[k];
            let to = nodes[(k + 1) % m];
            (
                from,
                Chain {
                    to,
                    from: pairs[from].right,
                    until: pairs[to].right,
                },
            )
        })
        .collect()
}
