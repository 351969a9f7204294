//! Splitting self-intersecting outlines into simple loops
//!
//! An outline that crosses itself is cut at every self-crossing and reconnected so that
//! at each crossing the path turns onto the other strand instead of passing straight
//! through. Every loop produced this way is free of crossings and keeps the direction
//! of the input outline, so its area sign says how it contributes to the winding
//! number.

use crate::component::Component;
use crate::curve_intersection::{intersect, overlap, point_on, self_intersect};
use crate::intersection_table::touch_points;
use crate::solid::Solid;
use crate::split::Split;
use crate::tolerance;

/// Crossings of neighbouring segments closer than this to their shared vertex are the
/// vertex itself
const JOINT_PARAM: f64 = 1e-3;

/// Minimum inflation of segment boxes when looking for self-crossings
const MIN_BOX_INSET: f64 = 1e-6;

/// Break `component` at all of its self-crossings
pub fn break_loop(component: &Component) -> Vec<Solid> {
    let crossings = self_crossings(component);
    log::debug!(
        "Breaking outline with {} segments at {} self-crossings",
        component.len(),
        crossings.len()
    );
    break_loop_at(component, &crossings)
}

/// Every place where `component` meets itself, as pairs of splits at the same point
pub fn self_crossings(component: &Component) -> Vec<(Split, Split)> {
    let count = component.len();
    let inset = tolerance::distance_tolerance(tolerance::rect_magnitude(component.boundary()))
        .max(MIN_BOX_INSET);
    let mut pairs: Vec<(Split, Split)> = Vec::new();
    // Stretches the outline runs over twice in the same direction, as (start, end) pairs
    let mut parallel: Vec<((Split, Split), (Split, Split))> = Vec::new();

    for i in 0..count {
        let seg_i = component.segment(i);

        if let Some((t0, t1)) = self_intersect(seg_i) {
            record(
                Split::normalized(i, t0, seg_i.eval(t0), count),
                Split::normalized(i, t1, seg_i.eval(t1), count),
                &mut pairs,
            );
        }

        for j in (i + 1)..count {
            if !tolerance::boxes_intersect(component.space(i), component.space(j), inset) {
                continue;
            }
            let seg_j = component.segment(j);
            let next = j == i + 1;
            let wraps = i == 0 && j == count - 1;
            let place = |(ti, tj): (f64, f64)| {
                (
                    Split::normalized(i, ti, seg_i.eval(ti), count),
                    Split::normalized(j, tj, seg_j.eval(tj), count),
                )
            };

            let hits = if overlap(seg_i, seg_j) {
                // The outline runs over itself; the two ends of the shared stretch stand
                // in for the crossing
                let contacts = touch_points(seg_i, seg_j);
                let first = contacts.iter().copied().min_by(|a, b| a.0.total_cmp(&b.0));
                let last = contacts.iter().copied().max_by(|a, b| a.0.total_cmp(&b.0));
                match (first, last) {
                    (Some(first), Some(last)) => {
                        if last.1 - first.1 > tolerance::param_tolerance() {
                            parallel.push((place(first), place(last)));
                        }
                        vec![first, last]
                    }
                    _ => Vec::new(),
                }
            } else {
                let hits = intersect(seg_i, seg_j);
                if hits.is_empty() {
                    touch_points(seg_i, seg_j)
                } else {
                    hits
                }
            };

            for (ti, tj) in hits {
                if next && ti > 1.0 - JOINT_PARAM && tj < JOINT_PARAM {
                    continue;
                }
                if wraps && ti < JOINT_PARAM && tj > 1.0 - JOINT_PARAM {
                    continue;
                }
                log::trace!("Self-crossing between segments {} ({}) and {} ({})", i, ti, j, tj);
                let (a, b) = place((ti, tj));
                record(a, b, &mut pairs);
            }
        }
    }
    drop_parallel_ends(pairs, &parallel)
}

fn same_pair(pair: &(Split, Split), a: &Split, b: &Split) -> bool {
    let (x, y) = pair;
    (x.almost_equal(a) && y.almost_equal(b)) || (x.almost_equal(b) && y.almost_equal(a))
}

/// Add a crossing unless both splits are the same place or the pair is already known
fn record(a: Split, b: Split, pairs: &mut Vec<(Split, Split)>) {
    if a.almost_equal(&b) {
        return;
    }
    if !pairs.iter().any(|pair| same_pair(pair, &a, &b)) {
        pairs.push((a, b));
    }
}

/// Keep a single pair for each stretch the outline covers twice in the same direction
///
/// Stepping onto the other strand at the start of such a stretch and back again at its
/// end would leave the outline whole, so only the pair where the stretch begins stays.
/// A run of stretches that closes on itself, such as an outline traced twice, keeps its
/// earliest pair.
fn drop_parallel_ends(
    pairs: Vec<(Split, Split)>,
    parallel: &[((Split, Split), (Split, Split))],
) -> Vec<(Split, Split)> {
    if parallel.is_empty() {
        return pairs;
    }
    let find = |(a, b): &(Split, Split)| pairs.iter().position(|pair| same_pair(pair, a, b));

    // previous[k] is the pair where the stretch ending at pair k begins
    let mut previous: Vec<Option<usize>> = vec![None; pairs.len()];
    for (start, end) in parallel {
        if let (Some(s), Some(e)) = (find(start), find(end)) {
            if s != e {
                previous[e] = Some(s);
            }
        }
    }

    let keep = |k: usize| {
        let mut lowest = k;
        let mut current = k;
        for _ in 0..previous.len() {
            match previous[current] {
                None => return current == k,
                Some(prev) if prev == k => return lowest == k,
                Some(prev) => {
                    lowest = lowest.min(prev);
                    current = prev;
                }
            }
        }
        false
    };
    let kept: Vec<bool> = (0..pairs.len()).map(keep).collect();
    log::debug!(
        "Dropping {} pairs inside stretches the outline covers twice",
        kept.iter().filter(|&&k| !k).count()
    );
    pairs
        .into_iter()
        .zip(kept)
        .filter_map(|(pair, keep)| keep.then_some(pair))
        .collect()
}

/// Break `component` at the given self-crossings
///
/// Each pair names two places on the outline that are the same point in the plane.
/// The outline is cut into arcs at every such place, and arcs are rejoined so that
/// arriving at one place of a pair continues from the other. Loops that enclose no
/// area are dropped. Without any usable pair the outline is returned as it is.
pub fn break_loop_at(component: &Component, pairs: &[(Split, Split)]) -> Vec<Solid> {
    // A place already used by another pair would make the arcs ambiguous
    let mut used: Vec<Split> = Vec::new();
    let mut accepted: Vec<(Split, Split)> = Vec::new();
    for (a, b) in pairs {
        if a.almost_equal(b) {
            continue;
        }
        if used.iter().any(|u| u.almost_equal(a) || u.almost_equal(b)) {
            log::debug!("Skipping self-crossing that reuses a split at {:?}", a.point);
            continue;
        }
        used.push(*a);
        used.push(*b);
        accepted.push((*a, *b));
    }

    if accepted.is_empty() {
        return Solid::from_component(component.clone()).into_iter().collect();
    }

    // Places in outline order, remembering which pair each came from
    let mut places: Vec<(usize, Split)> = accepted
        .iter()
        .enumerate()
        .flat_map(|(pair, (a, b))| [(pair, *a), (pair, *b)])
        .collect();
    places.sort_by(|(_, a), (_, b)| a.cmp_position(b));
    let n = places.len();

    // partner[k] is the position of the other place of the same pair
    let mut partner = vec![0; n];
    for k in 0..n {
        partner[k] = (0..n)
            .find(|&m| m != k && places[m].0 == places[k].0)
            .unwrap_or(k);
    }

    let mut visited = vec![false; n];
    let mut solids = Vec::new();
    for begin in 0..n {
        if visited[begin] {
            continue;
        }
        let mut segments = Vec::new();
        let mut k = begin;
        loop {
            visited[k] = true;
            let next = (k + 1) % n;
            segments.extend(component.split_path(&places[k].1, &places[next].1));
            k = partner[next];
            if k == begin || visited[k] {
                break;
            }
        }
        if let Some(solid) = Solid::from_segments(segments) {
            solids.push(solid);
        }
    }

    log::debug!("Self-crossings produced {} loops", solids.len());
    solids
}
