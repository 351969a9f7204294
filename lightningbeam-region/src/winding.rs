//! Turning arbitrary outlines into regions under a fill rule
//!
//! Each outline is first broken into simple loops. The loops are then combined either
//! by parity ([`WindingRule::EvenOdd`]) or by winding depth ([`WindingRule::NonZero`]).

use crate::component::Component;
use crate::loop_breaker::break_loop;
use crate::region::Region;
use crate::solid::Solid;
use serde::{Deserialize, Serialize};

/// Which points of a set of outlines count as filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WindingRule {
    /// Filled where the winding number is not zero
    #[default]
    NonZero,
    /// Filled where the winding number is odd
    EvenOdd,
}

/// The region filled by `contours` under `rule`
pub fn normalize(contours: impl IntoIterator<Item = Component>, rule: WindingRule) -> Region {
    let loops: Vec<Solid> = contours
        .into_iter()
        .flat_map(|contour| break_loop(&contour))
        .collect();
    log::debug!("Folding {} loops under the {:?} rule", loops.len(), rule);

    match rule {
        WindingRule::EvenOdd => loops.into_iter().fold(Region::new(), |acc, solid| {
            acc.symmetric_difference(&Region::from(solid.oriented(true)))
        }),
        WindingRule::NonZero => {
            let mut positive: Vec<Region> = Vec::new();
            let mut negative: Vec<Region> = Vec::new();
            for solid in loops {
                if solid.is_positive() {
                    deposit(&mut positive, solid);
                } else {
                    deposit(&mut negative, solid.reversed());
                }
            }

            // Depth k of one sign is covered where exactly one of the two layers is
            let depth = positive.len().max(negative.len());
            (0..depth).fold(Region::new(), |acc, k| {
                let pos = positive.get(k).cloned().unwrap_or_default();
                let neg = negative.get(k).cloned().unwrap_or_default();
                acc.union(&pos.symmetric_difference(&neg))
            })
        }
    }
}

/// Add one loop to a stack of depth layers
///
/// `layers[k]` is the set covered by more than `k` of the loops added so far. Where the
/// new loop lands on an existing layer it raises the depth there by one.
fn deposit(layers: &mut Vec<Region>, solid: Solid) {
    let mut remain = Region::from(solid);
    for layer in layers.iter_mut() {
        if remain.is_empty() {
            return;
        }
        let covered = layer.intersection(&remain);
        *layer = layer.union(&remain);
        remain = covered;
    }
    if !remain.is_empty() {
        layers.push(remain);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Segment;
    use kurbo::Point;

    fn polygon(points: &[(f64, f64)]) -> Component {
        Component::new(
            Point::new(points[0].0, points[0].1),
            points[1..].iter().map(|&(x, y)| Segment::Line {
                end: Point::new(x, y),
            }),
        )
    }

    fn square(x: f64, y: f64, size: f64) -> Component {
        polygon(&[(x, y), (x + size, y), (x + size, y + size), (x, y + size)])
    }

    #[test]
    fn test_default_rule_is_non_zero() {
        assert_eq!(WindingRule::default(), WindingRule::NonZero);
    }

    #[test]
    fn test_nested_squares() {
        let contours = vec![square(0.0, 0.0, 10.0), square(3.0, 3.0, 4.0)];

        let non_zero = normalize(contours.clone(), WindingRule::NonZero);
        assert_eq!(non_zero.len(), 1);
        assert!((non_zero.area() - 100.0).abs() < 1e-9);

        let even_odd = normalize(contours, WindingRule::EvenOdd);
        assert_eq!(even_odd.len(), 1);
        assert!((even_odd.area() - 84.0).abs() < 1e-9);
    }

    #[test]
    fn test_opposite_winding_cancels() {
        let contours = vec![square(0.0, 0.0, 10.0), square(3.0, 3.0, 4.0).reversed()];
        let region = normalize(contours, WindingRule::NonZero);
        assert!((region.area() - 84.0).abs() < 1e-9);
    }

    #[test]
    fn test_figure_eight_fills_both_lobes() {
        let bowtie = polygon(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)]);
        for rule in [WindingRule::NonZero, WindingRule::EvenOdd] {
            let region = normalize([bowtie.clone()], rule);
            assert_eq!(region.len(), 2);
            assert!((region.area() - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_outline_running_back_over_itself() {
        let outline = polygon(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
            (5.0, 0.0),
            (5.0, -5.0),
        ]);
        for rule in [WindingRule::NonZero, WindingRule::EvenOdd] {
            let region = normalize([outline.clone()], rule);
            assert_eq!(region.len(), 2);
            assert!((region.area() - 112.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_outline_traced_twice() {
        let square_twice = polygon(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
        ]);

        let non_zero = normalize([square_twice.clone()], WindingRule::NonZero);
        assert_eq!(non_zero.len(), 1);
        assert!((non_zero.area() - 100.0).abs() < 1e-9);

        // Winding number two everywhere inside
        assert!(normalize([square_twice], WindingRule::EvenOdd).is_empty());
    }

    #[test]
    fn test_rule_serde() {
        let json = serde_json::to_string(&WindingRule::EvenOdd).unwrap();
        assert_eq!(json, "\"EvenOdd\"");
        let rule: WindingRule = serde_json::from_str(&json).unwrap();
        assert_eq!(rule, WindingRule::EvenOdd);
    }
}
