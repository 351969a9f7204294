//! Integration tests for the region boolean operations
//!
//! Covers the basic rectangle scenarios, the algebraic laws the operations are expected
//! to satisfy, and a few curved cases.

use kurbo::{Point, Rect};
use lightningbeam_region::{Component, Region, Segment};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Rectangle from origin and size
fn rect(x: f64, y: f64, w: f64, h: f64) -> Region {
    Region::rectangle(Rect::new(x, y, x + w, y + h))
}

#[test]
fn test_disjoint_boxes_stay_separate() {
    init_logging();
    let union = rect(0.0, 0.0, 10.0, 10.0).union(&rect(20.0, 20.0, 10.0, 10.0));
    assert_eq!(union.len(), 2);
    assert!((union.area() - 200.0).abs() < 1e-9);
}

#[test]
fn test_overlapping_boxes_merge() {
    init_logging();
    let union = rect(0.0, 0.0, 10.0, 10.0).union(&rect(5.0, 5.0, 10.0, 10.0));
    assert_eq!(union.len(), 1);
    assert!((union.area() - 175.0).abs() < 1e-9);

    let solid = union.solids().next().unwrap();
    assert!(solid.holes().is_empty());
    assert_eq!(solid.boundary(), Rect::new(0.0, 0.0, 15.0, 15.0));
}

#[test]
fn test_subtracting_inner_box_punches_hole() {
    init_logging();
    let result = rect(0.0, 0.0, 10.0, 10.0).subtracting(&rect(2.0, 2.0, 2.0, 2.0));
    assert_eq!(result.len(), 1);

    let solid = result.solids().next().unwrap();
    assert_eq!(solid.holes().len(), 1);
    assert!((solid.outer().area().abs() - 100.0).abs() < 1e-9);
    assert!((solid.area() - 96.0).abs() < 1e-9);
    assert!((result.area() - 96.0).abs() < 1e-9);
}

#[test]
fn test_boxes_sharing_an_edge() {
    init_logging();
    let left = rect(0.0, 0.0, 10.0, 10.0);
    let right = rect(10.0, 0.0, 10.0, 10.0);

    assert!((left.union(&right).area() - 200.0).abs() < 1e-9);
    assert!(left.intersection(&right).area().abs() < 1e-9);
    assert!(left.is_disjoint(&right));
    assert!((left.subtracting(&right).area() - 100.0).abs() < 1e-9);
}

#[test]
fn test_commutativity() {
    init_logging();
    let a = rect(0.0, 0.0, 10.0, 10.0);
    let b = rect(5.0, 5.0, 10.0, 10.0);

    assert!(a.union(&b).is_equal(&b.union(&a)));
    assert!(a.intersection(&b).is_equal(&b.intersection(&a)));
    assert!(a.symmetric_difference(&b).is_equal(&b.symmetric_difference(&a)));
}

#[test]
fn test_idempotence() {
    init_logging();
    let a = rect(0.0, 0.0, 10.0, 10.0).union(&rect(5.0, 5.0, 10.0, 10.0));

    assert!(a.union(&a).is_equal(&a));
    assert!(a.intersection(&a).is_equal(&a));
    assert!(a.subtracting(&a).is_empty());
}

#[test]
fn test_identity() {
    init_logging();
    let a = rect(0.0, 0.0, 10.0, 10.0);
    let empty = Region::new();

    assert!(a.union(&empty).is_equal(&a));
    assert!(empty.union(&a).is_equal(&a));
    assert!(a.intersection(&empty).is_equal(&empty));
    assert!(a.subtracting(&empty).is_equal(&a));
    assert!(empty.subtracting(&a).is_empty());
}

#[test]
fn test_symmetric_difference_law() {
    init_logging();
    let a = rect(0.0, 0.0, 10.0, 10.0);
    let b = rect(5.0, 5.0, 10.0, 10.0);

    let symmetric = a.symmetric_difference(&b);
    let halves = a.subtracting(&b).union(&b.subtracting(&a));
    assert!(symmetric.is_equal(&halves));
    assert!((symmetric.area() - 150.0).abs() < 1e-9);
}

#[test]
fn test_containment_consistency() {
    init_logging();
    let big = rect(0.0, 0.0, 10.0, 10.0);
    let small = rect(2.0, 2.0, 3.0, 3.0);

    assert!(small.is_subset(&big));
    assert!(big.is_superset(&small));
    assert!(small.is_strict_subset(&big));
    assert!(!big.is_subset(&small));
    assert!(small.union(&big).is_equal(&big));
    assert!(small.intersection(&big).is_equal(&small));
}

#[test]
fn test_hole_then_refill() {
    init_logging();
    let mut region = rect(0.0, 0.0, 10.0, 10.0);
    region.subtract(&rect(2.0, 2.0, 2.0, 2.0));
    assert!((region.area() - 96.0).abs() < 1e-9);

    region.form_union(&rect(1.0, 1.0, 4.0, 4.0));
    assert_eq!(region.len(), 1);
    assert!(region.solids().all(|s| s.holes().is_empty()));
    assert!(region.is_equal(&rect(0.0, 0.0, 10.0, 10.0)));
}

#[test]
fn test_circle_hole_in_square() {
    init_logging();
    let circle = Region::ellipse(Point::ZERO, 10.0, 10.0);
    let square = rect(-20.0, -20.0, 40.0, 40.0);

    let ring = square.subtracting(&circle);
    assert_eq!(ring.len(), 1);
    assert!((ring.area() - (1600.0 - circle.area())).abs() < 1e-9);
    assert!(circle.is_subset(&square));
    assert!(ring.is_disjoint(&circle));
}

#[test]
fn test_overlapping_circles_inclusion_exclusion() {
    init_logging();
    let a = Region::ellipse(Point::new(0.0, 0.0), 10.0, 10.0);
    let b = Region::ellipse(Point::new(10.0, 0.0), 10.0, 10.0);

    let union = a.union(&b);
    let intersection = a.intersection(&b);
    assert_eq!(union.len(), 1);
    assert_eq!(intersection.len(), 1);
    assert!(intersection.area() > 0.0);
    assert!((union.area() + intersection.area() - a.area() - b.area()).abs() < 1e-6);

    let lens = a.subtracting(&b);
    assert!((lens.area() - (a.area() - intersection.area())).abs() < 1e-6);
}

#[test]
fn test_outline_touching_itself_against_bar() {
    init_logging();
    // Two triangles meeting at (5, 5), drawn as one outline
    let pinch = Region::from_component(Component::new(
        Point::new(0.0, 0.0),
        [(5.0, 5.0), (10.0, 0.0), (10.0, 10.0), (5.0, 5.0), (0.0, 10.0)].map(|(x, y)| {
            Segment::Line {
                end: Point::new(x, y),
            }
        }),
    ));
    // Its lower edge passes through the point where the outline touches itself
    let bar = rect(-1.0, 5.0, 12.0, 2.0);

    let union = pinch.union(&bar);
    assert_eq!(union.len(), 1);
    assert!((union.area() - 58.0).abs() < 1e-9);

    let intersection = pinch.intersection(&bar);
    assert_eq!(intersection.len(), 2);
    assert!((intersection.area() - 16.0).abs() < 1e-9);

    let rest = pinch.subtracting(&bar);
    assert_eq!(rest.len(), 4);
    assert!((rest.area() - 34.0).abs() < 1e-9);
}

#[test]
fn test_subtracting_inscribed_diamond_leaves_corners() {
    init_logging();
    let diamond = Region::from_component(Component::new(
        Point::new(5.0, 0.0),
        [(10.0, 5.0), (5.0, 10.0), (0.0, 5.0)].map(|(x, y)| Segment::Line {
            end: Point::new(x, y),
        }),
    ));
    assert!((diamond.area() - 50.0).abs() < 1e-9);

    let corners = rect(0.0, 0.0, 10.0, 10.0).subtracting(&diamond);
    assert_eq!(corners.len(), 4);
    assert!(corners.solids().all(|s| s.holes().is_empty()));
    assert!(corners.solids().all(|s| (s.area() - 12.5).abs() < 1e-9));
    assert!(corners.is_disjoint(&diamond));
}
