//! Integration tests for building regions from overlapping and self-crossing outlines

use kurbo::{BezPath, Point};
use lightningbeam_region::{break_loop, Component, ComponentBuilder, Region, Segment, WindingRule};
use std::f64::consts::{FRAC_PI_2, PI};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn polygon(points: &[Point]) -> Component {
    Component::new(
        points[0],
        points[1..].iter().map(|&end| Segment::Line { end }),
    )
}

fn square(x: f64, y: f64, size: f64) -> Component {
    polygon(&[
        Point::new(x, y),
        Point::new(x + size, y),
        Point::new(x + size, y + size),
        Point::new(x, y + size),
    ])
}

/// Five-pointed star drawn as a single crossing outline
fn pentagram(radius: f64) -> Component {
    let points: Vec<Point> = (0..5)
        .map(|k| {
            let angle = FRAC_PI_2 + ((k * 2) % 5) as f64 * 2.0 * PI / 5.0;
            Point::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect();
    polygon(&points)
}

#[test]
fn test_nested_rectangles_non_zero() {
    init_logging();
    let contours = vec![square(0.0, 0.0, 10.0), square(3.0, 3.0, 4.0)];
    let region = Region::from_contours(contours, WindingRule::NonZero);

    assert_eq!(region.len(), 1);
    assert!(region.solids().all(|s| s.holes().is_empty()));
    assert!((region.area() - 100.0).abs() < 1e-9);
}

#[test]
fn test_nested_rectangles_even_odd() {
    init_logging();
    let contours = vec![square(0.0, 0.0, 10.0), square(3.0, 3.0, 4.0)];
    let region = Region::from_contours(contours, WindingRule::EvenOdd);

    assert_eq!(region.len(), 1);
    let solid = region.solids().next().unwrap();
    assert_eq!(solid.holes().len(), 1);
    assert!((region.area() - 84.0).abs() < 1e-9);
}

#[test]
fn test_pentagram_breaks_into_two_loops() {
    init_logging();
    let star = pentagram(100.0);
    let loops = break_loop(&star);
    assert_eq!(loops.len(), 2);

    let mut areas: Vec<f64> = loops.iter().map(|s| s.area()).collect();
    areas.sort_by(|a, b| a.total_cmp(b));
    // Inner pentagon and the outline of the star
    assert!((areas[0] - 3468.9318928).abs() < 1e-6);
    assert!((areas[1] - 11225.6994145).abs() < 1e-6);
}

#[test]
fn test_pentagram_fill_rules() {
    init_logging();
    let non_zero = Region::from_contours([pentagram(100.0)], WindingRule::NonZero);
    assert_eq!(non_zero.len(), 1);
    assert!((non_zero.area() - 11225.6994145).abs() < 1e-6);

    // The inner pentagon touches the outline at five points, leaving the five tips
    let even_odd = Region::from_contours([pentagram(100.0)], WindingRule::EvenOdd);
    assert_eq!(even_odd.len(), 5);
    assert!(even_odd.solids().all(|s| s.holes().is_empty()));
    assert!((even_odd.area() - 7756.7675217).abs() < 1e-6);
}

#[test]
fn test_doubled_back_outline() {
    init_logging();
    let outline = polygon(&[
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(0.0, 10.0),
        Point::new(0.0, 0.0),
        Point::new(5.0, 0.0),
        Point::new(5.0, -5.0),
    ]);
    // Signed area of the outline itself
    assert!((outline.area() - 87.5).abs() < 1e-9);

    // The square above the shared stretch and the triangle below it
    let region = Region::from_contours([outline], WindingRule::NonZero);
    assert_eq!(region.len(), 2);
    assert!(region.solids().all(|s| s.holes().is_empty()));
    assert!((region.area() - 112.5).abs() < 1e-9);
    assert_eq!(region.boundary(), kurbo::Rect::new(0.0, -5.0, 10.0, 10.0));
}

#[test]
fn test_figure_eight() {
    init_logging();
    let bowtie = polygon(&[
        Point::new(0.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(10.0, 0.0),
        Point::new(0.0, 10.0),
    ]);

    let loops = break_loop(&bowtie);
    assert_eq!(loops.len(), 2);
    assert!(loops.iter().all(|s| (s.area() - 25.0).abs() < 1e-9));

    let region = Region::from_contours([bowtie], WindingRule::NonZero);
    assert_eq!(region.len(), 2);
    assert!((region.area() - 50.0).abs() < 1e-9);
}

#[test]
fn test_from_bez_path() {
    init_logging();
    let mut path = BezPath::new();
    for (x, y, size) in [(0.0, 0.0, 10.0), (3.0, 3.0, 4.0)] {
        path.move_to((x, y));
        path.line_to((x + size, y));
        path.line_to((x + size, y + size));
        path.line_to((x, y + size));
        path.close_path();
    }

    let non_zero = Region::from_bez_path(&path, WindingRule::NonZero);
    let even_odd = Region::from_bez_path(&path, WindingRule::EvenOdd);
    assert!((non_zero.area() - 100.0).abs() < 1e-9);
    assert!((even_odd.area() - 84.0).abs() < 1e-9);
}

#[test]
fn test_builder_closes_open_contours() {
    init_logging();
    let mut builder = ComponentBuilder::new();
    builder
        .move_to(Point::new(0.0, 0.0))
        .line_to(Point::new(10.0, 0.0))
        .line_to(Point::new(10.0, 10.0))
        .move_to(Point::new(20.0, 0.0))
        .quad_to(Point::new(25.0, 10.0), Point::new(30.0, 0.0));
    let contours = builder.build();
    assert_eq!(contours.len(), 2);

    // Open contours are closed with a straight line back to the start
    assert!((contours[0].area() - 50.0).abs() < 1e-9);
    assert!(contours[1].area() < 0.0);

    let region = Region::from_contours(contours, WindingRule::NonZero);
    assert_eq!(region.len(), 2);
}
