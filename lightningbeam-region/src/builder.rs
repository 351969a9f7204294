//! Incremental construction of components from drawing commands

use crate::component::Component;
use crate::segment::Segment;
use kurbo::{PathEl, Point};

/// Collects move/line/curve commands into closed components
///
/// Every `move_to` or `close` finishes the contour in progress. Contours that are
/// left open are closed with a straight line when they are finished.
#[derive(Debug, Default)]
pub struct ComponentBuilder {
    components: Vec<Component>,
    start: Option<Point>,
    current: Point,
    segments: Vec<Segment>,
}

impl ComponentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new contour at `point`
    pub fn move_to(&mut self, point: Point) -> &mut Self {
        self.finish();
        self.start = Some(point);
        self.current = point;
        self
    }

    pub fn line_to(&mut self, end: Point) -> &mut Self {
        self.push(Segment::Line { end })
    }

    pub fn quad_to(&mut self, control: Point, end: Point) -> &mut Self {
        self.push(Segment::Quad { control, end })
    }

    pub fn curve_to(&mut self, control1: Point, control2: Point, end: Point) -> &mut Self {
        self.push(Segment::Cubic {
            control1,
            control2,
            end,
        })
    }

    /// Close the contour in progress
    pub fn close(&mut self) -> &mut Self {
        let start = self.start;
        self.finish();
        // Drawing may continue from the start of the closed contour
        if let Some(start) = start {
            self.current = start;
        }
        self
    }

    /// Feed a kurbo path element
    pub fn push_element(&mut self, el: PathEl) -> &mut Self {
        match el {
            PathEl::MoveTo(p) => self.move_to(p),
            PathEl::LineTo(p) => self.line_to(p),
            PathEl::QuadTo(p1, p2) => self.quad_to(p1, p2),
            PathEl::CurveTo(p1, p2, p3) => self.curve_to(p1, p2, p3),
            PathEl::ClosePath => self.close(),
        }
    }

    /// Finish the contour in progress and return every component built so far
    pub fn build(mut self) -> Vec<Component> {
        self.finish();
        self.components
    }

    fn push(&mut self, segment: Segment) -> &mut Self {
        if self.start.is_none() {
            // Drawing without a move starts from the current point
            self.start = Some(self.current);
        }
        self.current = segment.end();
        self.segments.push(segment);
        self
    }

    fn finish(&mut self) {
        let segments = std::mem::take(&mut self.segments);
        if let Some(start) = self.start.take() {
            if !segments.is_empty() {
                self.components.push(Component::new(start, segments));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::BezPath;

    #[test]
    fn test_builder_closes_contours() {
        let mut builder = ComponentBuilder::new();
        builder
            .move_to(Point::new(0.0, 0.0))
            .line_to(Point::new(10.0, 0.0))
            .line_to(Point::new(10.0, 10.0))
            .move_to(Point::new(20.0, 0.0))
            .line_to(Point::new(30.0, 0.0))
            .quad_to(Point::new(30.0, 10.0), Point::new(20.0, 10.0))
            .close();
        let components = builder.build();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].len(), 3);
        assert!((components[0].area() - 50.0).abs() < 1e-9);
        assert_eq!(components[1].len(), 3);
    }

    #[test]
    fn test_from_bez_path() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((4.0, 0.0));
        path.line_to((4.0, 4.0));
        path.line_to((0.0, 4.0));
        path.close_path();
        let components = Component::from_bez_path(&path);
        assert_eq!(components.len(), 1);
        assert!((components[0].area() - 16.0).abs() < 1e-9);
        // Three drawn edges plus the closing edge
        assert_eq!(components[0].len(), 4);
        assert_eq!(components[0].to_bez_path().elements().len(), 6);
    }

    #[test]
    fn test_empty_contours_are_skipped() {
        let mut builder = ComponentBuilder::new();
        builder.move_to(Point::new(1.0, 1.0)).move_to(Point::new(2.0, 2.0)).close();
        assert!(builder.build().is_empty());
    }
}
