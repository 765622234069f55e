/*
This code is part of the Tellus geospatial data access library.
Authors: The Tellus Project Developers
Created: 19/02/2024
Last Modified: 19/05/2025
License: MIT
*/
use super::{BoundingBox, Point2D};

/// A line segment defined by its starting and ending points.
#[derive(Default, Copy, Clone, Debug)]
pub struct LineSegment {
    pub p1: Point2D,
    pub p2: Point2D,
}

/// The result of intersecting two segments. Ray-crossing counts depend on
/// the distinction between a single clean crossing point and a touch along
/// a shared line, so the overlap case is reported separately rather than
/// collapsed into a boolean.
#[derive(Copy, Clone, Debug)]
pub enum SegmentIntersection {
    /// The segments do not meet.
    Nothing,
    /// The segments cross or touch at a single point.
    Point(Point2D),
    /// The segments are collinear and share an interval (possibly a single
    /// shared endpoint, in which case the interval is degenerate).
    Overlap(LineSegment),
}

impl SegmentIntersection {
    /// True for the single-point case only; a collinear overlap is a touch,
    /// not a crossing.
    pub fn is_crossing(&self) -> bool {
        matches!(self, SegmentIntersection::Point(_))
    }
}

impl LineSegment {
    /// Creates a new LineSegment.
    pub fn new(p1: Point2D, p2: Point2D) -> LineSegment {
        LineSegment { p1, p2 }
    }

    pub fn get_bounding_box(&self) -> BoundingBox {
        BoundingBox::from_two_points(self.p1, self.p2)
    }

    /// Tests whether the segment has (nearly) zero length.
    pub fn is_degenerate(&self, tolerance: f64) -> bool {
        self.p1.nearly_equals(&self.p2, tolerance)
    }

    /// Tests whether two segments describe the same point pair, in either
    /// orientation.
    pub fn nearly_equals(&self, other: &Self, tolerance: f64) -> bool {
        (self.p1.nearly_equals(&other.p1, tolerance) && self.p2.nearly_equals(&other.p2, tolerance))
            || (self.p1.nearly_equals(&other.p2, tolerance)
                && self.p2.nearly_equals(&other.p1, tolerance))
    }

    pub fn intersects(&self, other: &Self, tolerance: f64) -> bool {
        !matches!(
            self.intersection(other, tolerance),
            SegmentIntersection::Nothing
        )
    }

    /// Finds the intersection of two segments. Segments can meet at a
    /// point or, when collinear, along an interval; parallel non-collinear
    /// and disjoint segments yield `Nothing`.
    ///
    /// Based on https://en.wikipedia.org/wiki/Line%E2%80%93line_intersection
    /// and https://martin-thoma.com/how-to-check-if-two-line-segments-intersect/
    pub fn intersection(&self, other: &Self, tolerance: f64) -> SegmentIntersection {
        if self.is_degenerate(tolerance) || other.is_degenerate(tolerance) {
            return SegmentIntersection::Nothing;
        }
        if self.nearly_equals(other, tolerance) {
            return SegmentIntersection::Overlap(*self);
        }
        if !self.get_bounding_box().overlaps(other.get_bounding_box()) {
            return SegmentIntersection::Nothing;
        }

        let denom = (self.p1.x - self.p2.x) * (other.p1.y - other.p2.y)
            - (self.p1.y - self.p2.y) * (other.p1.x - other.p2.x);
        if denom != 0f64 {
            let t = ((self.p1.x - other.p1.x) * (other.p1.y - other.p2.y)
                - (self.p1.y - other.p1.y) * (other.p1.x - other.p2.x))
                / denom;

            let u = -((self.p1.x - self.p2.x) * (self.p1.y - other.p1.y)
                - (self.p1.y - self.p2.y) * (self.p1.x - other.p1.x))
                / denom;

            if t >= 0f64 && t <= 1f64 && u >= 0f64 && u <= 1f64 {
                let p = Point2D::new(
                    self.p1.x + t * (self.p2.x - self.p1.x),
                    self.p1.y + t * (self.p2.y - self.p1.y),
                );
                return SegmentIntersection::Point(p);
            }
        }

        // parallel, or the crossing fell outside one of the segments;
        // are the segments coincident?
        if self.is_point_on_line(other.p1, tolerance) {
            // what is the shared interval?
            let mut contained = [false; 4];
            contained[0] = self.p1.is_between(&other.p1, &other.p2, tolerance);
            contained[1] = other.p1.is_between(&self.p1, &self.p2, tolerance);
            contained[2] = self.p2.is_between(&other.p1, &other.p2, tolerance);
            contained[3] = other.p2.is_between(&self.p1, &self.p2, tolerance);

            let endpoints = [self.p1, other.p1, self.p2, other.p2];
            let mut i = 4;
            let mut j = 4;
            for a in 0..4 {
                if contained[a] {
                    i = a;
                    break;
                }
            }
            for a in (0..4).rev() {
                if contained[a] {
                    j = a;
                    break;
                }
            }
            if i == 4 || j == 4 {
                return SegmentIntersection::Nothing;
            }
            return SegmentIntersection::Overlap(LineSegment::new(endpoints[i], endpoints[j]));
        }

        // the lines are parallel but not coincident
        SegmentIntersection::Nothing
    }

    /// Checks whether a point lies on the infinite line through the
    /// segment, within `tolerance` of cross-product deviation.
    fn is_point_on_line(&self, p: Point2D, tolerance: f64) -> bool {
        let r = (self.p2 - self.p1).cross(&(p - self.p1));
        r.abs() <= tolerance
    }

    /// Checks whether a point lies on the segment itself, endpoints
    /// included.
    pub fn is_point_on_line_segment(&self, p: Point2D, tolerance: f64) -> bool {
        self.is_point_on_line(p, tolerance)
            && p.x >= self.p1.x.min(self.p2.x) - tolerance
            && p.x <= self.p1.x.max(self.p2.x) + tolerance
            && p.y >= self.p1.y.min(self.p2.y) - tolerance
            && p.y <= self.p1.y.max(self.p2.y) + tolerance
    }
}
