/*
This code is part of the Tellus geospatial data access library.
Authors: The Tellus Project Developers
Created: 19/02/2024
Last Modified: 19/05/2025
License: MIT

Notes: Spatial predicates evaluated directly over the flat vertex-array
model. Shapes are viewed through a feature-kind tagged enum so that
predicate dispatch is an exhaustive match rather than a runtime type
check; passing the wrong geometry to an algorithm is unrepresentable.
*/
use super::{FeatureKind, Shape, ShapeRange};
use tellus_common::structures::{LineSegment, Point2D};

/// A shape's geometry, discriminated by feature class. Views borrow the
/// owning shape's range and vertex buffer.
#[derive(Copy, Clone)]
pub enum ShapeGeometry<'a> {
    Point(PointShape<'a>),
    MultiPoint(MultiPointShape<'a>),
    Line(LineShape<'a>),
    Polygon(PolygonShape<'a>),
}

impl<'a> ShapeGeometry<'a> {
    pub fn feature_kind(&self) -> FeatureKind {
        match self {
            ShapeGeometry::Point(_) => FeatureKind::Point,
            ShapeGeometry::MultiPoint(_) => FeatureKind::MultiPoint,
            ShapeGeometry::Line(_) => FeatureKind::Line,
            ShapeGeometry::Polygon(_) => FeatureKind::Polygon,
        }
    }

    pub fn range(&self) -> &'a ShapeRange {
        match self {
            ShapeGeometry::Point(g) => g.range,
            ShapeGeometry::MultiPoint(g) => g.range,
            ShapeGeometry::Line(g) => g.range,
            ShapeGeometry::Polygon(g) => g.range,
        }
    }

    fn vertices(&self) -> &'a [f64] {
        match self {
            ShapeGeometry::Point(g) => g.vertices,
            ShapeGeometry::MultiPoint(g) => g.vertices,
            ShapeGeometry::Line(g) => g.vertices,
            ShapeGeometry::Polygon(g) => g.vertices,
        }
    }

    /// Every vertex of the underlying shape.
    pub fn points(&self) -> impl Iterator<Item = Point2D> + 'a {
        self.range().points(self.vertices())
    }
}

impl Shape {
    /// The shape viewed as its feature class, or `None` for null
    /// geometry.
    pub fn geometry(&self) -> Option<ShapeGeometry<'_>> {
        let (range, vertices) = (&self.range, self.vertices.as_slice());
        match self.range.feature_kind {
            FeatureKind::Point => Some(ShapeGeometry::Point(PointShape { range, vertices })),
            FeatureKind::MultiPoint => {
                Some(ShapeGeometry::MultiPoint(MultiPointShape { range, vertices }))
            }
            FeatureKind::Line => Some(ShapeGeometry::Line(LineShape { range, vertices })),
            FeatureKind::Polygon => Some(ShapeGeometry::Polygon(PolygonShape { range, vertices })),
            FeatureKind::Unspecified => None,
        }
    }
}

/// A single-point shape view.
#[derive(Copy, Clone)]
pub struct PointShape<'a> {
    range: &'a ShapeRange,
    vertices: &'a [f64],
}

impl<'a> PointShape<'a> {
    pub fn new(range: &'a ShapeRange, vertices: &'a [f64]) -> Option<PointShape<'a>> {
        if range.feature_kind != FeatureKind::Point {
            return None;
        }
        Some(PointShape { range, vertices })
    }

    pub fn point(&self) -> Point2D {
        let j = self.range.start_index * 2;
        Point2D::new(self.vertices[j], self.vertices[j + 1])
    }
}

/// A multipoint shape view.
#[derive(Copy, Clone)]
pub struct MultiPointShape<'a> {
    range: &'a ShapeRange,
    vertices: &'a [f64],
}

impl<'a> MultiPointShape<'a> {
    pub fn new(range: &'a ShapeRange, vertices: &'a [f64]) -> Option<MultiPointShape<'a>> {
        if range.feature_kind != FeatureKind::MultiPoint {
            return None;
        }
        Some(MultiPointShape { range, vertices })
    }

    pub fn points(&self) -> impl Iterator<Item = Point2D> + 'a {
        self.range.points(self.vertices)
    }
}

/// A polyline shape view carrying the line predicates.
#[derive(Copy, Clone)]
pub struct LineShape<'a> {
    range: &'a ShapeRange,
    vertices: &'a [f64],
}

impl<'a> LineShape<'a> {
    pub fn new(range: &'a ShapeRange, vertices: &'a [f64]) -> Option<LineShape<'a>> {
        if range.feature_kind != FeatureKind::Line {
            return None;
        }
        Some(LineShape { range, vertices })
    }

    pub fn points(&self) -> impl Iterator<Item = Point2D> + 'a {
        self.range.points(self.vertices)
    }

    /// Brute-force pairwise segment intersection between two polylines.
    /// O(segments x segments); shapefile parts are typically small, but
    /// this is the dominant cost for very large shapes.
    pub fn segments_intersect(&self, other: &LineShape<'_>, tolerance: f64) -> bool {
        if !self.range.extent.overlaps(other.range.extent) {
            return false;
        }
        any_segments_cross(
            self.range,
            self.vertices,
            other.range,
            other.vertices,
            tolerance,
        )
    }

    /// Tests whether a point lies on any segment of the polyline.
    pub fn touches_point(&self, p: Point2D, tolerance: f64) -> bool {
        if !self.range.extent.is_point_in_box(p.x, p.y) {
            return false;
        }
        self.range
            .part_iter(self.vertices)
            .any(|part| part.segments().any(|s| s.is_point_on_line_segment(p, tolerance)))
    }

    pub fn intersects(&self, other: &ShapeGeometry<'_>, tolerance: f64) -> bool {
        if !self.range.extent.overlaps(other.range().extent) {
            return false;
        }
        match other {
            ShapeGeometry::Point(p) => self.touches_point(p.point(), tolerance),
            ShapeGeometry::MultiPoint(mp) => {
                mp.points().any(|v| self.touches_point(v, tolerance))
            }
            ShapeGeometry::Line(l) => self.segments_intersect(l, tolerance),
            ShapeGeometry::Polygon(pg) => pg.intersects(&ShapeGeometry::Line(*self), tolerance),
        }
    }
}

/// A polygon shape view carrying the containment predicates.
#[derive(Copy, Clone)]
pub struct PolygonShape<'a> {
    range: &'a ShapeRange,
    vertices: &'a [f64],
}

impl<'a> PolygonShape<'a> {
    pub fn new(range: &'a ShapeRange, vertices: &'a [f64]) -> Option<PolygonShape<'a>> {
        if range.feature_kind != FeatureKind::Polygon {
            return None;
        }
        Some(PolygonShape { range, vertices })
    }

    pub fn points(&self) -> impl Iterator<Item = Point2D> + 'a {
        self.range.points(self.vertices)
    }

    /// Point-in-polygon by horizontal ray crossing, with hole accounting.
    /// A ray is cast from the point to the polygon extent's max-x edge and
    /// crossings are counted per ring; only a single clean crossing point
    /// counts, so touches along collinear edges are ignored. Rings whose
    /// crossing parity is odd contribute +1 as shells and -1 as holes; the
    /// point is contained when the signed total is positive.
    ///
    /// Points exactly on a ring boundary are an unstable edge case of ray
    /// parity and may be classified either way.
    pub fn contains_point(&self, p: Point2D, tolerance: f64) -> bool {
        if !self.range.extent.is_point_in_box(p.x, p.y) {
            return false;
        }
        let ray = LineSegment::new(p, Point2D::new(self.range.extent.max_x, p.y));
        let mut winding = 0i32;
        for ring in self.range.part_iter(self.vertices) {
            let mut crossings = 0usize;
            for segment in ring.segments() {
                if segment.intersection(&ray, tolerance).is_crossing() {
                    crossings += 1;
                }
            }
            if crossings % 2 == 1 {
                if ring.is_hole() {
                    winding -= 1;
                } else {
                    winding += 1;
                }
            }
        }
        winding > 0
    }

    /// Tests whether any vertex of `other` falls inside this polygon.
    pub fn contains_any_vertex(&self, other: &ShapeGeometry<'_>, tolerance: f64) -> bool {
        other.points().any(|v| self.contains_point(v, tolerance))
    }

    pub fn intersects(&self, other: &ShapeGeometry<'_>, tolerance: f64) -> bool {
        if !self.range.extent.overlaps(other.range().extent) {
            return false;
        }
        match other {
            ShapeGeometry::Point(p) => self.contains_point(p.point(), tolerance),
            ShapeGeometry::MultiPoint(mp) => {
                mp.points().any(|v| self.contains_point(v, tolerance))
            }
            ShapeGeometry::Line(l) => {
                if l.points().any(|v| self.contains_point(v, tolerance)) {
                    return true;
                }
                any_segments_cross(self.range, self.vertices, l.range, l.vertices, tolerance)
            }
            ShapeGeometry::Polygon(pg) => {
                if pg.points().any(|v| self.contains_point(v, tolerance)) {
                    return true;
                }
                if any_segments_cross(self.range, self.vertices, pg.range, pg.vertices, tolerance) {
                    return true;
                }
                // this polygon may lie wholly inside the other; one
                // representative vertex settles it
                match self.points().next() {
                    Some(v) => pg.contains_point(v, tolerance),
                    None => false,
                }
            }
        }
    }
}

/// Pairwise segment test across every part of two shapes.
fn any_segments_cross(
    a_range: &ShapeRange,
    a_vertices: &[f64],
    b_range: &ShapeRange,
    b_vertices: &[f64],
    tolerance: f64,
) -> bool {
    for part_a in a_range.part_iter(a_vertices) {
        for seg_a in part_a.segments() {
            for part_b in b_range.part_iter(b_vertices) {
                for seg_b in part_b.segments() {
                    if seg_a.intersects(&seg_b, tolerance) {
                        return true;
                    }
                }
            }
        }
    }
    false
}

/// Tests whether two shape geometries intersect. Dispatch over the
/// feature-class pair is exhaustive; there is no wrong-type error path.
pub fn shapes_intersect(a: &ShapeGeometry<'_>, b: &ShapeGeometry<'_>, tolerance: f64) -> bool {
    match (a, b) {
        (ShapeGeometry::Polygon(pg), other) => pg.intersects(other, tolerance),
        (other, ShapeGeometry::Polygon(pg)) => pg.intersects(other, tolerance),
        (ShapeGeometry::Line(l), other) | (other, ShapeGeometry::Line(l)) => {
            l.intersects(other, tolerance)
        }
        (ShapeGeometry::Point(p1), ShapeGeometry::Point(p2)) => {
            p1.point().nearly_equals(&p2.point(), tolerance)
        }
        (ShapeGeometry::Point(p), ShapeGeometry::MultiPoint(mp))
        | (ShapeGeometry::MultiPoint(mp), ShapeGeometry::Point(p)) => {
            let v = p.point();
            mp.points().any(|q| q.nearly_equals(&v, tolerance))
        }
        (ShapeGeometry::MultiPoint(m1), ShapeGeometry::MultiPoint(m2)) => {
            if !m1.range.extent.overlaps(m2.range.extent) {
                return false;
            }
            m1.points()
                .any(|p| m2.points().any(|q| q.nearly_equals(&p, tolerance)))
        }
    }
}

#[cfg(test)]
mod test {
    use super::{shapes_intersect, ShapeGeometry};
    use crate::geometry::Shape;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use tellus_common::structures::Point2D;

    const TOL: f64 = 1e-9;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Point2D> {
        vec![
            Point2D::new(x0, y0),
            Point2D::new(x0 + size, y0),
            Point2D::new(x0 + size, y0 + size),
            Point2D::new(x0, y0 + size),
        ]
    }

    fn as_polygon(shape: &Shape) -> super::PolygonShape<'_> {
        match shape.geometry() {
            Some(ShapeGeometry::Polygon(pg)) => pg,
            _ => panic!("expected a polygon"),
        }
    }

    fn as_line(shape: &Shape) -> super::LineShape<'_> {
        match shape.geometry() {
            Some(ShapeGeometry::Line(l)) => l,
            _ => panic!("expected a polyline"),
        }
    }

    #[test]
    fn test_point_in_square() {
        let shape = Shape::polygon(&[&square(0.0, 0.0, 10.0)]);
        let pg = as_polygon(&shape);
        assert!(pg.contains_point(Point2D::new(5.0, 5.0), TOL));
        assert_eq!(pg.contains_point(Point2D::new(15.0, 5.0), TOL), false);
        assert_eq!(pg.contains_point(Point2D::new(5.0, -1.0), TOL), false);
    }

    #[test]
    fn test_boundary_points_are_unstable_but_defined() {
        // ray parity may classify boundary points either way; they must
        // simply not panic and must be deterministic
        let shape = Shape::polygon(&[&square(0.0, 0.0, 10.0)]);
        let pg = as_polygon(&shape);
        let left = pg.contains_point(Point2D::new(0.0, 5.0), TOL);
        assert_eq!(pg.contains_point(Point2D::new(0.0, 5.0), TOL), left);
        // a point on the extent's max-x edge degenerates the ray
        assert_eq!(pg.contains_point(Point2D::new(10.0, 5.0), TOL), false);
    }

    #[test]
    fn test_hole_subtraction() {
        let shell = square(0.0, 0.0, 10.0);
        let mut hole = square(4.0, 4.0, 2.0);
        hole.reverse();
        let shape = Shape::polygon(&[&shell, &hole]);
        let pg = as_polygon(&shape);
        // inside the hole: not contained
        assert_eq!(pg.contains_point(Point2D::new(5.0, 5.0), TOL), false);
        // inside the shell but outside the hole: contained
        assert!(pg.contains_point(Point2D::new(1.0, 1.0), TOL));
    }

    #[test]
    fn test_contains_any_vertex() {
        let shape = Shape::polygon(&[&square(0.0, 0.0, 10.0)]);
        let pg = as_polygon(&shape);
        let inside = Shape::multipoint(&[Point2D::new(20.0, 20.0), Point2D::new(3.0, 3.0)]);
        let outside = Shape::multipoint(&[Point2D::new(20.0, 20.0), Point2D::new(-3.0, 3.0)]);
        assert!(pg.contains_any_vertex(&inside.geometry().unwrap(), TOL));
        assert_eq!(pg.contains_any_vertex(&outside.geometry().unwrap(), TOL), false);
    }

    #[test]
    fn test_polygon_line_intersection() {
        let shape = Shape::polygon(&[&square(0.0, 0.0, 10.0)]);
        let pg = as_polygon(&shape);
        // crosses straight through without a vertex inside
        let through = Shape::polyline(&[&[Point2D::new(-5.0, 5.0), Point2D::new(15.0, 5.0)]]);
        assert!(pg.intersects(&through.geometry().unwrap(), TOL));
        // wholly outside
        let outside = Shape::polyline(&[&[Point2D::new(-5.0, 20.0), Point2D::new(15.0, 20.0)]]);
        assert_eq!(pg.intersects(&outside.geometry().unwrap(), TOL), false);
    }

    #[test]
    fn test_polygon_wholly_containing_polygon() {
        let big = Shape::polygon(&[&square(0.0, 0.0, 10.0)]);
        let small = Shape::polygon(&[&square(4.0, 4.0, 2.0)]);
        let big_g = big.geometry().unwrap();
        let small_g = small.geometry().unwrap();
        // no vertex of big is inside small and no segments cross; the
        // representative-vertex fallback must still find the overlap
        assert!(shapes_intersect(&small_g, &big_g, TOL));
        assert!(shapes_intersect(&big_g, &small_g, TOL));

        let far = Shape::polygon(&[&square(100.0, 100.0, 5.0)]);
        assert_eq!(shapes_intersect(&big_g, &far.geometry().unwrap(), TOL), false);
    }

    #[test]
    fn test_segments_intersect_symmetry() {
        let a = Shape::polyline(&[&[Point2D::new(0.0, 0.0), Point2D::new(10.0, 10.0)]]);
        let b = Shape::polyline(&[&[Point2D::new(0.0, 10.0), Point2D::new(10.0, 0.0)]]);
        let c = Shape::polyline(&[&[Point2D::new(20.0, 0.0), Point2D::new(30.0, 0.0)]]);
        let (la, lb, lc) = (as_line(&a), as_line(&b), as_line(&c));
        assert!(la.segments_intersect(&lb, TOL));
        assert_eq!(
            la.segments_intersect(&lb, TOL),
            lb.segments_intersect(&la, TOL)
        );
        assert_eq!(
            la.segments_intersect(&lc, TOL),
            lc.segments_intersect(&la, TOL)
        );
    }

    #[test]
    fn test_random_segment_symmetry() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..250 {
            let coords: Vec<f64> = (0..8).map(|_| rng.gen_range(-10.0, 10.0)).collect();
            let a = Shape::polyline(&[&[
                Point2D::new(coords[0], coords[1]),
                Point2D::new(coords[2], coords[3]),
            ]]);
            let b = Shape::polyline(&[&[
                Point2D::new(coords[4], coords[5]),
                Point2D::new(coords[6], coords[7]),
            ]]);
            let (la, lb) = (as_line(&a), as_line(&b));
            assert_eq!(
                la.segments_intersect(&lb, TOL),
                lb.segments_intersect(&la, TOL)
            );
        }
    }

    #[test]
    fn test_random_points_in_square() {
        // away from the boundary, ray parity must agree with the obvious
        // interval test
        let shape = Shape::polygon(&[&square(0.0, 0.0, 10.0)]);
        let pg = as_polygon(&shape);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..500 {
            let x: f64 = rng.gen_range(-2.0, 12.0);
            let y: f64 = rng.gen_range(-2.0, 12.0);
            if (x - 0.0).abs() < 0.01
                || (x - 10.0).abs() < 0.01
                || (y - 0.0).abs() < 0.01
                || (y - 10.0).abs() < 0.01
            {
                continue;
            }
            let expected = x > 0.0 && x < 10.0 && y > 0.0 && y < 10.0;
            assert_eq!(pg.contains_point(Point2D::new(x, y), TOL), expected);
        }
    }

    #[test]
    fn test_point_and_multipoint_relations() {
        let p = Shape::point(3.0, 3.0);
        let q = Shape::point(3.0, 3.0);
        let r = Shape::point(4.0, 3.0);
        assert!(shapes_intersect(
            &p.geometry().unwrap(),
            &q.geometry().unwrap(),
            TOL
        ));
        assert_eq!(
            shapes_intersect(&p.geometry().unwrap(), &r.geometry().unwrap(), TOL),
            false
        );

        let line = Shape::polyline(&[&[Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0)]]);
        let on = Shape::point(5.0, 0.0);
        let off = Shape::point(5.0, 0.5);
        assert!(shapes_intersect(
            &line.geometry().unwrap(),
            &on.geometry().unwrap(),
            TOL
        ));
        assert_eq!(
            shapes_intersect(&line.geometry().unwrap(), &off.geometry().unwrap(), TOL),
            false
        );
    }
}
