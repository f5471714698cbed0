use geo::{Area, BooleanOps, BoundingRect, Intersects, LineString, MultiPoint};

pub use geo::{MultiPolygon, Polygon, Rect};

use super::Point;

// Shared area below which two polygons are considered touching
pub const OVERLAP_AREA_TOLERANCE: f64 = 1e-6;

pub fn polygon(points: &[Point]) -> Polygon<f64> {
    let ring: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
    Polygon::new(LineString::from(ring), vec![])
}

pub fn rectangle(min: Point, max: Point) -> Polygon<f64> {
    Rect::new((min.x, min.y), (max.x, max.y)).to_polygon()
}

pub fn bounds<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Rect<f64>> {
    let points: MultiPoint<f64> = points
        .into_iter()
        .map(|p| geo::Point::new(p.x, p.y))
        .collect();
    points.bounding_rect()
}

/// True when the interiors share area. Shared edges and corners do not count.
pub fn overlaps(a: &Polygon<f64>, b: &Polygon<f64>) -> bool {
    if !a.intersects(b) {
        return false;
    }
    a.intersection(b).unsigned_area() > OVERLAP_AREA_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_squares_do_not_overlap() {
        let a = rectangle(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        let b = rectangle(Point::new(1.0, 0.0), Point::new(2.0, 1.0));
        assert!(!overlaps(&a, &b));
    }

    #[test]
    fn rotated_square_overlaps() {
        let a = rectangle(Point::new(0.0, 0.0), Point::new(2.0, 2.0));
        let b = polygon(&[
            Point::new(2.5, 1.0),
            Point::new(1.5, 2.0),
            Point::new(0.5, 1.0),
            Point::new(1.5, 0.0),
        ]);
        assert!(overlaps(&a, &b));
        assert!(overlaps(&b, &a));
    }

    #[test]
    fn diamond_outside_corner_is_separated() {
        let a = rectangle(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        let b = polygon(&[
            Point::new(2.0, 1.5),
            Point::new(1.5, 2.0),
            Point::new(1.0, 1.5),
            Point::new(1.5, 1.0),
        ]);
        assert!(!overlaps(&a, &b));
    }

    #[test]
    fn bounds_cover_all_points() {
        let rect = bounds(&[Point::new(-1.0, 2.0), Point::new(3.0, -4.0)]).unwrap();
        assert_eq!((rect.width(), rect.height()), (4.0, 6.0));
        assert!(bounds(&Vec::<Point>::new()).is_none());
    }
}
