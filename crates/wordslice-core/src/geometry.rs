//! Polygon annotations and bounding-box arithmetic.
//!
//! Annotation coordinates live in page space and may be fractional; the
//! raster operations downstream need integer pixel boxes. The conversion is
//! kept explicit here: outward rounding into a half-open box, clipping to
//! the page extents, and translation of polygon coordinates into the local
//! frame of a crop.

use crate::error::GeometryError;

/// A 2-D point in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A closed polygon marking one word's extent on a page.
///
/// The vertex sequence is implicitly closed (the last vertex connects back
/// to the first); it need not be convex, axis-aligned, or simple.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Build a polygon from its vertices.
    ///
    /// Requires at least three vertices with finite coordinates.
    pub fn new(points: Vec<Point>) -> Result<Self, GeometryError> {
        if points.len() < 3 {
            return Err(GeometryError::TooFewVertices(points.len()));
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(GeometryError::NonFiniteCoordinate);
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The tight axis-aligned enclosure of the vertices, rounded outward
    /// to integer pixel bounds (half-open on the max side).
    pub fn bounding_box(&self) -> BoundingBox {
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;

        for p in &self.points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        BoundingBox {
            x_min: min_x.floor() as i64,
            x_max: max_x.ceil() as i64,
            y_min: min_y.floor() as i64,
            y_max: max_y.ceil() as i64,
        }
    }

    /// Shift every vertex by `(dx, dy)`.
    pub fn translated(&self, dx: f32, dy: f32) -> Polygon {
        Polygon {
            points: self
                .points
                .iter()
                .map(|p| Point::new(p.x + dx, p.y + dy))
                .collect(),
        }
    }
}

/// An axis-aligned integer pixel box, half-open on the max side:
/// `x_min <= x < x_max`, `y_min <= y < y_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x_min: i64,
    pub x_max: i64,
    pub y_min: i64,
    pub y_max: i64,
}

impl BoundingBox {
    pub fn width(&self) -> i64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> i64 {
        self.y_max - self.y_min
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Clamp the box to the valid index range of a `width x height` image.
    /// The result may be empty if the box lies entirely outside the image.
    pub fn clip(&self, width: u32, height: u32) -> BoundingBox {
        BoundingBox {
            x_min: self.x_min.clamp(0, width as i64),
            x_max: self.x_max.clamp(0, width as i64),
            y_min: self.y_min.clamp(0, height as i64),
            y_max: self.y_max.clamp(0, height as i64),
        }
    }

    /// Whether a page-space point falls inside the (half-open) box.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x_min as f32
            && p.x <= self.x_max as f32
            && p.y >= self.y_min as f32
            && p.y <= self.y_max as f32
    }
}

/// Re-express a polygon in the local coordinate frame of a crop whose
/// top-left corner sits at `(bounds.x_min, bounds.y_min)` in page space.
pub fn to_crop_local(polygon: &Polygon, bounds: &BoundingBox) -> Polygon {
    polygon.translated(-(bounds.x_min as f32), -(bounds.y_min as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rect_polygon() -> Polygon {
        Polygon::new(vec![
            Point::new(10.3, 5.7),
            Point::new(30.9, 5.7),
            Point::new(30.9, 15.2),
            Point::new(10.3, 15.2),
        ])
        .unwrap()
    }

    #[test]
    fn bounding_box_rounds_outward() {
        let bbox = rect_polygon().bounding_box();
        assert_eq!(
            bbox,
            BoundingBox {
                x_min: 10,
                x_max: 31,
                y_min: 5,
                y_max: 16,
            }
        );
    }

    #[test]
    fn bounding_box_contains_every_vertex() {
        let poly = rect_polygon();
        let bbox = poly.bounding_box();
        for &p in poly.points() {
            assert!(bbox.contains(p), "vertex {:?} outside {:?}", p, bbox);
        }
    }

    #[test]
    fn clip_clamps_to_image_extents() {
        let poly = Polygon::new(vec![
            Point::new(-20.0, -10.0),
            Point::new(50.0, -10.0),
            Point::new(50.0, 80.0),
        ])
        .unwrap();
        let bbox = poly.bounding_box().clip(40, 60);
        assert_eq!(
            bbox,
            BoundingBox {
                x_min: 0,
                x_max: 40,
                y_min: 0,
                y_max: 60,
            }
        );
    }

    #[test]
    fn clip_fully_outside_is_empty() {
        let poly = Polygon::new(vec![
            Point::new(100.0, 100.0),
            Point::new(120.0, 100.0),
            Point::new(120.0, 130.0),
        ])
        .unwrap();
        let bbox = poly.bounding_box().clip(50, 50);
        assert!(bbox.is_empty());
    }

    #[test]
    fn collapsed_polygon_has_empty_box() {
        let poly = Polygon::new(vec![
            Point::new(7.0, 7.0),
            Point::new(7.0, 7.0),
            Point::new(7.0, 7.0),
        ])
        .unwrap();
        assert!(poly.bounding_box().is_empty());
    }

    #[test]
    fn too_few_vertices_rejected() {
        let err = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        assert!(matches!(err, Err(GeometryError::TooFewVertices(2))));
    }

    #[test]
    fn non_finite_coordinate_rejected() {
        let err = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(f32::NAN, 1.0),
            Point::new(1.0, 0.0),
        ]);
        assert!(matches!(err, Err(GeometryError::NonFiniteCoordinate)));
    }

    #[test]
    fn crop_local_translation() {
        let poly = rect_polygon();
        let bbox = poly.bounding_box();
        let local = to_crop_local(&poly, &bbox);
        let first = local.points()[0];
        assert!((first.x - 0.3).abs() < 1e-5);
        assert!((first.y - 0.7).abs() < 1e-5);
    }
}
