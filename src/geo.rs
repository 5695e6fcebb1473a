//! Planar geometry over WGS84 coordinates.
//!
//! Coordinates are treated as locally planar: the crate targets sub-20km
//! city extents, where equirectangular distortion stays negligible.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters spanned by one degree of latitude.
pub const METERS_PER_DEGREE: f64 = 111_300.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Planar distance to another point, in meters.
    pub fn distance_m(&self, other: GeoPoint) -> f64 {
        let dy = (other.lat - self.lat) * METERS_PER_DEGREE;
        let dx = (other.lon - self.lon) * METERS_PER_DEGREE * self.lat.to_radians().cos();
        (dx * dx + dy * dy).sqrt()
    }

    /// Projects this point by `distance_m` meters along `bearing` radians,
    /// using the equirectangular approximation.
    pub fn project(&self, bearing: f64, distance_m: f64) -> GeoPoint {
        let offset_deg = (distance_m / EARTH_RADIUS_M).to_degrees();
        GeoPoint {
            lat: self.lat + offset_deg * bearing.sin(),
            lon: self.lon + offset_deg * bearing.cos() / self.lat.to_radians().cos(),
        }
    }
}

/// A point of the output density field: a location plus a signed intensity.
/// Negative intensity marks repulsive land uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedPoint {
    pub lat: f64,
    pub lon: f64,
    pub intensity: f64,
}

impl WeightedPoint {
    pub fn new(point: GeoPoint, intensity: f64) -> Self {
        Self {
            lat: point.lat,
            lon: point.lon,
            intensity,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// An ordered vertex ring, implicitly closed (last vertex connects back to
/// the first). Fewer than three vertices means no interior at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon(Vec<GeoPoint>);

impl Polygon {
    pub fn new(vertices: Vec<GeoPoint>) -> Self {
        Self(vertices)
    }

    pub fn vertices(&self) -> &[GeoPoint] {
        &self.0
    }

    pub fn is_degenerate(&self) -> bool {
        self.0.len() < 3
    }

    /// Even-odd ray casting. Walks every edge (i, j = i-1 wrapping) and
    /// toggles on crossings strictly between the edge's vertex latitudes,
    /// interpolating the crossing longitude linearly. Points exactly on the
    /// boundary may land on either side.
    pub fn contains(&self, point: GeoPoint) -> bool {
        let vertices = &self.0;
        if vertices.len() < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = vertices.len() - 1;
        for i in 0..vertices.len() {
            let (xi, yi) = (vertices[i].lon, vertices[i].lat);
            let (xj, yj) = (vertices[j].lon, vertices[j].lat);
            let crosses = (yi > point.lat) != (yj > point.lat)
                && point.lon < (xj - xi) * (point.lat - yi) / (yj - yi) + xi;
            if crosses {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::of(&self.0)
    }
}

/// Axis-aligned bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn of(points: &[GeoPoint]) -> Option<BoundingBox> {
        let first = points.first()?;
        let mut bounds = BoundingBox {
            min_lon: first.lon,
            min_lat: first.lat,
            max_lon: first.lon,
            max_lat: first.lat,
        };
        for point in &points[1..] {
            bounds.min_lon = bounds.min_lon.min(point.lon);
            bounds.min_lat = bounds.min_lat.min(point.lat);
            bounds.max_lon = bounds.max_lon.max(point.lon);
            bounds.max_lat = bounds.max_lat.max(point.lat);
        }
        Some(bounds)
    }

    /// Planar area of the box footprint in m². Serves as a cheap size proxy
    /// for the polygon it encloses; overestimates elongated shapes.
    pub fn area_m2(&self) -> f64 {
        let mid_lat = 0.5 * (self.min_lat + self.max_lat);
        let width_m = (self.max_lon - self.min_lon) * METERS_PER_DEGREE * mid_lat.to_radians().cos();
        let height_m = (self.max_lat - self.min_lat) * METERS_PER_DEGREE;
        width_m * height_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::new(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 10.0),
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(10.0, 0.0),
        ])
    }

    #[test]
    fn square_contains_center() {
        assert!(square().contains(GeoPoint::new(5.0, 5.0)));
    }

    #[test]
    fn square_excludes_far_point() {
        assert!(!square().contains(GeoPoint::new(15.0, 15.0)));
    }

    #[test]
    fn boundary_point_does_not_panic() {
        // On-edge classification is unspecified either way.
        let _ = square().contains(GeoPoint::new(5.0, 0.0));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        let line = Polygon::new(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)]);
        assert!(line.is_degenerate());
        assert!(!line.contains(GeoPoint::new(0.5, 0.5)));

        let empty = Polygon::new(Vec::new());
        assert!(!empty.contains(GeoPoint::new(0.0, 0.0)));
    }

    #[test]
    fn bounding_box_spans_vertices() {
        let bounds = square().bounding_box().unwrap();
        assert_eq!(bounds.min_lon, 0.0);
        assert_eq!(bounds.min_lat, 0.0);
        assert_eq!(bounds.max_lon, 10.0);
        assert_eq!(bounds.max_lat, 10.0);
        assert!(bounds.area_m2() > 0.0);
    }

    #[test]
    fn empty_polygon_has_no_bounding_box() {
        assert!(Polygon::new(Vec::new()).bounding_box().is_none());
    }

    #[test]
    fn projection_preserves_distance() {
        let origin = GeoPoint::new(56.85, 60.61);
        for (bearing, distance) in [(0.0, 100.0), (1.3, 250.0), (4.0, 499.0)] {
            let projected = origin.project(bearing, distance);
            let measured = origin.distance_m(projected);
            assert!(
                (measured - distance).abs() < distance * 0.01,
                "bearing {bearing}: expected ~{distance} m, measured {measured} m"
            );
        }
    }
}
