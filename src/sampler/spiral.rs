use crate::geo::{GeoPoint, METERS_PER_DEGREE};

/// Angle increment per spiral step, in radians.
const ANGLE_STEP: f64 = 0.1;

/// Archimedean pitch: meters of radius gained per radian of angle.
const PITCH_M: f64 = 10.0;

#[derive(Debug, Clone, Copy)]
pub struct SpiralConfig {
    pub max_points: usize,
    pub max_radius_m: f64,
}

/// Expands a single point into a deterministic Archimedean-spiral cluster.
/// The walk ends at whichever bound hits first: `max_points` steps or the
/// step whose radius exceeds `max_radius_m`.
pub fn expand_spiral(center: GeoPoint, config: SpiralConfig) -> Vec<GeoPoint> {
    let mut points = Vec::new();
    for step in 0..config.max_points {
        let angle = ANGLE_STEP * step as f64;
        let radius_m = PITCH_M * angle;
        if radius_m > config.max_radius_m {
            break;
        }
        let radius_deg = radius_m / METERS_PER_DEGREE;
        points.push(GeoPoint::new(
            center.lat + radius_deg * angle.cos(),
            center.lon + radius_deg * angle.sin(),
        ));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expansion_is_deterministic() {
        let center = GeoPoint::new(56.85, 60.61);
        let config = SpiralConfig {
            max_points: 300,
            max_radius_m: 800.0,
        };
        assert_eq!(expand_spiral(center, config), expand_spiral(center, config));
    }

    #[test]
    fn radius_cutoff_bounds_the_walk() {
        // Radius grows by one meter per step, so the cutoff at 50 m admits
        // steps 0..=50.
        let config = SpiralConfig {
            max_points: 10_000,
            max_radius_m: 50.0,
        };
        let points = expand_spiral(GeoPoint::new(56.85, 60.61), config);
        assert_eq!(points.len(), 51);
    }

    #[test]
    fn point_cap_bounds_the_walk() {
        let config = SpiralConfig {
            max_points: 300,
            max_radius_m: 800.0,
        };
        let points = expand_spiral(GeoPoint::new(56.85, 60.61), config);
        assert_eq!(points.len(), 300);
    }
}
