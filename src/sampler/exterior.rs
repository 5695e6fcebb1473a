use std::f64::consts::TAU;

use rand::Rng;

use crate::geo::{Polygon, WeightedPoint};

// Matches the interior sampler's escape hatch: a vertex buried in a pocket
// where almost every candidate lands inside must not loop forever.
const MAX_ATTEMPTS_PER_POINT: usize = 1_000;

/// Halo ring parameters: how many points to scatter around each vertex and
/// how far from it they may land.
#[derive(Debug, Clone, Copy)]
pub struct HaloConfig {
    pub per_vertex: usize,
    pub min_distance_m: f64,
    pub max_distance_m: f64,
}

impl Default for HaloConfig {
    fn default() -> Self {
        Self {
            per_vertex: 50,
            min_distance_m: 50.0,
            max_distance_m: 500.0,
        }
    }
}

/// Scatters random points near every polygon vertex, keeping only those the
/// containment test reports outside. Produces the "halo" ring around a
/// polygon, distinct from its interior fill.
pub fn sample_exterior<R: Rng>(
    polygon: &Polygon,
    config: HaloConfig,
    intensity: f64,
    rng: &mut R,
) -> Vec<WeightedPoint> {
    if polygon.is_degenerate() {
        return Vec::new();
    }
    let mut points = Vec::with_capacity(polygon.vertices().len() * config.per_vertex);
    let attempt_budget = config.per_vertex.saturating_mul(MAX_ATTEMPTS_PER_POINT);
    for vertex in polygon.vertices() {
        let mut accepted = 0;
        let mut attempts = 0;
        while accepted < config.per_vertex && attempts < attempt_budget {
            attempts += 1;
            let bearing = rng.gen_range(0.0..TAU);
            let distance = rng.gen_range(config.min_distance_m..=config.max_distance_m);
            let candidate = vertex.project(bearing, distance);
            if !polygon.contains(candidate) {
                points.push(WeightedPoint::new(candidate, intensity));
                accepted += 1;
            }
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::geo::GeoPoint;

    #[test]
    fn degenerate_polygon_yields_no_halo() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let line = Polygon::new(vec![GeoPoint::new(56.85, 60.61), GeoPoint::new(56.86, 60.62)]);
        let config = HaloConfig {
            per_vertex: 5,
            ..HaloConfig::default()
        };
        assert!(sample_exterior(&line, config, 0.05, &mut rng).is_empty());
    }
}
