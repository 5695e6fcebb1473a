use rand::Rng;

use crate::density::DensityCurve;
use crate::geo::{GeoPoint, Polygon, WeightedPoint};
use crate::sampler::SampleReport;

// Rejection sampling stops making progress when the interior is a vanishing
// fraction of the bounding box; the attempt ceiling keeps such polygons from
// spinning forever.
const MAX_ATTEMPTS_PER_POINT: usize = 1_000;

/// Rejection-samples uniform random points inside `polygon`. The target
/// count comes from `curve` applied to the bounding-box area; degenerate or
/// zero-area polygons produce no points.
pub fn sample_interior<R: Rng>(
    polygon: &Polygon,
    intensity: f64,
    curve: DensityCurve,
    rng: &mut R,
    report: &mut SampleReport,
) -> Vec<WeightedPoint> {
    let Some(bounds) = polygon.bounding_box() else {
        return Vec::new();
    };
    let area_m2 = bounds.area_m2();
    let target = curve.target(area_m2);
    report.record(bounds, area_m2, target);
    if polygon.is_degenerate() || area_m2 <= 0.0 || target == 0 {
        return Vec::new();
    }

    let mut points = Vec::with_capacity(target);
    let attempt_budget = target.saturating_mul(MAX_ATTEMPTS_PER_POINT);
    let mut attempts = 0;
    while points.len() < target && attempts < attempt_budget {
        attempts += 1;
        let lon = rng.gen_range(bounds.min_lon..=bounds.max_lon);
        let lat = rng.gen_range(bounds.min_lat..=bounds.max_lat);
        let candidate = GeoPoint::new(lat, lon);
        if polygon.contains(candidate) {
            points.push(WeightedPoint::new(candidate, intensity));
        }
    }
    points
}
