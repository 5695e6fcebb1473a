//! Area-to-point-count saturation curve.

/// Box area at which the curve reaches its full point budget, in m².
/// Roughly the footprint of a full-city-scale polygon.
pub const SATURATION_AREA_M2: f64 = 3.0e7;

/// Logarithmic curve mapping a polygon's box area to a sampling target.
/// Passes through (0, 0) and (`SATURATION_AREA_M2`, `max_points`): small
/// polygons get proportionally few points, huge ones saturate instead of
/// exploding the point count.
#[derive(Debug, Clone, Copy)]
pub struct DensityCurve {
    max_points: usize,
}

impl DensityCurve {
    pub fn new(max_points: usize) -> Self {
        Self { max_points }
    }

    pub fn target(&self, area_m2: f64) -> usize {
        if area_m2 <= 0.0 {
            return 0;
        }
        let scale = self.max_points as f64 / (SATURATION_AREA_M2 + 1.0).ln();
        (scale * (area_m2 + 1.0).ln()).round() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_area_yields_zero_points() {
        assert_eq!(DensityCurve::new(1000).target(0.0), 0);
        assert_eq!(DensityCurve::new(1000).target(-5.0), 0);
    }

    #[test]
    fn target_is_monotone_in_area() {
        let curve = DensityCurve::new(1000);
        let mut previous = 0;
        for area in [1.0, 100.0, 1e4, 1e5, 1e6, 1e7, 3e7, 1e8] {
            let target = curve.target(area);
            assert!(
                target >= previous,
                "target({area}) = {target} dropped below {previous}"
            );
            previous = target;
        }
    }

    #[test]
    fn saturation_area_hits_full_budget() {
        assert_eq!(DensityCurve::new(1000).target(SATURATION_AREA_M2), 1000);
        assert_eq!(DensityCurve::new(400).target(SATURATION_AREA_M2), 400);
    }
}
