//! Feature-to-points reduction: dispatches each raw feature through the
//! samplers its category's strategy calls for, and unions everything into a
//! flat weighted point list.

use rand::Rng;

use crate::category::{Category, Strategy};
use crate::density::DensityCurve;
use crate::feature::{FeatureSet, RawFeature};
use crate::geo::{GeoPoint, Polygon, WeightedPoint};
use crate::sampler::{self, HaloConfig, SampleReport, SpiralConfig};
use crate::source::StopDistance;

/// Interior point budget for a way's own geometry.
const WAY_POINT_BUDGET: usize = 1000;

/// Interior point budget for each relation member's geometry.
const MEMBER_POINT_BUDGET: usize = 400;

/// Distance at which a transit stop contributes exactly the category
/// intensity; closer stops are amplified in proportion.
const DISTANCE_REFERENCE_M: f64 = 10_000.0;

pub struct ReduceOutcome {
    pub points: Vec<WeightedPoint>,
    pub report: SampleReport,
}

/// Reduces a fetched feature set to weighted points. `intensity` is the
/// category's signed per-point value (scale × weight × polarity); tag
/// filtering happens here, before any expansion.
pub fn reduce_features<R: Rng>(
    category: Category,
    set: &FeatureSet,
    intensity: f64,
    rng: &mut R,
) -> ReduceOutcome {
    let mut report = SampleReport::default();
    let eligible: Vec<&RawFeature> = set
        .elements
        .iter()
        .filter(|feature| category.accepts(feature))
        .collect();

    let points = match category.strategy() {
        Strategy::Area { halo } => reduce_area(&eligible, intensity, halo, rng, &mut report),
        Strategy::Spiral(config) => reduce_spiral(&eligible, intensity, config),
        Strategy::Count => reduce_direct(&eligible, intensity),
        // Distance categories are fed by reduce_distances instead.
        Strategy::Distance => Vec::new(),
    };

    ReduceOutcome { points, report }
}

/// Area-style reduction. Every applicable shape of a feature is emitted and
/// unioned: the reduced center, the boundary vertices, the interior fill,
/// and the exterior halo at half magnitude. Relation members repeat the
/// vertex-plus-interior treatment with the smaller member budget and no
/// halo.
fn reduce_area<R: Rng>(
    features: &[&RawFeature],
    intensity: f64,
    halo: HaloConfig,
    rng: &mut R,
    report: &mut SampleReport,
) -> Vec<WeightedPoint> {
    let way_curve = DensityCurve::new(WAY_POINT_BUDGET);
    let member_curve = DensityCurve::new(MEMBER_POINT_BUDGET);
    let mut points = Vec::new();

    for feature in features {
        if let Some(center) = feature.center {
            points.push(WeightedPoint::new(center, intensity));
        }
        if let Some(polygon) = feature.polygon() {
            for vertex in polygon.vertices() {
                points.push(WeightedPoint::new(*vertex, intensity));
            }
            points.extend(sampler::sample_interior(
                &polygon, intensity, way_curve, rng, report,
            ));
            points.extend(sampler::sample_exterior(
                &polygon,
                halo,
                intensity / 2.0,
                rng,
            ));
        }
        if let Some(members) = &feature.members {
            for member in members {
                let Some(outline) = &member.geometry else {
                    continue;
                };
                let polygon = Polygon::new(outline.clone());
                for vertex in polygon.vertices() {
                    points.push(WeightedPoint::new(*vertex, intensity));
                }
                points.extend(sampler::sample_interior(
                    &polygon,
                    intensity,
                    member_curve,
                    rng,
                    report,
                ));
            }
        } else if let Some(bare) = feature.bare_point() {
            points.push(WeightedPoint::new(bare, intensity));
        }
    }
    points
}

/// Spiral reduction for point-like amenities: the anchor itself plus its
/// deterministic cluster, all at full intensity.
fn reduce_spiral(
    features: &[&RawFeature],
    intensity: f64,
    config: SpiralConfig,
) -> Vec<WeightedPoint> {
    let mut points = Vec::new();
    for feature in features {
        let Some(anchor) = feature.anchor() else {
            continue;
        };
        points.push(WeightedPoint::new(anchor, intensity));
        points.extend(
            sampler::expand_spiral(anchor, config)
                .into_iter()
                .map(|point| WeightedPoint::new(point, intensity)),
        );
    }
    points
}

/// One direct point per feature; features with neither center nor bare
/// coordinates contribute nothing.
fn reduce_direct(features: &[&RawFeature], intensity: f64) -> Vec<WeightedPoint> {
    features
        .iter()
        .filter_map(|feature| feature.anchor())
        .map(|anchor| WeightedPoint::new(anchor, intensity))
        .collect()
}

/// Distance-derived reduction for transit stops: intensity grows inversely
/// with the walking distance to the city center. Non-positive distances are
/// dropped rather than emitted as infinities.
pub fn reduce_distances(stops: &[StopDistance], intensity: f64) -> Vec<WeightedPoint> {
    stops
        .iter()
        .filter(|stop| stop.dist > 0.0)
        .map(|stop| {
            WeightedPoint::new(
                GeoPoint::new(stop.lat, stop.lon),
                intensity * DISTANCE_REFERENCE_M / stop.dist,
            )
        })
        .collect()
}
