//! The amenity categories: polarity, generation strategy, tag predicates,
//! upstream query text, and user-assigned weights.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::feature::RawFeature;
use crate::sampler::{HaloConfig, SpiralConfig};

/// Global multiplier applied to every category weight.
pub const INTENSITY_SCALE: f64 = 0.05;

/// Marker character municipal facility names carry in the source data.
pub const MUNICIPAL_MARKER: char = '№';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Parks,
    Schools,
    Health,
    Eat,
    Industrial,
    Kindergarten,
    TransportSteps,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Parks,
        Category::Schools,
        Category::Health,
        Category::Eat,
        Category::Industrial,
        Category::Kindergarten,
        Category::TransportSteps,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Parks => "parks",
            Category::Schools => "schools",
            Category::Health => "health",
            Category::Eat => "eat",
            Category::Industrial => "industrial",
            Category::Kindergarten => "kindergarten",
            Category::TransportSteps => "transport_steps",
        }
    }

    /// Sign of the emitted intensity: industrial land repels, everything
    /// else attracts.
    pub fn polarity(self) -> f64 {
        match self {
            Category::Industrial => -1.0,
            _ => 1.0,
        }
    }

    pub fn strategy(self) -> Strategy {
        match self {
            Category::Parks | Category::Industrial => Strategy::Area {
                halo: HaloConfig::default(),
            },
            Category::Schools => Strategy::Spiral(SpiralConfig {
                max_points: 300,
                max_radius_m: 800.0,
            }),
            Category::Kindergarten => Strategy::Spiral(SpiralConfig {
                max_points: 200,
                max_radius_m: 400.0,
            }),
            Category::Eat | Category::Health => Strategy::Count,
            Category::TransportSteps => Strategy::Distance,
        }
    }

    /// Tag predicate a feature must pass before any expansion. Schools and
    /// clinics are narrowed to municipal facilities by the `№` name marker.
    pub fn accepts(self, feature: &RawFeature) -> bool {
        match self {
            Category::Schools | Category::Health => feature
                .name()
                .map_or(false, |name| name.contains(MUNICIPAL_MARKER)),
            Category::Eat | Category::Kindergarten => feature.name().is_some(),
            Category::Parks | Category::Industrial | Category::TransportSteps => {
                feature.has_tags()
            }
        }
    }

    /// Overpass QL text requesting this category's features inside the named
    /// administrative area.
    pub fn query(self, area_name: &str) -> String {
        let (selectors, output): (&[&str], &str) = match self {
            Category::Parks => (
                &[
                    r#"node["leisure"="park"]"#,
                    r#"way["leisure"="park"]"#,
                    r#"relation["leisure"="park"]"#,
                    r#"node["leisure"="nature_reserve"]"#,
                    r#"way["leisure"="nature_reserve"]"#,
                    r#"relation["leisure"="nature_reserve"]"#,
                    r#"way["highway"="pedestrian"]"#,
                    r#"way["area"="yes"]["highway"="pedestrian"]"#,
                ],
                "geom",
            ),
            Category::Schools => (
                &[
                    r#"node["amenity"="school"]"#,
                    r#"way["amenity"="school"]"#,
                    r#"relation["amenity"="school"]"#,
                ],
                "center",
            ),
            Category::Health => (
                &[
                    r#"node["amenity"="clinic"]["name"~"№"]"#,
                    r#"node["amenity"="hospital"]["name"~"№"]"#,
                    r#"way["amenity"="clinic"]["name"~"№"]"#,
                    r#"way["amenity"="hospital"]["name"~"№"]"#,
                    r#"relation["amenity"="clinic"]["name"~"№"]"#,
                    r#"relation["amenity"="hospital"]["name"~"№"]"#,
                ],
                "center",
            ),
            Category::Eat => (
                &[
                    r#"node["amenity"="cafe"]"#,
                    r#"node["amenity"="restaurant"]"#,
                    r#"node["amenity"="fast_food"]"#,
                    r#"way["amenity"="cafe"]"#,
                    r#"way["amenity"="restaurant"]"#,
                    r#"way["amenity"="fast_food"]"#,
                    r#"relation["amenity"="cafe"]"#,
                    r#"relation["amenity"="restaurant"]"#,
                    r#"relation["amenity"="fast_food"]"#,
                ],
                "center",
            ),
            Category::Industrial => (
                &[
                    r#"node["landuse"="industrial"]"#,
                    r#"way["landuse"="industrial"]"#,
                    r#"relation["landuse"="industrial"]"#,
                    r#"node["landuse"="brownfield"]"#,
                    r#"way["landuse"="brownfield"]"#,
                    r#"relation["landuse"="brownfield"]"#,
                    r#"node["landuse"="landfill"]"#,
                    r#"way["landuse"="landfill"]"#,
                    r#"relation["landuse"="landfill"]"#,
                    r#"node["landuse"="quarry"]"#,
                    r#"way["landuse"="quarry"]"#,
                    r#"relation["landuse"="quarry"]"#,
                ],
                "geom",
            ),
            Category::Kindergarten => (
                &[
                    r#"node["amenity"="kindergarten"]["name"~"№"]"#,
                    r#"way["amenity"="kindergarten"]["name"~"№"]"#,
                    r#"relation["amenity"="kindergarten"]["name"~"№"]"#,
                ],
                "center",
            ),
            Category::TransportSteps => (
                &[
                    r#"node["public_transport"="stop_position"]["bench"!="yes"]"#,
                    r#"node["railway"="tram_stop"]["bench"!="yes"]"#,
                ],
                "center",
            ),
        };

        let mut query = String::from("[out:json];\n");
        query.push_str(&format!("area[name=\"{area_name}\"]->.searchArea;\n(\n"));
        for selector in selectors {
            query.push_str(&format!("  {selector}(area.searchArea);\n"));
        }
        query.push_str(&format!(");\nout {output};\n"));
        query
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// User-assigned category weights, clamped into [1, 10]. Unlisted
/// categories default to 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Weights(HashMap<Category, u8>);

impl Weights {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, category: Category, weight: u8) {
        self.0
            .insert(category, weight.clamp(Self::MIN, Self::MAX));
    }

    pub fn get(&self, category: Category) -> u8 {
        self.0.get(&category).copied().unwrap_or(Self::MIN)
    }
}

/// Generation strategy attached to each category.
#[derive(Debug, Clone, Copy)]
pub enum Strategy {
    /// Polygon sampling with an exterior halo at half intensity magnitude.
    Area { halo: HaloConfig },
    /// Deterministic spiral cluster around each point feature.
    Spiral(SpiralConfig),
    /// One direct point per feature.
    Count,
    /// Intensity derived from an external walking-distance service.
    Distance,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::RawFeature;
    use std::collections::HashMap;

    fn named(name: &str) -> RawFeature {
        RawFeature {
            tags: Some(HashMap::from([("name".to_string(), name.to_string())])),
            ..RawFeature::default()
        }
    }

    #[test]
    fn municipal_marker_gates_schools_and_health() {
        let municipal = named("Школа №112");
        let private = named("Академия роста");
        for category in [Category::Schools, Category::Health] {
            assert!(category.accepts(&municipal));
            assert!(!category.accepts(&private));
        }
    }

    #[test]
    fn eat_requires_a_name_parks_only_tags() {
        let unnamed = RawFeature {
            tags: Some(HashMap::new()),
            ..RawFeature::default()
        };
        let untagged = RawFeature::default();
        assert!(!Category::Eat.accepts(&unnamed));
        assert!(Category::Parks.accepts(&unnamed));
        assert!(!Category::Parks.accepts(&untagged));
    }

    #[test]
    fn industrial_is_the_only_repulsive_category() {
        for category in Category::ALL {
            let expected = if category == Category::Industrial {
                -1.0
            } else {
                1.0
            };
            assert_eq!(category.polarity(), expected);
        }
    }

    #[test]
    fn query_embeds_the_area_name() {
        let query = Category::Parks.query("Екатеринбург");
        assert!(query.starts_with("[out:json];"));
        assert!(query.contains(r#"area[name="Екатеринбург"]->.searchArea;"#));
        assert!(query.contains(r#"way["leisure"="park"](area.searchArea);"#));
        assert!(query.trim_end().ends_with("out geom;"));
    }

    #[test]
    fn labels_round_trip_through_serde() {
        for category in Category::ALL {
            let encoded = serde_json::to_string(&category).unwrap();
            assert_eq!(encoded, format!("\"{}\"", category.label()));
            let decoded: Category = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, category);
        }
    }

    #[test]
    fn weights_clamp_into_range() {
        let mut weights = Weights::new();
        weights.set(Category::Parks, 0);
        weights.set(Category::Schools, 15);
        assert_eq!(weights.get(Category::Parks), 1);
        assert_eq!(weights.get(Category::Schools), 10);
        assert_eq!(weights.get(Category::Eat), 1);
    }
}
