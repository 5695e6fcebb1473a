//! Decoding of the upstream feature documents.
//!
//! The query service answers with `{"elements": [...]}` where each element
//! is a node, way, or relation. A single element may carry several shapes at
//! once (a center and a geometry, say); the reducer processes every shape it
//! finds, so decoding keeps them all as optionals instead of forcing one
//! variant.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geo::{GeoPoint, Polygon};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureSet {
    #[serde(default)]
    pub elements: Vec<RawFeature>,
}

impl FeatureSet {
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFeature {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Vec<GeoPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<RelationMember>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
}

/// A relation member; only its optional outline matters here, the rest of
/// the member record is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationMember {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Vec<GeoPoint>>,
}

impl RawFeature {
    /// A bare node at `point`, as the spiral expander emits them.
    pub fn node(point: GeoPoint) -> Self {
        Self {
            element_type: Some("node".to_string()),
            lat: Some(point.lat),
            lon: Some(point.lon),
            ..Self::default()
        }
    }

    /// Representative point: the reduced center when the upstream computed
    /// one, otherwise the element's own coordinates.
    pub fn anchor(&self) -> Option<GeoPoint> {
        if let Some(center) = self.center {
            return Some(center);
        }
        self.bare_point()
    }

    /// The element's own lat/lon pair, ignoring any center.
    pub fn bare_point(&self) -> Option<GeoPoint> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }

    pub fn polygon(&self) -> Option<Polygon> {
        self.geometry
            .as_ref()
            .map(|outline| Polygon::new(outline.clone()))
    }

    pub fn name(&self) -> Option<&str> {
        self.tags.as_ref()?.get("name").map(String::as_str)
    }

    pub fn has_tags(&self) -> bool {
        self.tags.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "version": 0.6,
        "elements": [
            {"type": "node", "id": 1, "lat": 56.85, "lon": 60.61,
             "tags": {"amenity": "school", "name": "Гимназия №9"}},
            {"type": "way", "id": 2,
             "center": {"lat": 56.83, "lon": 60.59},
             "geometry": [{"lat": 56.82, "lon": 60.58}, {"lat": 56.84, "lon": 60.58},
                          {"lat": 56.84, "lon": 60.60}],
             "tags": {"leisure": "park"}},
            {"type": "relation", "id": 3,
             "members": [{"type": "way", "role": "outer",
                          "geometry": [{"lat": 56.80, "lon": 60.55}]}],
             "tags": {"landuse": "industrial"}}
        ]
    }"#;

    #[test]
    fn decodes_mixed_elements() {
        let set = FeatureSet::from_json(SAMPLE).unwrap();
        assert_eq!(set.elements.len(), 3);

        let node = &set.elements[0];
        assert_eq!(node.anchor(), Some(GeoPoint::new(56.85, 60.61)));
        assert_eq!(node.name(), Some("Гимназия №9"));

        let way = &set.elements[1];
        assert_eq!(way.anchor(), Some(GeoPoint::new(56.83, 60.59)));
        assert!(way.bare_point().is_none());
        assert_eq!(way.polygon().unwrap().vertices().len(), 3);

        let relation = &set.elements[2];
        let members = relation.members.as_ref().unwrap();
        assert_eq!(members.len(), 1);
        assert!(members[0].geometry.is_some());
    }

    #[test]
    fn center_takes_precedence_over_bare_coordinates() {
        let feature = RawFeature {
            lat: Some(1.0),
            lon: Some(2.0),
            center: Some(GeoPoint::new(3.0, 4.0)),
            ..RawFeature::default()
        };
        assert_eq!(feature.anchor(), Some(GeoPoint::new(3.0, 4.0)));
        assert_eq!(feature.bare_point(), Some(GeoPoint::new(1.0, 2.0)));
    }

    #[test]
    fn empty_document_decodes_to_empty_set() {
        let set = FeatureSet::from_json("{}").unwrap();
        assert!(set.elements.is_empty());
    }
}
