//! Upstream data interfaces: the feature query service and the walking
//! distance service, plus the fixture-backed implementations the runner and
//! tests use. A real HTTP transport implements the same traits outside this
//! crate.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::category::Category;
use crate::feature::FeatureSet;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("feature source unavailable: {0}")]
    Unavailable(String),
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A category fetch request: the category plus the query text sent upstream.
#[derive(Debug, Clone)]
pub struct FeatureQuery {
    pub category: Category,
    pub text: String,
}

pub type FetchFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

pub trait FeatureSource: Send + Sync {
    fn fetch(&self, query: &FeatureQuery) -> FetchFuture<'_, FeatureSet>;
}

pub trait DistanceSource: Send + Sync {
    fn fetch(&self) -> FetchFuture<'_, Vec<StopDistance>>;
}

/// One transit stop with its walking distance to the city center. The
/// distance service encodes numbers as strings, so decoding is lenient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopDistance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub lon: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub dist: f64,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text.trim().parse().map_err(de::Error::custom),
    }
}

/// Feature source reading one JSON document per category from a directory
/// (`<root>/<category>.json`).
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl FeatureSource for DirectorySource {
    fn fetch(&self, query: &FeatureQuery) -> FetchFuture<'_, FeatureSet> {
        let path = self.root.join(format!("{}.json", query.category.label()));
        Box::pin(async move {
            let data = tokio::fs::read_to_string(&path)
                .await
                .map_err(|err| SourceError::Unavailable(format!("{}: {err}", path.display())))?;
            let set = FeatureSet::from_json(&data)?;
            Ok(set)
        })
    }
}

/// Distance source reading `<root>/distances.json`.
pub struct DirectoryDistanceSource {
    root: PathBuf,
}

impl DirectoryDistanceSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl DistanceSource for DirectoryDistanceSource {
    fn fetch(&self) -> FetchFuture<'_, Vec<StopDistance>> {
        let path = self.root.join("distances.json");
        Box::pin(async move {
            let data = tokio::fs::read_to_string(&path)
                .await
                .map_err(|err| SourceError::Unavailable(format!("{}: {err}", path.display())))?;
            let stops: Vec<StopDistance> = serde_json::from_str(&data)?;
            Ok(stops)
        })
    }
}

/// In-memory feature source; categories without a dataset fail the way a
/// dead upstream would.
#[derive(Default)]
pub struct StaticSource {
    sets: HashMap<Category, FeatureSet>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: Category, set: FeatureSet) -> Self {
        self.sets.insert(category, set);
        self
    }
}

impl FeatureSource for StaticSource {
    fn fetch(&self, query: &FeatureQuery) -> FetchFuture<'_, FeatureSet> {
        let result = self
            .sets
            .get(&query.category)
            .cloned()
            .ok_or_else(|| {
                SourceError::Unavailable(format!("no dataset for '{}'", query.category))
            });
        Box::pin(async move { result })
    }
}

/// In-memory distance source.
#[derive(Default)]
pub struct StaticDistanceSource {
    stops: Vec<StopDistance>,
}

impl StaticDistanceSource {
    pub fn new(stops: Vec<StopDistance>) -> Self {
        Self { stops }
    }
}

impl DistanceSource for StaticDistanceSource {
    fn fetch(&self) -> FetchFuture<'_, Vec<StopDistance>> {
        let stops = self.stops.clone();
        Box::pin(async move { Ok(stops) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_distances_decode_from_string_fields() {
        let data = r#"[{"id": "63f", "lon": "60.61", "lat": "56.85", "dist": "1250.5"},
                       {"lat": 56.9, "lon": 60.7, "dist": 300}]"#;
        let stops: Vec<StopDistance> = serde_json::from_str(data).unwrap();
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].lat, 56.85);
        assert_eq!(stops[0].dist, 1250.5);
        assert_eq!(stops[1].dist, 300.0);
    }

    #[test]
    fn garbage_distance_fields_are_rejected() {
        let data = r#"[{"lat": "north", "lon": "60.61", "dist": "10"}]"#;
        assert!(serde_json::from_str::<Vec<StopDistance>>(data).is_err());
    }
}
