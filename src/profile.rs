//! Run profiles: which categories to compute, their weights, and the engine
//! knobs, loaded from YAML.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::category::{Category, Weights, INTENSITY_SCALE};

fn default_cache_ttl_ms() -> i64 {
    120_000
}

fn default_intensity_scale() -> f64 {
    INTENSITY_SCALE
}

fn default_weight() -> u8 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub name: String,
    /// Administrative area name the upstream queries search within.
    pub area: String,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: i64,
    #[serde(default = "default_intensity_scale")]
    pub intensity_scale: f64,
    pub categories: Vec<CategorySelection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategorySelection {
    pub name: Category,
    #[serde(default = "default_weight")]
    pub weight: u8,
}

impl Profile {
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            bail!("profile '{}' selects no categories", self.name);
        }
        let mut seen = Vec::new();
        for selection in &self.categories {
            if seen.contains(&selection.name) {
                bail!(
                    "profile '{}' selects '{}' more than once",
                    self.name,
                    selection.name
                );
            }
            seen.push(selection.name);
            if !(Weights::MIN..=Weights::MAX).contains(&selection.weight) {
                bail!(
                    "weight {} for '{}' is outside [{}, {}]",
                    selection.weight,
                    selection.name,
                    Weights::MIN,
                    Weights::MAX
                );
            }
        }
        Ok(())
    }

    pub fn selection(&self) -> Vec<Category> {
        self.categories.iter().map(|s| s.name).collect()
    }

    pub fn weights(&self) -> Weights {
        let mut weights = Weights::new();
        for selection in &self.categories {
            weights.set(selection.name, selection.weight);
        }
        weights
    }
}

pub struct ProfileLoader {
    base_dir: PathBuf,
}

impl ProfileLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Profile> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read profile file {}", path.display()))?;
        let profile: Profile = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        profile.validate()?;
        Ok(profile)
    }
}
