use std::path::PathBuf;

use heatfield::{
    category::Category,
    engine::{EngineBuilder, EngineSettings},
    profile::ProfileLoader,
    source::{DirectoryDistanceSource, DirectorySource},
};

fn profile_loader() -> ProfileLoader {
    ProfileLoader::new(env!("CARGO_MANIFEST_DIR"))
}

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

#[test]
fn shipped_profile_parses() {
    let profile = profile_loader()
        .load("profiles/ekaterinburg.yaml")
        .expect("profile parses");
    assert_eq!(profile.name, "ekaterinburg");
    assert_eq!(profile.seed, Some(42));
    assert_eq!(profile.categories.len(), 7);
    assert_eq!(profile.weights().get(Category::Parks), 4);
}

#[tokio::test]
async fn full_profile_runs_against_fixture_data() {
    let profile = profile_loader()
        .load("profiles/ekaterinburg.yaml")
        .expect("profile parses");
    let settings = EngineSettings {
        area_name: profile.area.clone(),
        cache_ttl_ms: profile.cache_ttl_ms,
        intensity_scale: profile.intensity_scale,
        seed: profile.seed.unwrap_or(0),
    };
    let engine = EngineBuilder::new(settings, DirectorySource::new(data_dir()))
        .with_distances(DirectoryDistanceSource::new(data_dir()))
        .build();

    let run = engine.recompute(&profile.selection(), &profile.weights());
    run.wait().await;

    let points = engine.points();
    assert!(!points.is_empty());
    // Fixture data covers both polarities.
    assert!(points.iter().any(|p| p.intensity > 0.0));
    assert!(points.iter().any(|p| p.intensity < 0.0));
}
