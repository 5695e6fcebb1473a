use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use heatfield::{
    engine::{EngineBuilder, EngineSettings, PipelineEvent},
    profile::ProfileLoader,
    source::{DirectoryDistanceSource, DirectorySource},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Amenity density field generator")]
struct Cli {
    /// Path to the run profile YAML file
    #[arg(long, default_value = "profiles/ekaterinburg.yaml")]
    profile: PathBuf,

    /// Directory holding one feature JSON document per category
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Where to write the weighted points (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Override the profile RNG seed
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ProfileLoader::new(".");
    let profile = loader.load(&cli.profile)?;
    let seed = cli.seed.or(profile.seed).unwrap_or_else(rand::random);

    let settings = EngineSettings {
        area_name: profile.area.clone(),
        cache_ttl_ms: profile.cache_ttl_ms,
        intensity_scale: profile.intensity_scale,
        seed,
    };
    let engine = EngineBuilder::new(settings, DirectorySource::new(&cli.data_dir))
        .with_distances(DirectoryDistanceSource::new(&cli.data_dir))
        .build();

    let selection = profile.selection();
    let mut events = BroadcastStream::new(engine.subscribe());
    let run = engine.recompute(&selection, &profile.weights());
    run.wait().await;

    // Every pipeline sends exactly one event; they are all buffered by now.
    let mut settled = 0;
    while settled < selection.len() {
        match events.next().await {
            Some(Ok(PipelineEvent::Completed {
                category, appended, ..
            })) => {
                println!("[{category}] {appended} points");
                settled += 1;
            }
            Some(Ok(PipelineEvent::Failed {
                category, error, ..
            })) => {
                eprintln!("[{category}] failed: {error}");
                settled += 1;
            }
            Some(Ok(PipelineEvent::Discarded { category, .. })) => {
                eprintln!("[{category}] stale result discarded");
                settled += 1;
            }
            Some(Err(_)) | None => break,
        }
    }

    let points = engine.points();
    let json = serde_json::to_string_pretty(&points)?;
    match &cli.output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Failed to write output to {}", path.display()))?,
        None => println!("{json}"),
    }
    println!(
        "Profile '{}' produced {} weighted points.",
        profile.name,
        points.len()
    );
    Ok(())
}
