//! The pipeline engine: one asynchronous fetch-and-transform pipeline per
//! selected category, all appending into a shared accumulator.
//!
//! A recompute invalidates everything: the accumulator is cleared, the
//! generation counter bumped, and every selected category restarted.
//! Pipelines still in flight from an earlier generation are not cancelled;
//! their results are recognized as stale on arrival and dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::cache::{FeatureCache, MemoryCache};
use crate::category::{Category, Strategy, Weights};
use crate::feature::FeatureSet;
use crate::geo::WeightedPoint;
use crate::reduce;
use crate::rng;
use crate::source::{DistanceSource, FeatureQuery, FeatureSource, SourceError};

const EVENT_CHANNEL_CAPACITY: usize = 512;

pub struct EngineSettings {
    /// Administrative area name interpolated into upstream queries.
    pub area_name: String,
    pub cache_ttl_ms: i64,
    pub intensity_scale: f64,
    pub seed: u64,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    source: Arc<dyn FeatureSource>,
    cache: Arc<dyn FeatureCache>,
    distances: Option<Arc<dyn DistanceSource>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings, source: impl FeatureSource + 'static) -> Self {
        Self {
            settings,
            source: Arc::new(source),
            cache: Arc::new(MemoryCache::new()),
            distances: None,
        }
    }

    pub fn with_cache(mut self, cache: impl FeatureCache + 'static) -> Self {
        self.cache = Arc::new(cache);
        self
    }

    pub fn with_distances(mut self, distances: impl DistanceSource + 'static) -> Self {
        self.distances = Some(Arc::new(distances));
        self
    }

    pub fn build(self) -> Engine {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Engine {
            settings: self.settings,
            source: self.source,
            cache: self.cache,
            distances: self.distances,
            generation: Arc::new(AtomicU64::new(0)),
            accumulator: Arc::new(Mutex::new(Vec::new())),
            events,
        }
    }
}

pub struct Engine {
    settings: EngineSettings,
    source: Arc<dyn FeatureSource>,
    cache: Arc<dyn FeatureCache>,
    distances: Option<Arc<dyn DistanceSource>>,
    generation: Arc<AtomicU64>,
    accumulator: Arc<Mutex<Vec<WeightedPoint>>>,
    events: broadcast::Sender<PipelineEvent>,
}

impl Engine {
    /// Clears the output, opens a new generation, and spawns one pipeline
    /// per selected category. Weights are read here, once, per category.
    pub fn recompute(&self, selection: &[Category], weights: &Weights) -> Recompute {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.accumulator.lock().expect("accumulator lock").clear();

        let mut pipelines = Vec::with_capacity(selection.len());
        for &category in selection {
            let weight = weights.get(category);
            let intensity =
                self.settings.intensity_scale * f64::from(weight) * category.polarity();
            let ctx = PipelineContext {
                category,
                generation,
                intensity,
                area_name: self.settings.area_name.clone(),
                cache_ttl_ms: self.settings.cache_ttl_ms,
                rng: rng::stream_rng(self.settings.seed, category as u64, generation),
                latest_generation: Arc::clone(&self.generation),
                accumulator: Arc::clone(&self.accumulator),
                events: self.events.clone(),
                source: Arc::clone(&self.source),
                cache: Arc::clone(&self.cache),
                distances: self.distances.clone(),
            };
            pipelines.push(tokio::spawn(run_pipeline(ctx)));
        }
        Recompute {
            generation,
            pipelines,
        }
    }

    /// Snapshot of the accumulated output. Order across categories is
    /// unspecified; consumers treat it as an unordered multiset.
    pub fn points(&self) -> Vec<WeightedPoint> {
        self.accumulator.lock().expect("accumulator lock").clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

/// Handle for one recompute: its generation id plus the spawned pipelines.
pub struct Recompute {
    pub generation: u64,
    pipelines: Vec<JoinHandle<()>>,
}

impl Recompute {
    /// Waits for every pipeline of this recompute to settle, whichever way
    /// it settles.
    pub async fn wait(self) {
        for pipeline in self.pipelines {
            let _ = pipeline.await;
        }
    }
}

/// Per-category completion signal, for loading indicators and diagnostics.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Completed {
        category: Category,
        generation: u64,
        appended: usize,
    },
    /// The result arrived after a newer recompute started and was dropped.
    Discarded { category: Category, generation: u64 },
    Failed {
        category: Category,
        generation: u64,
        error: String,
    },
}

#[derive(Debug, Error)]
#[error("pipeline for '{category}' failed: {source}")]
pub struct PipelineError {
    pub category: Category,
    #[source]
    pub source: SourceError,
}

struct PipelineContext {
    category: Category,
    generation: u64,
    intensity: f64,
    area_name: String,
    cache_ttl_ms: i64,
    rng: ChaCha8Rng,
    latest_generation: Arc<AtomicU64>,
    accumulator: Arc<Mutex<Vec<WeightedPoint>>>,
    events: broadcast::Sender<PipelineEvent>,
    source: Arc<dyn FeatureSource>,
    cache: Arc<dyn FeatureCache>,
    distances: Option<Arc<dyn DistanceSource>>,
}

async fn run_pipeline(mut ctx: PipelineContext) {
    let event = match fetch_and_transform(&mut ctx).await {
        Ok(points) => {
            // Generation check and append stay under one lock so a
            // concurrent recompute cannot interleave between them.
            let mut accumulator = ctx.accumulator.lock().expect("accumulator lock");
            if ctx.latest_generation.load(Ordering::SeqCst) == ctx.generation {
                let appended = points.len();
                accumulator.extend(points);
                PipelineEvent::Completed {
                    category: ctx.category,
                    generation: ctx.generation,
                    appended,
                }
            } else {
                PipelineEvent::Discarded {
                    category: ctx.category,
                    generation: ctx.generation,
                }
            }
        }
        Err(source) => {
            let error = PipelineError {
                category: ctx.category,
                source,
            };
            PipelineEvent::Failed {
                category: ctx.category,
                generation: ctx.generation,
                error: error.to_string(),
            }
        }
    };
    // Send fails only when nobody is subscribed.
    let _ = ctx.events.send(event);
}

async fn fetch_and_transform(
    ctx: &mut PipelineContext,
) -> Result<Vec<WeightedPoint>, SourceError> {
    if let Strategy::Distance = ctx.category.strategy() {
        let Some(distances) = &ctx.distances else {
            return Err(SourceError::Unavailable(
                "no distance source configured".to_string(),
            ));
        };
        let stops = distances.fetch().await?;
        return Ok(reduce::reduce_distances(&stops, ctx.intensity));
    }

    let set = fetch_features(ctx).await?;
    let outcome = reduce::reduce_features(ctx.category, &set, ctx.intensity, &mut ctx.rng);
    Ok(outcome.points)
}

async fn fetch_features(ctx: &PipelineContext) -> Result<FeatureSet, SourceError> {
    let key = ctx.category.label();
    if let Some(cached) = ctx.cache.get(key) {
        return Ok(cached);
    }
    let query = FeatureQuery {
        category: ctx.category,
        text: ctx.category.query(&ctx.area_name),
    };
    let set = ctx.source.fetch(&query).await?;
    ctx.cache.put(key, set.clone(), ctx.cache_ttl_ms);
    Ok(set)
}
