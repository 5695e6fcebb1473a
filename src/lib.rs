pub mod cache;
pub mod category;
pub mod density;
pub mod engine;
pub mod feature;
pub mod geo;
pub mod profile;
pub mod reduce;
pub mod rng;
pub mod sampler;
pub mod source;

pub use category::{Category, Weights, INTENSITY_SCALE};
pub use engine::{Engine, EngineBuilder, EngineSettings, PipelineEvent};
pub use geo::{GeoPoint, Polygon, WeightedPoint};
