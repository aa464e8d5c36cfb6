pub mod types;
pub mod error;
pub mod time;
pub mod events;
pub mod data;
pub mod analytics;
pub mod config;
pub mod telemetry;

pub use types::*;
pub use error::{EngineError, Result};
pub use config::EngineConfig;
pub use data::{BucketedSeries, ConcurrentAligner, MultiSymbolAligner, SeriesMode};
pub use events::{DispatchEvent, DispatchHandler, EventRecorder, PriceType};
