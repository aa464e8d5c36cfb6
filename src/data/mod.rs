pub mod bucket_queue;
pub mod bar_series;
pub mod aligner;

pub use bucket_queue::{BucketQueue, Bucketed, Placement};
pub use bar_series::{BucketedSeries, SeriesMode};
pub use aligner::{ConcurrentAligner, MultiSymbolAligner};
