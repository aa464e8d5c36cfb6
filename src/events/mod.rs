pub mod dispatcher;
pub mod types;

pub use dispatcher::{DispatchHandler, EventRecorder};
pub use types::{DispatchEvent, PriceType};
