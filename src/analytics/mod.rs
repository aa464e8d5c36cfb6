pub mod dollar_index;
pub mod min_max;
pub mod regression;
pub mod ring_buffer;
pub mod stats;

pub use dollar_index::{DollarIndex, DXY_COMPONENTS};
pub use min_max::MinMaxFilter;
pub use regression::{linear_regression, trend, LinearFit};
pub use ring_buffer::RingBuffer;
pub use stats::{kurtosis, laplace_integral, mean, skewness, variance};
