/// Logging initialisation for embedding applications
use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};

pub const DEFAULT_FILTER: &str = "barsync=debug,info";

/// Install a global fmt subscriber filtered by `filter`.
///
/// `RUST_LOG` wins over `filter` when set. Fails if a subscriber is
/// already installed.
pub fn init_logging(filter: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .map_err(|e| EngineError::ConfigError(format!("Invalid log filter '{}': {}", filter, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .map_err(|e| EngineError::ConfigError(format!("Logging already initialized: {}", e)))
}

/// Initialise logging at the config's level for this crate
pub fn init_from_config(config: &EngineConfig) -> Result<()> {
    init_logging(&format!("barsync={},warn", config.log_level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        // Another test may have installed one already; either way the second call fails
        let _ = init_logging(DEFAULT_FILTER);
        assert!(init_logging(DEFAULT_FILTER).is_err());
    }
}
