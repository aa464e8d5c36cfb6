/// Centralized error types for the alignment engine
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    // Input Errors
    #[error("Symbol index out of range: {index} (tracking {count} symbols)")]
    SymbolOutOfRange { index: usize, count: usize },

    #[error("Non-monotonic update for symbol {symbol}: bucket {bucket} is behind {last_bucket}")]
    NonMonotonic {
        symbol: usize,
        last_bucket: u64,
        bucket: u64,
    },

    // Configuration Errors
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Serialization Errors
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Refusals the caller can recover from by feeding further ticks
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::SymbolOutOfRange { .. } | EngineError::NonMonotonic { .. }
        )
    }

    /// Get error code for logging/monitoring
    pub fn error_code(&self) -> &str {
        match self {
            EngineError::SymbolOutOfRange { .. } => "ALIGN_001",
            EngineError::NonMonotonic { .. } => "ALIGN_002",
            EngineError::InvalidParameter(_) => "CFG_001",
            EngineError::ConfigError(_) => "CFG_002",
            EngineError::Serialization(_) => "DATA_001",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = EngineError::SymbolOutOfRange { index: 4, count: 3 };
        assert_eq!(err.error_code(), "ALIGN_001");
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Symbol index out of range: 4 (tracking 3 symbols)"
        );

        let err = EngineError::InvalidParameter("timeframe must be > 0".to_string());
        assert_eq!(err.error_code(), "CFG_001");
        assert!(!err.is_recoverable());
    }
}
