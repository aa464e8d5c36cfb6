/// Engine configuration parsed from TOML text
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::data::SeriesMode;
use crate::error::{EngineError, Result};

/// Shape of an alignment engine: window, timeframe and tracked symbols
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    // Bucketing
    pub window_size: usize,
    pub timeframe_secs: u64,
    #[serde(default)]
    pub periodic: bool,

    // Symbols, in dispatch index order
    pub symbols: Vec<String>,

    // Dispatch
    #[serde(default)]
    pub auto_calc: bool,

    // Logging
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| EngineError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(EngineError::ConfigError("window_size must be > 0".to_string()));
        }

        if self.timeframe_secs == 0 {
            return Err(EngineError::ConfigError("timeframe_secs must be > 0".to_string()));
        }

        if self.symbols.is_empty() {
            return Err(EngineError::ConfigError("symbols is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for symbol in &self.symbols {
            if symbol.trim().is_empty() {
                return Err(EngineError::ConfigError("blank symbol name".to_string()));
            }
            if !seen.insert(symbol.as_str()) {
                return Err(EngineError::ConfigError(format!("Duplicate symbol: {}", symbol)));
            }
        }

        Ok(())
    }

    pub fn mode(&self) -> SeriesMode {
        SeriesMode::from_flag(self.periodic)
    }

    /// Dispatch index of `symbol`
    pub fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }
}
