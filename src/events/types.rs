/// Dispatch event definitions emitted by the aligner
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Whether an emitted value belongs to a settled or a still-open bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceType {
    /// Newest bucket, still accumulating ticks
    IntraBar,
    /// Settled bucket, will not change again
    Close,
}

impl PriceType {
    pub fn as_str(&self) -> &str {
        match self {
            PriceType::IntraBar => "INTRABAR",
            PriceType::Close => "CLOSE",
        }
    }
}

/// One value handed to the dispatch consumer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispatchEvent {
    pub symbol: usize,
    pub value: f64,
    pub bucket: u64,
    /// Most advanced arrival time across symbols minus this record's arrival
    pub delay_ms: u64,
    pub price_type: PriceType,
    /// Symbol was updated since the previous flush (open bucket only)
    pub is_update: bool,
    /// No symbol had a real tick for this bucket
    pub is_gap: bool,
}

impl DispatchEvent {
    pub fn is_close(&self) -> bool {
        self.price_type == PriceType::Close
    }

    /// Render as a single JSONL line for downstream event logs
    pub fn to_json_line(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}
