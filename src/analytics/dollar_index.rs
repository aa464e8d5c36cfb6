/// US dollar index computed from aligned dispatch events
use tracing::debug;

use crate::events::{DispatchEvent, PriceType};

const DXY_CONSTANT: f64 = 50.143_481_12;

/// DXY basket pairs and their exponents
pub const DXY_COMPONENTS: [(&str, f64); 6] = [
    ("EURUSD", -0.576),
    ("USDJPY", 0.136),
    ("GBPUSD", -0.119),
    ("USDCAD", 0.091),
    ("USDSEK", 0.042),
    ("USDCHF", 0.036),
];

#[derive(Debug, Clone, Copy)]
struct Component {
    symbol: usize,
    exponent: f64,
    latest: Option<(u64, PriceType, f64)>,
}

/// Downstream consumer folding per-symbol events into one index value
/// per bucket and price type.
#[derive(Debug, Clone)]
pub struct DollarIndex {
    components: Vec<Component>,
    last_symbol: usize,
}

impl DollarIndex {
    /// `symbols[i]` is the dispatch index of `DXY_COMPONENTS[i]`
    pub fn new(symbols: [usize; 6]) -> Self {
        let components = symbols
            .iter()
            .zip(DXY_COMPONENTS.iter())
            .map(|(&symbol, &(_, exponent))| Component {
                symbol,
                exponent,
                latest: None,
            })
            .collect();

        DollarIndex {
            components,
            last_symbol: symbols.iter().copied().max().unwrap_or(0),
        }
    }

    /// Resolve component indices from configured symbol names
    pub fn from_symbols(names: &[String]) -> Option<Self> {
        let mut symbols = [0usize; 6];
        for (slot, (pair, _)) in symbols.iter_mut().zip(DXY_COMPONENTS.iter()) {
            *slot = names.iter().position(|n| n == pair)?;
        }
        Some(Self::new(symbols))
    }

    /// Feed one event; yields `(bucket, price_type, index)` once the basket
    /// is complete for the event's bucket.
    ///
    /// Symbols of one bucket are dispatched in index order, so the basket is
    /// evaluated when the highest-indexed component arrives.
    pub fn on_event(&mut self, event: &DispatchEvent) -> Option<(u64, PriceType, f64)> {
        for component in self.components.iter_mut().filter(|c| c.symbol == event.symbol) {
            component.latest = Some((event.bucket, event.price_type, event.value));
        }

        if event.symbol != self.last_symbol {
            return None;
        }

        let mut index = DXY_CONSTANT;
        for component in &self.components {
            match component.latest {
                Some((bucket, price_type, value))
                    if bucket == event.bucket && price_type == event.price_type && value > 0.0 =>
                {
                    index *= value.powf(component.exponent);
                }
                _ => return None,
            }
        }

        debug!(bucket = event.bucket, index, "Dollar index updated");
        Some((event.bucket, event.price_type, index))
    }
}
