use std::sync::Arc;
use std::time::Instant;

use super::pipeline::MarketAnalysis;

/// Per-symbol bookkeeping inside the engine.
#[derive(Debug, Clone)]
pub struct SymbolState {
    /// Latest finished analysis. Replaced wholesale, never mutated in place.
    pub analysis: Option<Arc<MarketAnalysis>>,

    pub last_update_time: Option<Instant>,
    pub last_duration_ms: Option<u128>,

    /// A job for this symbol is queued or running
    pub is_calculating: bool,

    pub last_error: Option<String>,
}

impl SymbolState {
    pub fn new() -> Self {
        Self {
            analysis: None,
            last_update_time: None,
            last_duration_ms: None,
            is_calculating: false,
            last_error: None,
        }
    }

    /// Swaps in a fresh analysis and clears any previous error.
    pub fn update_analysis(&mut self, analysis: Arc<MarketAnalysis>, duration_ms: u128) {
        self.analysis = Some(analysis);
        self.is_calculating = false;
        self.last_update_time = Some(Instant::now());
        self.last_duration_ms = Some(duration_ms);
        self.last_error = None;
    }

    pub fn record_failure(&mut self, error: String) {
        self.is_calculating = false;
        self.last_error = Some(error);
    }
}

impl Default for SymbolState {
    fn default() -> Self {
        Self::new()
    }
}
