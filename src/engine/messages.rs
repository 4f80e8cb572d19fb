use std::sync::Arc;

use crate::config::AnalysisConfig;
use crate::domain::PriceSeries;

use super::pipeline::MarketAnalysis;

/// A request to analyze one symbol's series
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub symbol: String,
    pub series: Arc<PriceSeries>,
    pub config: AnalysisConfig,
    pub multi_degree: bool,
}

/// The result returned by the worker
#[derive(Debug, Clone)]
pub struct JobResult {
    pub symbol: String,
    pub duration_ms: u128,
    // Failure carries the error chain as text
    pub result: Result<Arc<MarketAnalysis>, String>,
}
