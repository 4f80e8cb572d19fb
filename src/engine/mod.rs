pub mod core;
pub mod messages;
pub mod pipeline;
pub mod state;
pub mod worker;

// Re-export key components
pub use self::core::AnalysisEngine;
pub use pipeline::{MarketAnalysis, analyze, analyze_all_degrees, analyze_batch};
pub use state::SymbolState;
