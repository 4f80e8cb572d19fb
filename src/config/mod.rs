//! Configuration module for the wave-zones engine.

pub mod analysis;

mod debug; // Private: files use crate::config::PRINT_* not crate::config::debug::PRINT_*
pub use debug::*;

// Re-export commonly used items
pub use analysis::{
    ANALYSIS, AnalysisConfig, ConfluenceSettings, FIBONACCI_IMPORTANCE, FibImportance,
    QualitySettings, SwingSettings, WaveSettings, ZoneParams,
};
