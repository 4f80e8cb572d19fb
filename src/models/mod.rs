pub mod fibonacci;
pub mod signal;
pub mod wave_label;
pub mod wave_pattern;
pub mod zone;

pub use fibonacci::{FIBONACCI_RATIOS, FibKind, FibonacciLevel};
pub use signal::{SignalKind, TradingSignal};
pub use wave_label::{
    AlternativeCount, KeyLevel, LabelingResult, LabelingStatus, WaveLabel, WavePrediction, WaveScenario, WaveStage,
};
pub use wave_pattern::{Direction, PatternKind, WavePattern};
pub use zone::{PivotLevel, SupportResistanceZone, ZoneKind, ZoneSet, ZoneSource};
