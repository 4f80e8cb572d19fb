// Wave analysis and support/resistance zone synthesis
pub mod data_quality;
pub mod fibonacci;
pub mod pattern_identifier;
pub mod realtime_labeler;
pub mod swing_detector;
pub mod trading_signal;
pub mod wave_validator;
pub mod zone_context;
pub mod zone_merger;
pub mod zone_synthesizer;

// Re-export commonly used types
pub use data_quality::{DataQuality, QualityLevel, assess_data_quality};
pub use pattern_identifier::{
    AnalysisQuality, ConfluenceZone, CurrentPosition, MultiDegreeAnalysis, PatternIdentifier, PatternSummary,
    find_confluence_zones, next_targets,
};
pub use realtime_labeler::RealtimeLabeler;
pub use swing_detector::detect_swings;
pub use trading_signal::generate_signal;
pub use wave_validator::{validate_correction, validate_impulse};
pub use zone_context::{ZoneBias, ZoneContext, render_zones, zone_context};
pub use zone_merger::merge_overlapping_zones;
pub use zone_synthesizer::{ZoneMethod, ZoneSynthesizer, synthesize_zones};
