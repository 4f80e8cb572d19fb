//! Analysis and computation configuration

use crate::domain::WaveDegree;

/// Swing (zigzag) extraction settings
#[derive(Debug, Clone, Copy)]
pub struct SwingSettings {
    // Minimum percentage reversal needed to confirm an extreme (2.0 = 2%)
    pub min_swing_pct: f64,
    // Below this many samples the series is treated as insufficient data
    pub min_samples: usize,
}

/// Settings for wave validation, identification and real-time labeling
#[derive(Debug, Clone, Copy)]
pub struct WaveSettings {
    pub degree: WaveDegree,
    // Tolerance for "ideal" wave relationships (0.15 = 15%)
    pub wave_tolerance: f64,
    // Label legs beyond wave 5 as extensions (v1, v.2, v.3) instead of unknown
    pub allow_extensions: bool,
    // Largest plausible multiple between a wave and wave 1
    pub max_wave_multiple: f64,
    // Impulse windows need a confidence strictly above this to be kept
    pub min_impulse_confidence: f64,
    // Fixed confidence for accepted corrective (ABC) windows
    pub corrective_confidence: f64,
    // Wave 5 projected as this multiple of wave 1, measured from the wave 3 start.
    // Trading convention, not an invariant.
    pub wave5_target_multiple: f64,
    // Trailing swing windows inspected by the real-time labeler
    pub impulse_window: usize,
    pub corrective_window: usize,
    pub complex_window: usize,
}

/// Strength and width multiplier of a Fibonacci zone, keyed by ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FibImportance {
    pub ratio: f64,
    pub strength: f64,
    pub width_mult: f64,
}

/// Conventional weighting: 0.618 and 1.618 widest and strongest.
pub const FIBONACCI_IMPORTANCE: [FibImportance; 9] = [
    FibImportance { ratio: 0.236, strength: 40.0, width_mult: 0.8 },
    FibImportance { ratio: 0.382, strength: 60.0, width_mult: 1.0 },
    FibImportance { ratio: 0.5, strength: 70.0, width_mult: 1.2 },
    FibImportance { ratio: 0.618, strength: 80.0, width_mult: 1.5 },
    FibImportance { ratio: 0.786, strength: 50.0, width_mult: 0.9 },
    FibImportance { ratio: 1.0, strength: 60.0, width_mult: 1.1 },
    FibImportance { ratio: 1.272, strength: 50.0, width_mult: 0.9 },
    FibImportance { ratio: 1.618, strength: 75.0, width_mult: 1.3 },
    FibImportance { ratio: 2.618, strength: 40.0, width_mult: 0.8 },
];

/// Support/resistance zone synthesis parameters
#[derive(Debug, Clone, Copy)]
pub struct ZoneParams {
    pub min_zone_width_pct: f64,
    pub max_zone_width_pct: f64,
    // Zones closer than this to the current price are dropped
    pub min_distance_pct: f64,
    // ...and so are zones further away than this
    pub max_distance_pct: f64,
    // Per side (support / resistance)
    pub max_zones: usize,
    // Consecutive zones merge when their overlap reaches this share of the first zone's width
    pub overlap_threshold_pct: f64,

    pub volume_bins: usize,
    pub volume_percentile: usize,
    pub volume_min_samples: usize,

    pub atr_period: usize,
    // Recent window compared with the full history for the volatility factor
    pub volatility_window: usize,
    pub volatility_factor_bounds: (f64, f64),

    // Only the most recent swings produce wave zones
    pub wave_zone_lookback: usize,
    pub wave_local_window: usize,

    pub consolidation_window: usize,
    pub consolidation_std_ratio: f64,
    // Minimum high/low range of a consolidation run, in percent of its mean
    pub consolidation_min_range_pct: f64,

    pub fibonacci_importance: &'static [FibImportance],
    pub fibonacci_fallback: FibImportance,
}

/// Multi-degree confluence detection
#[derive(Debug, Clone, Copy)]
pub struct ConfluenceSettings {
    // Levels within this percentage of a group's first level join the group
    pub price_tolerance_pct: f64,
    pub min_levels: usize,
    pub min_degrees: usize,
    pub max_zones: usize,
}

/// Sample-count steps used by the data-quality score
#[derive(Debug, Clone, Copy)]
pub struct QualitySettings {
    pub rich_history: usize,
    pub moderate_history: usize,
}

/// The Master Analysis Configuration
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub swing: SwingSettings,
    pub waves: WaveSettings,
    pub zones: ZoneParams,
    pub confluence: ConfluenceSettings,
    pub quality: QualitySettings,
}

impl AnalysisConfig {
    /// Copy of this config tuned to a degree: its swing sensitivity and confidence bar.
    pub fn for_degree(&self, degree: WaveDegree) -> Self {
        let mut config = self.clone();
        config.swing.min_swing_pct = degree.swing_pct();
        config.waves.degree = degree;
        config.waves.min_impulse_confidence = degree.confidence_bar();
        config
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        ANALYSIS.clone()
    }
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    swing: SwingSettings {
        min_swing_pct: 2.0,
        min_samples: 10,
    },

    waves: WaveSettings {
        degree: WaveDegree::Intermediate,
        wave_tolerance: 0.15,
        allow_extensions: true,
        max_wave_multiple: 3.0,
        min_impulse_confidence: 0.5,
        corrective_confidence: 0.7,
        wave5_target_multiple: 1.0,
        impulse_window: 9,
        corrective_window: 7,
        complex_window: 10,
    },

    zones: ZoneParams {
        min_zone_width_pct: 0.3,
        max_zone_width_pct: 2.0,
        min_distance_pct: 1.0,
        max_distance_pct: 20.0,
        max_zones: 5,
        overlap_threshold_pct: 50.0,

        volume_bins: 30,
        volume_percentile: 70,
        volume_min_samples: 20,

        atr_period: 14,
        volatility_window: 20,
        volatility_factor_bounds: (0.5, 2.0),

        wave_zone_lookback: 10,
        wave_local_window: 5,

        consolidation_window: 10,
        consolidation_std_ratio: 0.7,
        consolidation_min_range_pct: 0.5,

        fibonacci_importance: &FIBONACCI_IMPORTANCE,
        fibonacci_fallback: FibImportance {
            ratio: 0.0,
            strength: 30.0,
            width_mult: 0.7,
        },
    },

    confluence: ConfluenceSettings {
        price_tolerance_pct: 1.0,
        min_levels: 2,
        min_degrees: 2,
        max_zones: 10,
    },

    quality: QualitySettings {
        rich_history: 100,
        moderate_history: 50,
    },
};
