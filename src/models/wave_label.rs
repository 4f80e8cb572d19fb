use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::domain::SwingPoint;
use crate::models::wave_pattern::Direction;

/// Interpretation of the trailing swing window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum WaveScenario {
    #[strum(to_string = "Bullish Impulse (i-ii-iii-iv-v up)")]
    ImpulseUp,
    #[strum(to_string = "Bearish Impulse (i-ii-iii-iv-v down)")]
    ImpulseDown,
    #[strum(to_string = "Corrective Rally (a-b-c up)")]
    CorrectionUp,
    #[strum(to_string = "Corrective Decline (a-b-c down)")]
    CorrectionDown,
    #[strum(to_string = "Unclear Pattern")]
    Unclear,
}

impl WaveScenario {
    pub fn is_impulse(self) -> bool {
        matches!(self, WaveScenario::ImpulseUp | WaveScenario::ImpulseDown)
    }

    pub fn is_down(self) -> bool {
        matches!(self, WaveScenario::ImpulseDown | WaveScenario::CorrectionDown)
    }
}

/// Structural position a label stands for. Predictions key off this,
/// never off the label text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveStage {
    One,
    Two,
    Three,
    Four,
    Five,
    /// Sub-wave of an extended fifth (1-based)
    FifthExtension(u8),
    A,
    B,
    C,
    W,
    X,
    Y,
    /// Second ABC of a double correction
    SecondA,
    Unknown,
}

/// Provisional label attached to one swing point of an incomplete structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveLabel {
    pub point: SwingPoint,
    /// e.g. "iii", "(iv)", "a", "ii?"
    pub label: String,
    pub stage: WaveStage,
    pub confidence: f64,
    pub alternatives: Vec<String>,
}

impl WaveLabel {
    pub fn new(point: SwingPoint, label: impl Into<String>, stage: WaveStage, confidence: f64, alternatives: &[&str]) -> Self {
        Self {
            point,
            label: label.into(),
            stage,
            confidence,
            alternatives: alternatives.iter().map(|a| a.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyLevel {
    pub name: String,
    pub price: f64,
}

impl KeyLevel {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// Forecast for the next wave, derived from the best scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WavePrediction {
    /// e.g. "Wave iii impulse (strongest move)"
    pub current_wave: String,
    /// e.g. "Wave iv correction expected"
    pub next_wave: String,
    /// (low, high), always ordered
    pub target_range: (f64, f64),
    pub direction: Direction,
    pub confidence: f64,
    pub timeframe_estimate: String,
    pub key_levels: Vec<KeyLevel>,
    /// A close beyond this level invalidates the count
    pub invalidation_level: f64,
}

impl WavePrediction {
    /// Lowest-confidence description, used whenever no structure can be read.
    pub fn developing(current_price: f64) -> Self {
        Self {
            current_wave: "Correction developing".to_string(),
            next_wave: "Pattern unclear".to_string(),
            target_range: (current_price * 0.95, current_price * 1.05),
            direction: Direction::Unclear,
            confidence: 0.3,
            timeframe_estimate: "Uncertain".to_string(),
            key_levels: Vec::new(),
            invalidation_level: current_price * 0.9,
        }
    }
}

/// Runner-up interpretation kept alongside the chosen one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeCount {
    pub scenario: WaveScenario,
    pub confidence: f64,
    pub position: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum LabelingStatus {
    #[strum(to_string = "Insufficient data")]
    InsufficientData,
    #[strum(to_string = "No clear pattern")]
    NoClearPattern,
    #[strum(to_string = "Pattern identified")]
    PatternIdentified,
}

/// Output of the real-time labeler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelingResult {
    pub status: LabelingStatus,
    pub scenario: Option<WaveScenario>,
    pub confidence: f64,
    pub labeled_waves: Vec<WaveLabel>,
    pub current_position: String,
    pub prediction: WavePrediction,
    pub alternatives: Vec<AlternativeCount>,
    pub key_observations: Vec<String>,
}

impl LabelingResult {
    pub fn is_identified(&self) -> bool {
        self.status == LabelingStatus::PatternIdentified
    }
}
