use serde::{Deserialize, Serialize};

/// Fixed ratio set used for every retracement/extension computation
pub const FIBONACCI_RATIOS: [f64; 9] = [0.236, 0.382, 0.5, 0.618, 0.786, 1.0, 1.272, 1.618, 2.618];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FibKind {
    Retracement,
    Extension,
}

impl FibKind {
    /// Ratios up to 1.0 retrace the move, anything above extends it.
    pub fn for_ratio(ratio: f64) -> Self {
        if ratio <= 1.0 {
            FibKind::Retracement
        } else {
            FibKind::Extension
        }
    }
}

/// A price level derived from an ordered (start, end) price pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevel {
    pub ratio: f64,
    pub price: f64,
    pub kind: FibKind,
}
