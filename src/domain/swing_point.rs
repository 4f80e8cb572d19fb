use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::time_utils::epoch_ms_to_utc;

/// Whether a swing point is a local top or a local bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SwingKind {
    High,
    Low,
}

impl SwingKind {
    pub fn opposite(self) -> Self {
        match self {
            SwingKind::High => SwingKind::Low,
            SwingKind::Low => SwingKind::High,
        }
    }
}

/// A locally extreme price confirmed by a minimum percentage reversal.
/// Immutable once emitted by the swing detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    /// Position of the extreme within the source series
    pub index: usize,
    pub timestamp_ms: i64,
    pub price: f64,
    pub kind: SwingKind,
}

impl SwingPoint {
    pub fn new(index: usize, timestamp_ms: i64, price: f64, kind: SwingKind) -> Self {
        Self {
            index,
            timestamp_ms,
            price,
            kind,
        }
    }

    pub fn is_high(&self) -> bool {
        self.kind == SwingKind::High
    }

    pub fn is_low(&self) -> bool {
        self.kind == SwingKind::Low
    }
}

impl fmt::Display for SwingPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {:.4} @ {} (#{})",
            self.kind,
            self.price,
            epoch_ms_to_utc(self.timestamp_ms),
            self.index
        )
    }
}

/// True when consecutive points never repeat a kind.
pub fn alternates(points: &[SwingPoint]) -> bool {
    points.windows(2).all(|w| w[0].kind != w[1].kind)
}
