use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::domain::{SwingKind, SwingPoint, WaveDegree};
use crate::models::fibonacci::FibonacciLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PatternKind {
    Impulse,
    Corrective,
}

/// Direction of a move or of an expected move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Sideways,
    Unclear,
}

impl Direction {
    pub fn from_is_up(is_up: bool) -> Self {
        if is_up { Direction::Up } else { Direction::Down }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            other => other,
        }
    }
}

/// A complete, validated wave structure: 5 points for an impulse, 3 for a correction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WavePattern {
    pub kind: PatternKind,
    pub degree: WaveDegree,
    pub points: Vec<SwingPoint>,
    /// 0.0 ..= 1.0
    pub confidence: f64,
    /// Levels of the (first, last) point span
    pub fibonacci_levels: Vec<FibonacciLevel>,
    /// Impulses only
    pub next_target: Option<f64>,
}

impl WavePattern {
    pub fn start(&self) -> Option<&SwingPoint> {
        self.points.first()
    }

    pub fn end(&self) -> Option<&SwingPoint> {
        self.points.last()
    }

    pub fn end_timestamp_ms(&self) -> i64 {
        self.end().map(|p| p.timestamp_ms).unwrap_or(i64::MIN)
    }

    pub fn is_impulse(&self) -> bool {
        self.kind == PatternKind::Impulse
    }

    /// An impulse starting from a low points up; a correction starting from a high points down.
    pub fn direction(&self) -> Direction {
        match (self.kind, self.start().map(|p| p.kind)) {
            (PatternKind::Impulse, Some(SwingKind::Low)) => Direction::Up,
            (PatternKind::Impulse, Some(SwingKind::High)) => Direction::Down,
            (PatternKind::Corrective, Some(SwingKind::High)) => Direction::Down,
            (PatternKind::Corrective, Some(SwingKind::Low)) => Direction::Up,
            (_, None) => Direction::Unclear,
        }
    }
}
