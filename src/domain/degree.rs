use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Elliott wave degree: the timeframe scale of an analysis.
/// Each degree has its own swing sensitivity and pattern-confidence bar.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum WaveDegree {
    Primary,
    Intermediate,
    Minor,
    Minute,
}

/// How readily a degree reacts to small swings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum Sensitivity {
    Low,
    Medium,
    High,
}

impl WaveDegree {
    /// Minimum reversal (percent) confirming a swing at this degree
    pub fn swing_pct(self) -> f64 {
        match self {
            WaveDegree::Primary => 8.0,
            WaveDegree::Intermediate => 4.0,
            WaveDegree::Minor => 2.0,
            WaveDegree::Minute => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WaveDegree::Primary => "P",
            WaveDegree::Intermediate => "I",
            WaveDegree::Minor | WaveDegree::Minute => "Min",
        }
    }

    pub fn timeframe(self) -> &'static str {
        match self {
            WaveDegree::Primary => "Long-term (6+ months)",
            WaveDegree::Intermediate => "Medium-term (1-6 months)",
            WaveDegree::Minor => "Short-term (1-4 weeks)",
            WaveDegree::Minute => "Very Short-term (1-7 days)",
        }
    }

    pub fn sensitivity(self) -> Sensitivity {
        sensitivity_for_swing_pct(self.swing_pct())
    }

    /// Pattern-confidence bar: low sensitivity needs high confidence and vice versa
    pub fn confidence_bar(self) -> f64 {
        self.sensitivity().confidence_bar()
    }
}

impl Sensitivity {
    pub fn confidence_bar(self) -> f64 {
        match self {
            Sensitivity::High => 0.3,
            Sensitivity::Medium => 0.5,
            Sensitivity::Low => 0.7,
        }
    }
}

/// Buckets: up to 1% is high sensitivity, up to 3% medium, beyond that low.
pub fn sensitivity_for_swing_pct(swing_pct: f64) -> Sensitivity {
    if swing_pct <= 1.0 {
        Sensitivity::High
    } else if swing_pct <= 3.0 {
        Sensitivity::Medium
    } else {
        Sensitivity::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn degrees_map_to_swing_sensitivity() {
        let pcts: Vec<f64> = WaveDegree::iter().map(|d| d.swing_pct()).collect();
        assert_eq!(pcts, vec![8.0, 4.0, 2.0, 1.0]);
    }

    #[test]
    fn coarser_degrees_demand_more_confidence() {
        assert_eq!(WaveDegree::Primary.confidence_bar(), 0.7);
        assert_eq!(WaveDegree::Intermediate.confidence_bar(), 0.7);
        assert_eq!(WaveDegree::Minor.confidence_bar(), 0.5);
        assert_eq!(WaveDegree::Minute.confidence_bar(), 0.3);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("minor".parse::<WaveDegree>().unwrap(), WaveDegree::Minor);
        assert_eq!("PRIMARY".parse::<WaveDegree>().unwrap(), WaveDegree::Primary);
        assert!("hourly".parse::<WaveDegree>().is_err());
    }
}
