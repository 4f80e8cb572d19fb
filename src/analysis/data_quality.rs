use serde::Serialize;
use strum_macros::Display;

use crate::config::QualitySettings;
use crate::domain::{PriceSeries, SwingPoint};
use crate::models::WavePattern;
use crate::utils::maths_utils::mean;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Display)]
pub enum QualityLevel {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl QualityLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => QualityLevel::Excellent,
            60..=79 => QualityLevel::Good,
            40..=59 => QualityLevel::Fair,
            _ => QualityLevel::Poor,
        }
    }
}

/// How far the inputs met the prerequisites of a trustworthy analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQuality {
    /// 0 ..= 100
    pub score: u32,
    pub level: QualityLevel,
    pub factors: Vec<String>,
    pub recommendations: Vec<String>,
}

pub fn assess_data_quality(
    series: &PriceSeries,
    swings: &[SwingPoint],
    patterns: &[WavePattern],
    settings: &QualitySettings,
) -> DataQuality {
    let mut score = 0;
    let mut factors = Vec::new();

    if series.len() >= settings.rich_history {
        score += 20;
        factors.push(format!("Sufficient price history ({}+ periods)", settings.rich_history));
    } else if series.len() >= settings.moderate_history {
        score += 10;
        factors.push(format!("Moderate price history ({}+ periods)", settings.moderate_history));
    } else {
        factors.push(format!("Limited price history (<{} periods)", settings.moderate_history));
    }

    if series.has_volume() {
        score += 25;
        factors.push("Volume data available (enables volume profile zones)".to_string());
    } else {
        factors.push("No volume data (volume-based analysis disabled)".to_string());
    }

    if series.has_ohlc() {
        score += 15;
        factors.push("OHLC data available (accurate ATR calculation)".to_string());
    } else {
        factors.push("Only close prices (estimated ATR)".to_string());
    }

    if swings.len() >= 5 {
        score += 20;
        factors.push("Multiple wave points detected".to_string());
    } else if swings.len() >= 3 {
        score += 10;
        factors.push("Basic wave structure detected".to_string());
    } else {
        factors.push("Insufficient wave structure".to_string());
    }

    let confidences: Vec<f64> = patterns.iter().map(|p| p.confidence).collect();
    match mean(&confidences) {
        Some(avg) if avg > 0.7 => {
            score += 20;
            factors.push("High confidence wave patterns".to_string());
        }
        Some(avg) if avg > 0.5 => {
            score += 10;
            factors.push("Moderate confidence wave patterns".to_string());
        }
        Some(_) => factors.push("Low confidence wave patterns".to_string()),
        None => factors.push("No clear wave patterns identified".to_string()),
    }

    DataQuality {
        score,
        level: QualityLevel::from_score(score),
        factors,
        recommendations: recommendations(score, series, patterns),
    }
}

fn recommendations(score: u32, series: &PriceSeries, patterns: &[WavePattern]) -> Vec<String> {
    let mut recs = Vec::new();
    if score < 40 {
        recs.push("Consider using longer time period for more data".to_string());
        recs.push("Try different swing percentage for better wave detection".to_string());
    }
    if !series.has_volume() {
        recs.push("Include volume data for volume-based S/R zones".to_string());
    }
    if !series.has_ohlc() {
        recs.push("Use OHLC data instead of close-only for better analysis".to_string());
    }
    if patterns.is_empty() {
        recs.push("Adjust swing sensitivity or use different timeframe".to_string());
    }
    if recs.is_empty() {
        recs.push("Analysis quality is good - no specific improvements needed".to_string());
    }
    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ANALYSIS;
    use crate::domain::{SwingKind, WaveDegree};
    use crate::models::PatternKind;

    fn swings(n: usize) -> Vec<SwingPoint> {
        (0..n)
            .map(|i| {
                let kind = if i % 2 == 0 { SwingKind::Low } else { SwingKind::High };
                SwingPoint::new(i * 5, i as i64 * 1_000, 100.0 + i as f64, kind)
            })
            .collect()
    }

    fn pattern(confidence: f64) -> WavePattern {
        WavePattern {
            kind: PatternKind::Impulse,
            degree: WaveDegree::Intermediate,
            points: swings(6),
            confidence,
            fibonacci_levels: Vec::new(),
            next_target: None,
        }
    }

    #[test]
    fn short_close_only_series_is_poor() {
        let series = PriceSeries::from_closes("X", 0, 1, vec![100.0; 20]).unwrap();
        let quality = assess_data_quality(&series, &[], &[], &ANALYSIS.quality);
        assert_eq!(quality.score, 0);
        assert_eq!(quality.level, QualityLevel::Poor);
        assert_eq!(quality.recommendations.len(), 5);
    }

    #[test]
    fn rich_inputs_score_excellent() {
        let n = 120;
        let series = PriceSeries::from_closes("X", 0, 1, vec![100.0; n])
            .unwrap()
            .with_volumes(vec![10.0; n])
            .unwrap()
            .with_high_low(vec![101.0; n], vec![99.0; n])
            .unwrap();
        let quality = assess_data_quality(&series, &swings(6), &[pattern(0.9)], &ANALYSIS.quality);
        assert_eq!(quality.score, 100);
        assert_eq!(quality.level, QualityLevel::Excellent);
        assert_eq!(
            quality.recommendations,
            vec!["Analysis quality is good - no specific improvements needed".to_string()]
        );
    }

    #[test]
    fn partial_inputs_add_up() {
        let series = PriceSeries::from_closes("X", 0, 1, vec![100.0; 60])
            .unwrap()
            .with_volumes(vec![1.0; 60])
            .unwrap();
        let quality = assess_data_quality(&series, &swings(3), &[pattern(0.6)], &ANALYSIS.quality);
        assert_eq!(quality.score, 10 + 25 + 10 + 10);
        assert_eq!(quality.level, QualityLevel::Fair);
    }
}
