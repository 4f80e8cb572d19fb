use anyhow::Result;
use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::{
    DataQuality, MultiDegreeAnalysis, PatternIdentifier, PatternSummary, RealtimeLabeler, ZoneContext,
    assess_data_quality, detect_swings, generate_signal, synthesize_zones, zone_context,
};
use crate::config::AnalysisConfig;
use crate::domain::{PriceSeries, SwingPoint, WaveDegree};
use crate::models::{FibonacciLevel, LabelingResult, TradingSignal, WavePattern, ZoneSet};

/// Everything computed for one series in one pass
#[derive(Debug, Clone, Serialize)]
pub struct MarketAnalysis {
    pub symbol: String,
    pub current_price: f64,
    pub last_timestamp_ms: Option<i64>,
    pub degree: WaveDegree,
    pub swings: Vec<SwingPoint>,
    pub patterns: Vec<WavePattern>,
    pub summary: PatternSummary,
    pub labeling: LabelingResult,
    pub signal: TradingSignal,
    pub zones: ZoneSet,
    pub zone_context: ZoneContext,
    pub data_quality: DataQuality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_degree: Option<MultiDegreeAnalysis>,
}

/// Swings, then patterns, then the wave branch and the zone branch side by side.
///
/// Only a malformed series is an error. Short or flat series produce an
/// analysis full of empty results and a low data-quality score.
pub fn analyze(series: &PriceSeries, config: &AnalysisConfig) -> Result<MarketAnalysis> {
    series.validate()?;
    let current_price = series.last_price().unwrap_or(0.0);

    let swings = detect_swings(series, &config.swing);
    let identifier = PatternIdentifier::new(config.waves);
    let patterns = identifier.identify(&swings);
    let fibonacci_levels: Vec<FibonacciLevel> = patterns
        .iter()
        .flat_map(|p| p.fibonacci_levels.iter().copied())
        .collect();

    let ((labeling, signal), zones) = rayon::join(
        || {
            let labeling = RealtimeLabeler::new(config.waves).label(series, &swings);
            let signal = generate_signal(&labeling, current_price);
            (labeling, signal)
        },
        || synthesize_zones(series, &swings, &fibonacci_levels, &config.zones),
    );

    let summary = identifier.summary(&swings, &patterns, current_price);
    let context = zone_context(&zones, current_price);
    let data_quality = assess_data_quality(series, &swings, &patterns, &config.quality);

    log::info!(
        "{}: {} swings, {} patterns, {} support / {} resistance zones, quality {} ({})",
        series.symbol,
        swings.len(),
        patterns.len(),
        zones.support_zones.len(),
        zones.resistance_zones.len(),
        data_quality.score,
        data_quality.level
    );

    Ok(MarketAnalysis {
        symbol: series.symbol.clone(),
        current_price,
        last_timestamp_ms: series.last_timestamp_ms(),
        degree: config.waves.degree,
        swings,
        patterns,
        summary,
        labeling,
        signal,
        zones,
        zone_context: context,
        data_quality,
        multi_degree: None,
    })
}

/// `analyze` plus the four-degree confluence scan.
pub fn analyze_all_degrees(series: &PriceSeries, config: &AnalysisConfig) -> Result<MarketAnalysis> {
    let mut analysis = analyze(series, config)?;
    analysis.multi_degree = Some(PatternIdentifier::analyze_multiple_degrees(series, config));
    Ok(analysis)
}

/// Independent per-symbol analyses, in parallel. Results keep input order.
pub fn analyze_batch(series: &[PriceSeries], config: &AnalysisConfig) -> Vec<Result<MarketAnalysis>> {
    series.par_iter().map(|s| analyze(s, config)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::QualityLevel;
    use crate::config::ANALYSIS;
    use crate::data::synthetic_impulse_series;
    use crate::models::{LabelingStatus, SignalKind};

    #[test]
    fn short_series_degrades_instead_of_failing() {
        let series = PriceSeries::from_closes("TINY", 0, 60_000, vec![100.0, 101.0, 102.0]).unwrap();
        let analysis = analyze(&series, &ANALYSIS).unwrap();

        assert!(analysis.swings.is_empty());
        assert!(analysis.patterns.is_empty());
        assert_eq!(analysis.labeling.status, LabelingStatus::InsufficientData);
        assert_eq!(analysis.signal.kind, SignalKind::Neutral);
        assert_eq!(analysis.data_quality.level, QualityLevel::Poor);
    }

    #[test]
    fn malformed_series_is_an_error() {
        let mut series = synthetic_impulse_series("BAD", 50, 1);
        series.timestamps_ms.pop();
        assert!(analyze(&series, &ANALYSIS).is_err());
    }

    #[test]
    fn demo_series_produces_full_analysis() {
        let series = synthetic_impulse_series("DEMO", 240, 3);
        let analysis = analyze_all_degrees(&series, &ANALYSIS).unwrap();

        assert!(analysis.swings.len() >= 5);
        assert!(!analysis.zones.is_empty());
        assert!(analysis.data_quality.score >= 60);
        let multi = analysis.multi_degree.as_ref().unwrap();
        assert_eq!(multi.degrees.len(), 4);

        let json = serde_json::to_string(&analysis).unwrap();
        assert!(json.contains("\"support_zones\""));
    }

    #[test]
    fn batch_keeps_input_order() {
        let batch = vec![
            synthetic_impulse_series("AAA", 120, 1),
            synthetic_impulse_series("BBB", 120, 2),
            synthetic_impulse_series("CCC", 120, 3),
        ];
        let results = analyze_batch(&batch, &ANALYSIS);
        let symbols: Vec<String> = results.into_iter().map(|r| r.unwrap().symbol).collect();
        assert_eq!(symbols, vec!["AAA", "BBB", "CCC"]);
    }
}
