use std::collections::BTreeSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::Display;

use crate::analysis::fibonacci;
use crate::analysis::swing_detector::detect_swings;
use crate::analysis::wave_validator::{validate_correction, validate_impulse};
use crate::config::{AnalysisConfig, ConfluenceSettings, WaveSettings};
use crate::domain::{PriceSeries, SwingKind, SwingPoint, WaveDegree};
use crate::models::{FibonacciLevel, PatternKind, WavePattern};
use crate::utils::maths_utils::{mean, pct_distance, safe_ratio};

const IMPULSE_POINTS: usize = 5;
const CORRECTIVE_POINTS: usize = 3;
const RECENT_LEVELS: usize = 5;

/// Where the latest price sits inside the active pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentPosition {
    pub pattern_kind: PatternKind,
    pub confidence: f64,
    /// "Wave 3", or "Pattern completed" once price has left the structure
    pub current_wave: String,
    pub completion_pct: f64,
    pub support: f64,
    pub resistance: f64,
    pub next_target: Option<f64>,
    pub fibonacci_levels: Vec<FibonacciLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum AnalysisQuality {
    #[strum(to_string = "Limited - Insufficient data points")]
    Limited,
    #[strum(to_string = "Poor - No clear patterns identified")]
    Poor,
    #[strum(to_string = "Fair - Patterns identified with moderate confidence")]
    Fair,
    #[strum(to_string = "Good - Clear patterns with high confidence")]
    Good,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternStatistics {
    pub total: usize,
    pub impulse: usize,
    pub corrective: usize,
    pub avg_confidence: f64,
}

impl PatternStatistics {
    pub fn from_patterns(patterns: &[WavePattern]) -> Self {
        let confidences: Vec<f64> = patterns.iter().map(|p| p.confidence).collect();
        Self {
            total: patterns.len(),
            impulse: patterns.iter().filter(|p| p.kind == PatternKind::Impulse).count(),
            corrective: patterns.iter().filter(|p| p.kind == PatternKind::Corrective).count(),
            avg_confidence: mean(&confidences).unwrap_or(0.0),
        }
    }
}

/// Projections from the last completed swing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NextTargets {
    pub correction_target: Option<f64>,
    pub extension_target: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSummary {
    pub degree: WaveDegree,
    pub current: Option<CurrentPosition>,
    pub statistics: PatternStatistics,
    pub recent_levels: Vec<SwingPoint>,
    pub swing_count: usize,
    pub quality: AnalysisQuality,
    pub next_targets: NextTargets,
}

/// A Fibonacci level tagged with the degree that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DegreeLevel {
    pub degree: WaveDegree,
    pub level: FibonacciLevel,
}

/// Price region where levels from several degrees agree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceZone {
    pub price: f64,
    /// Number of levels in the group
    pub strength: usize,
    pub degrees: Vec<WaveDegree>,
    pub levels: Vec<DegreeLevel>,
    /// 1.0 at the current price, falling to 0.0 at 50% away
    pub relevance: f64,
    pub distance_from_current_pct: f64,
}

impl ConfluenceZone {
    pub fn score(&self) -> f64 {
        self.strength as f64 * self.relevance
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreeAnalysis {
    pub degree: WaveDegree,
    pub timeframe: String,
    pub swing_pct: f64,
    pub swing_count: usize,
    pub pattern_count: usize,
    pub summary: PatternSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiDegreeAnalysis {
    pub degrees: Vec<DegreeAnalysis>,
    pub confluence_zones: Vec<ConfluenceZone>,
    pub total_fibonacci_levels: usize,
}

/// Slides validated windows over a swing list.
#[derive(Debug, Clone, Copy)]
pub struct PatternIdentifier {
    settings: WaveSettings,
}

impl PatternIdentifier {
    pub fn new(settings: WaveSettings) -> Self {
        Self { settings }
    }

    pub fn degree(&self) -> WaveDegree {
        self.settings.degree
    }

    /// Every 5-point window passing the impulse rules with enough confidence,
    /// followed by every valid 3-point correction.
    pub fn identify(&self, swings: &[SwingPoint]) -> Vec<WavePattern> {
        let degree = self.settings.degree;

        let impulses = swings.windows(IMPULSE_POINTS).filter_map(|window| {
            let (is_valid, confidence) = validate_impulse(window);
            (is_valid && confidence > self.settings.min_impulse_confidence).then(|| WavePattern {
                kind: PatternKind::Impulse,
                degree,
                points: window.to_vec(),
                confidence,
                fibonacci_levels: fibonacci::levels(&window[0], &window[IMPULSE_POINTS - 1]),
                next_target: next_target(window, self.settings.wave5_target_multiple),
            })
        });

        let corrections = swings
            .windows(CORRECTIVE_POINTS)
            .filter(|window| validate_correction(window))
            .map(|window| WavePattern {
                kind: PatternKind::Corrective,
                degree,
                points: window.to_vec(),
                confidence: self.settings.corrective_confidence,
                fibonacci_levels: fibonacci::levels(&window[0], &window[CORRECTIVE_POINTS - 1]),
                next_target: None,
            });

        let patterns: Vec<WavePattern> = impulses.chain(corrections).collect();
        log::debug!(
            "{} degree: {} patterns from {} swings",
            degree,
            patterns.len(),
            swings.len()
        );
        patterns
    }

    /// Position of `current_price` within the most recently completed pattern.
    pub fn current_position(patterns: &[WavePattern], current_price: f64) -> Option<CurrentPosition> {
        let active = active_pattern(patterns)?;
        let (start, end) = (active.start()?, active.end()?);

        let mut position = CurrentPosition {
            pattern_kind: active.kind,
            confidence: active.confidence,
            current_wave: "Pattern completed".to_string(),
            completion_pct: 100.0,
            support: start.price.min(end.price),
            resistance: start.price.max(end.price),
            next_target: active.next_target,
            fibonacci_levels: active.fibonacci_levels.clone(),
        };

        if active.kind == PatternKind::Impulse {
            let leg = active.points.windows(2).enumerate().find(|(_, leg)| {
                let (lo, hi) = min_max(leg[0].price, leg[1].price);
                (lo..=hi).contains(&current_price)
            });
            if let Some((i, leg)) = leg {
                let (lo, hi) = min_max(leg[0].price, leg[1].price);
                position.current_wave = format!("Wave {}", i + 1);
                position.completion_pct =
                    safe_ratio((current_price - leg[0].price).abs(), (leg[1].price - leg[0].price).abs()) * 100.0;
                position.support = lo;
                position.resistance = hi;
            }
        }

        Some(position)
    }

    pub fn summary(&self, swings: &[SwingPoint], patterns: &[WavePattern], current_price: f64) -> PatternSummary {
        let statistics = PatternStatistics::from_patterns(patterns);
        let quality = assess_quality(swings.len(), &statistics);

        PatternSummary {
            degree: self.settings.degree,
            current: Self::current_position(patterns, current_price),
            recent_levels: swings[swings.len().saturating_sub(RECENT_LEVELS)..].to_vec(),
            swing_count: swings.len(),
            statistics,
            quality,
            next_targets: next_targets(swings),
        }
    }

    /// Runs all four degrees independently (in parallel) and looks for
    /// confluence between the Fibonacci levels of their active patterns.
    pub fn analyze_multiple_degrees(series: &PriceSeries, base: &AnalysisConfig) -> MultiDegreeAnalysis {
        let current_price = series.last_price().unwrap_or(0.0);
        let degrees: Vec<WaveDegree> = WaveDegree::iter().collect();

        let analyses: Vec<DegreeAnalysis> = degrees
            .par_iter()
            .map(|&degree| {
                let config = base.for_degree(degree);
                let swings = detect_swings(series, &config.swing);
                let identifier = PatternIdentifier::new(config.waves);
                let patterns = identifier.identify(&swings);

                DegreeAnalysis {
                    degree,
                    timeframe: degree.timeframe().to_string(),
                    swing_pct: config.swing.min_swing_pct,
                    swing_count: swings.len(),
                    pattern_count: patterns.len(),
                    summary: identifier.summary(&swings, &patterns, current_price),
                }
            })
            .collect();

        let levels: Vec<DegreeLevel> = analyses
            .iter()
            .filter_map(|a| a.summary.current.as_ref().map(|c| (a.degree, c)))
            .flat_map(|(degree, current)| {
                current
                    .fibonacci_levels
                    .iter()
                    .map(move |&level| DegreeLevel { degree, level })
            })
            .collect();

        let confluence_zones = find_confluence_zones(&levels, current_price, &base.confluence);
        log::info!(
            "{}: multi-degree analysis found {} confluence zones from {} levels",
            series.symbol,
            confluence_zones.len(),
            levels.len()
        );

        MultiDegreeAnalysis {
            degrees: analyses,
            confluence_zones,
            total_fibonacci_levels: levels.len(),
        }
    }
}

/// Latest-ending pattern; ties go to the more confident one.
fn active_pattern(patterns: &[WavePattern]) -> Option<&WavePattern> {
    patterns.iter().max_by(|a, b| {
        a.end_timestamp_ms()
            .cmp(&b.end_timestamp_ms())
            .then(a.confidence.total_cmp(&b.confidence))
    })
}

fn min_max(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

fn assess_quality(swing_count: usize, statistics: &PatternStatistics) -> AnalysisQuality {
    if swing_count < 5 {
        AnalysisQuality::Limited
    } else if statistics.total == 0 {
        AnalysisQuality::Poor
    } else if statistics.avg_confidence > 0.7 {
        AnalysisQuality::Good
    } else {
        AnalysisQuality::Fair
    }
}

/// Wave 5 projected from the start of wave 3 as `multiple` x wave 1.
pub fn next_target(points: &[SwingPoint], multiple: f64) -> Option<f64> {
    if points.len() < IMPULSE_POINTS {
        return None;
    }
    let wave1 = (points[1].price - points[0].price).abs() * multiple;
    let wave3_start = points[2].price;
    Some(match points[0].kind {
        SwingKind::Low => wave3_start + wave1,
        SwingKind::High => wave3_start - wave1,
    })
}

/// After a high: 61.8% pullback of the last move. After a low: 161.8% extension from it.
pub fn next_targets(swings: &[SwingPoint]) -> NextTargets {
    if swings.len() < 3 {
        return NextTargets::default();
    }
    let last = &swings[swings.len() - 1];
    let prev = &swings[swings.len() - 2];
    let last_move = (last.price - prev.price).abs();

    match last.kind {
        SwingKind::High => NextTargets {
            correction_target: Some(last.price - last_move * 0.618),
            extension_target: None,
        },
        SwingKind::Low => NextTargets {
            correction_target: None,
            extension_target: Some(last.price + last_move * 1.618),
        },
    }
}

/// Groups levels lying within `price_tolerance_pct` of a seed level.
/// Groups need `min_levels` levels from `min_degrees` distinct degrees;
/// the best `max_zones` by strength x relevance are returned.
pub fn find_confluence_zones(
    levels: &[DegreeLevel],
    current_price: f64,
    settings: &ConfluenceSettings,
) -> Vec<ConfluenceZone> {
    let tolerance = settings.price_tolerance_pct / 100.0;
    let mut consumed = vec![false; levels.len()];
    let mut zones = Vec::new();

    for (i, seed) in levels.iter().enumerate() {
        if consumed[i] {
            continue;
        }

        let members: Vec<usize> = std::iter::once(i)
            .chain((i + 1..levels.len()).filter(|&j| {
                !consumed[j] && within_tolerance(seed.level.price, levels[j].level.price, tolerance)
            }))
            .collect();

        if members.len() < settings.min_levels {
            continue;
        }
        let degrees: BTreeSet<WaveDegree> = members.iter().map(|&j| levels[j].degree).collect();
        if degrees.len() < settings.min_degrees {
            continue;
        }

        let group: Vec<DegreeLevel> = members.iter().map(|&j| levels[j]).collect();
        let prices: Vec<f64> = group.iter().map(|l| l.level.price).collect();
        let price = mean(&prices).unwrap_or(seed.level.price);
        let distance = safe_ratio((price - current_price).abs(), current_price);

        zones.push(ConfluenceZone {
            price,
            strength: group.len(),
            degrees: degrees.into_iter().collect(),
            levels: group,
            relevance: (1.0 - distance * 2.0).max(0.0),
            distance_from_current_pct: pct_distance(price, current_price),
        });

        for &j in &members {
            consumed[j] = true;
        }
    }

    zones.sort_by(|a, b| b.score().total_cmp(&a.score()));
    zones.truncate(settings.max_zones);
    zones
}

fn within_tolerance(seed: f64, other: f64, tolerance: f64) -> bool {
    if seed == 0.0 {
        return other == 0.0;
    }
    (seed - other).abs() / seed.abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ANALYSIS;
    use crate::models::FibKind;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn swings(prices: &[f64], first: SwingKind) -> Vec<SwingPoint> {
        let mut kind = first;
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| {
                let p = SwingPoint::new(i * 10, i as i64 * 10_000, price, kind);
                kind = kind.opposite();
                p
            })
            .collect()
    }

    fn identifier() -> PatternIdentifier {
        PatternIdentifier::new(ANALYSIS.waves)
    }

    fn level(degree: WaveDegree, price: f64) -> DegreeLevel {
        DegreeLevel {
            degree,
            level: FibonacciLevel {
                ratio: 0.618,
                price,
                kind: FibKind::Retracement,
            },
        }
    }

    #[test]
    fn identifies_impulse_and_corrections() {
        let points = swings(&[100.0, 110.0, 105.0, 125.0, 115.0, 140.0], SwingKind::Low);
        let patterns = identifier().identify(&points);

        let impulses: Vec<&WavePattern> = patterns.iter().filter(|p| p.is_impulse()).collect();
        assert_eq!(impulses.len(), 1);
        assert_eq!(impulses[0].points.len(), 5);
        assert!(approx_eq(impulses[0].confidence, 1.0));
        // wave 3 start (105) + wave 1 (10)
        assert!(approx_eq(impulses[0].next_target.unwrap(), 115.0));
        assert_eq!(impulses[0].fibonacci_levels.len(), 9);

        let corrections = patterns.iter().filter(|p| p.kind == PatternKind::Corrective).count();
        assert_eq!(corrections, 2);
    }

    #[test]
    fn confidence_bar_filters_impulses() {
        // Deep wave 2 leaves 0.7, which does not clear a 0.7 bar
        let points = swings(&[100.0, 110.0, 101.0, 125.0, 115.0], SwingKind::Low);
        let strict = ANALYSIS.for_degree(WaveDegree::Primary);
        assert!(PatternIdentifier::new(strict.waves).identify(&points).iter().all(|p| !p.is_impulse()));
        assert_eq!(identifier().identify(&points).iter().filter(|p| p.is_impulse()).count(), 1);
    }

    #[test]
    fn identified_impulses_honour_hard_rules() {
        let closes: Vec<f64> = (0..400)
            .map(|i| {
                let t = i as f64;
                100.0 + 12.0 * (t / 9.0).sin() + 5.0 * (t / 3.1).sin() + t * 0.08
            })
            .collect();
        let series = PriceSeries::from_closes("SIM", 0, 1_000, closes).unwrap();
        let config = ANALYSIS.for_degree(WaveDegree::Minute);
        let points = detect_swings(&series, &config.swing);
        let patterns = PatternIdentifier::new(config.waves).identify(&points);

        for pattern in patterns.iter().filter(|p| p.is_impulse()) {
            let p: Vec<f64> = pattern.points.iter().map(|pt| pt.price).collect();
            let wave1 = (p[1] - p[0]).abs();
            let retrace = (p[2] - p[1]).abs();
            assert!(retrace <= wave1 + 1e-12);
            match pattern.points[0].kind {
                SwingKind::Low => assert!(p[4] > p[1]),
                SwingKind::High => assert!(p[4] < p[1]),
            }
        }
    }

    #[test]
    fn current_position_locates_the_active_wave() {
        let points = swings(&[100.0, 110.0, 105.0, 125.0, 115.0], SwingKind::Low);
        let patterns = identifier().identify(&points);

        let position = PatternIdentifier::current_position(&patterns, 120.0).unwrap();
        assert_eq!(position.pattern_kind, PatternKind::Impulse);
        assert_eq!(position.current_wave, "Wave 3");
        assert!(approx_eq(position.completion_pct, 75.0));
        assert!(approx_eq(position.support, 105.0));
        assert!(approx_eq(position.resistance, 125.0));

        let outside = PatternIdentifier::current_position(&patterns, 150.0).unwrap();
        assert_eq!(outside.current_wave, "Pattern completed");
        assert!(approx_eq(outside.completion_pct, 100.0));

        assert!(PatternIdentifier::current_position(&[], 120.0).is_none());
    }

    #[test]
    fn summary_grades_analysis_quality() {
        let few = swings(&[100.0, 110.0, 105.0], SwingKind::Low);
        assert_eq!(identifier().summary(&few, &[], 105.0).quality, AnalysisQuality::Limited);

        let points = swings(&[100.0, 110.0, 105.0, 125.0, 115.0, 140.0], SwingKind::Low);
        assert_eq!(identifier().summary(&points, &[], 140.0).quality, AnalysisQuality::Poor);

        let patterns = identifier().identify(&points);
        let summary = identifier().summary(&points, &patterns, 140.0);
        // 1.0 impulse + two 0.7 corrections average 0.8
        assert_eq!(summary.quality, AnalysisQuality::Good);
        assert_eq!(summary.statistics.total, 3);
        assert_eq!(summary.statistics.impulse, 1);
        assert_eq!(summary.recent_levels.len(), 5);
        assert_eq!(summary.swing_count, 6);
    }

    #[test]
    fn next_targets_follow_the_last_swing() {
        let after_high = next_targets(&swings(&[100.0, 120.0, 110.0, 130.0], SwingKind::Low));
        assert!(approx_eq(after_high.correction_target.unwrap(), 130.0 - 20.0 * 0.618));
        assert!(after_high.extension_target.is_none());

        let after_low = next_targets(&swings(&[100.0, 120.0, 110.0], SwingKind::Low));
        assert!(approx_eq(after_low.extension_target.unwrap(), 110.0 + 10.0 * 1.618));

        assert_eq!(next_targets(&swings(&[100.0, 120.0], SwingKind::Low)), NextTargets::default());
    }

    #[test]
    fn levels_from_two_degrees_form_one_confluence_zone() {
        let levels = vec![
            level(WaveDegree::Primary, 100.0),
            level(WaveDegree::Minor, 100.5),
            level(WaveDegree::Minor, 150.0),
        ];
        let zones = find_confluence_zones(&levels, 102.0, &ANALYSIS.confluence);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].strength, 2);
        assert_eq!(zones[0].degrees, vec![WaveDegree::Primary, WaveDegree::Minor]);
        assert!(approx_eq(zones[0].price, 100.25));
        assert!(zones[0].relevance > 0.9);
    }

    #[test]
    fn single_degree_clusters_are_not_confluence() {
        let levels = vec![level(WaveDegree::Minor, 100.0), level(WaveDegree::Minor, 100.2)];
        assert!(find_confluence_zones(&levels, 100.0, &ANALYSIS.confluence).is_empty());
    }

    #[test]
    fn confluence_zones_rank_by_strength_and_relevance() {
        let levels = vec![
            level(WaveDegree::Primary, 140.0),
            level(WaveDegree::Minor, 140.5),
            level(WaveDegree::Primary, 101.0),
            level(WaveDegree::Minute, 101.2),
        ];
        let zones = find_confluence_zones(&levels, 100.0, &ANALYSIS.confluence);
        assert_eq!(zones.len(), 2);
        assert!(zones[0].price < 102.0);
        assert!(zones[0].score() >= zones[1].score());
    }

    #[test]
    fn multi_degree_runs_every_degree_in_order() {
        let closes: Vec<f64> = (0..250)
            .map(|i| {
                let t = i as f64;
                200.0 + 25.0 * (t / 15.0).sin() + 6.0 * (t / 4.0).sin()
            })
            .collect();
        let series = PriceSeries::from_closes("SIM", 0, 1_000, closes).unwrap();
        let analysis = PatternIdentifier::analyze_multiple_degrees(&series, &ANALYSIS);

        let order: Vec<WaveDegree> = analysis.degrees.iter().map(|d| d.degree).collect();
        assert_eq!(
            order,
            vec![WaveDegree::Primary, WaveDegree::Intermediate, WaveDegree::Minor, WaveDegree::Minute]
        );
        assert!(analysis.degrees[3].swing_count >= analysis.degrees[0].swing_count);
        assert!(analysis.confluence_zones.len() <= ANALYSIS.confluence.max_zones);
        for zone in &analysis.confluence_zones {
            assert!(zone.strength >= 2);
            assert!(zone.degrees.len() >= 2);
        }
    }
}
