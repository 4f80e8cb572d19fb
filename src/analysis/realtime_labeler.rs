//! Provisional labeling of the trailing, possibly incomplete, swing structure.
//!
//! Three interpretations are scored independently (impulse in progress,
//! correction in progress, complex combination) and the most confident one
//! drives the forward prediction. The others are kept as alternative counts.

use crate::config::WaveSettings;
#[allow(unused_imports)]
use crate::config::PRINT_LABELING_SCENARIOS;
use crate::domain::{PriceSeries, SwingKind, SwingPoint};
use crate::models::{
    AlternativeCount, Direction, KeyLevel, LabelingResult, LabelingStatus, WaveLabel, WavePrediction, WaveScenario,
    WaveStage,
};
use crate::utils::maths_utils::safe_ratio;

const MAX_ALTERNATIVES: usize = 2;
const MOMENTUM_PERIODS: usize = 20;
const CONFIDENCE_TOLERANCE: f64 = 1e-9;

/// One scored interpretation of the trailing swings
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    scenario: WaveScenario,
    labels: Vec<WaveLabel>,
    confidence: f64,
    current_position: String,
    direction: Direction,
}

#[derive(Debug, Clone, Copy)]
pub struct RealtimeLabeler {
    settings: WaveSettings,
}

impl RealtimeLabeler {
    pub fn new(settings: WaveSettings) -> Self {
        Self { settings }
    }

    /// Labels the trailing swings of `series` and predicts the next wave.
    /// Never fails: thin data degrades to an "insufficient data" result.
    pub fn label(&self, series: &PriceSeries, swings: &[SwingPoint]) -> LabelingResult {
        let current_price = series
            .last_price()
            .or_else(|| swings.last().map(|p| p.price))
            .unwrap_or(0.0);

        if swings.len() < 2 {
            log::debug!("{}: {} swings, not enough to label", series.symbol, swings.len());
            return Self::empty_result(LabelingStatus::InsufficientData, "Unknown", current_price);
        }

        let candidates: Vec<Candidate> = [
            self.try_impulse(swings, current_price),
            self.try_corrective(swings),
            self.try_complex(swings),
        ]
        .into_iter()
        .flatten()
        .filter(|c| c.confidence > 0.0)
        .collect();

        #[cfg(debug_assertions)]
        if PRINT_LABELING_SCENARIOS {
            for c in &candidates {
                log::info!("{}: {} -> {:.2} ({})", series.symbol, c.scenario, c.confidence, c.current_position);
            }
        }

        let Some(best_idx) = best_candidate_index(&candidates) else {
            return Self::empty_result(LabelingStatus::NoClearPattern, "Pattern unclear", current_price);
        };

        let best = &candidates[best_idx];
        let prediction = self.predict(best, current_price);
        let key_observations = self.key_observations(best, &series.closes);

        let alternatives = candidates
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != best_idx)
            .take(MAX_ALTERNATIVES)
            .map(|(_, c)| AlternativeCount {
                scenario: c.scenario,
                confidence: c.confidence,
                position: c.current_position.clone(),
            })
            .collect();

        LabelingResult {
            status: LabelingStatus::PatternIdentified,
            scenario: Some(best.scenario),
            confidence: best.confidence,
            labeled_waves: best.labels.clone(),
            current_position: best.current_position.clone(),
            prediction,
            alternatives,
            key_observations,
        }
    }

    fn empty_result(status: LabelingStatus, position: &str, current_price: f64) -> LabelingResult {
        LabelingResult {
            status,
            scenario: None,
            confidence: 0.0,
            labeled_waves: Vec::new(),
            current_position: position.to_string(),
            prediction: WavePrediction::developing(current_price),
            alternatives: Vec::new(),
            key_observations: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Interpretations
    // ------------------------------------------------------------------

    fn try_impulse(&self, swings: &[SwingPoint], current_price: f64) -> Option<Candidate> {
        let points = tail(swings, self.settings.impulse_window);
        if points.len() < 2 {
            return None;
        }
        let n = points.len();
        let is_up = points[n - 1].price > points[0].price;

        // Last point of a short count is bracketed: the wave is still forming
        let numeral = |k: usize, roman: &str| {
            if n == k + 1 { format!("({})", roman) } else { roman.to_string() }
        };

        let mut confidence: f64 = 0.5;
        let mut labels = Vec::with_capacity(n);

        let first = if points[0].kind == SwingKind::Low { "(i)" } else { "i" };
        labels.push(WaveLabel::new(points[0], first, WaveStage::One, 0.8, &["1", "a"]));
        let second = if points[1].kind == SwingKind::High { "(ii)" } else { "ii" };
        labels.push(WaveLabel::new(points[1], second, WaveStage::Two, 0.7, &["2", "b"]));

        let wave1 = (points[1].price - points[0].price).abs();

        if n >= 3 {
            let wave2 = (points[2].price - points[1].price).abs();
            let retracement = safe_ratio(wave2, wave1);
            if (0.236..=0.99).contains(&retracement) {
                confidence += 0.1;
                let conf = if n == 3 { 0.7 } else { 0.8 };
                labels.push(WaveLabel::new(points[2], numeral(2, "iii"), WaveStage::Three, conf, &["3", "c"]));
            } else {
                confidence -= 0.2;
                labels.push(WaveLabel::new(points[2], "iii?", WaveStage::Three, 0.3, &["3", "c"]));
            }
        }

        if n >= 4 {
            let wave3 = (points[3].price - points[2].price).abs();
            if wave3 >= wave1 * 0.618 {
                confidence += 0.1;
                labels.push(WaveLabel::new(points[3], numeral(3, "iv"), WaveStage::Four, 0.7, &["4", "a"]));
            } else {
                labels.push(WaveLabel::new(points[3], "iv?", WaveStage::Four, 0.3, &["4", "a"]));
            }
        }

        if n >= 5 {
            let clear_of_wave1 = if is_up {
                points[4].price > points[1].price
            } else {
                points[4].price < points[1].price
            };
            if clear_of_wave1 {
                confidence += 0.15;
                labels.push(WaveLabel::new(points[4], numeral(4, "v"), WaveStage::Five, 0.8, &["5", "c"]));
            } else {
                confidence -= 0.3;
                labels.push(WaveLabel::new(points[4], "v?", WaveStage::Five, 0.3, &["5", "c"]));
            }
        }

        // Extended fifth sub-waves, then anything past that starts a new cycle
        for (i, &point) in points.iter().enumerate().skip(5) {
            if self.settings.allow_extensions && i <= 7 {
                let ext = (i - 4) as u8;
                let label = if ext == 1 { format!("v{}", ext) } else { format!("v.{}", ext) };
                labels.push(WaveLabel::new(point, label, WaveStage::FifthExtension(ext), 0.5, &["a", "i"]));
            } else {
                labels.push(WaveLabel::new(point, "?", WaveStage::Unknown, 0.3, &["new cycle"]));
            }
        }

        if wave1 > 0.0 {
            let limit = wave1 * self.settings.max_wave_multiple;
            if leg_sizes(&labels).iter().any(|&leg| leg > limit) {
                confidence -= 0.1;
            }
        }

        let direction = Direction::from_is_up(is_up);
        Some(Candidate {
            scenario: if is_up { WaveScenario::ImpulseUp } else { WaveScenario::ImpulseDown },
            current_position: impulse_position(&labels, direction, current_price),
            labels,
            confidence: confidence.clamp(0.0, 1.0),
            direction,
        })
    }

    fn try_corrective(&self, swings: &[SwingPoint]) -> Option<Candidate> {
        let points = tail(swings, self.settings.corrective_window);
        if points.len() < 2 {
            return None;
        }
        let n = points.len();
        let is_up = points[n - 1].price > points[0].price;

        let mut confidence: f64 = 0.4;
        let mut labels = vec![
            WaveLabel::new(points[0], "a", WaveStage::A, 0.7, &["w", "1"]),
            WaveLabel::new(points[1], "b", WaveStage::B, 0.6, &["x", "2"]),
        ];

        if n >= 3 {
            let wave_a = (points[1].price - points[0].price).abs();
            let wave_b = (points[2].price - points[1].price).abs();
            if (0.382..=0.886).contains(&safe_ratio(wave_b, wave_a)) {
                confidence += 0.2;
                labels.push(WaveLabel::new(points[2], "c", WaveStage::C, 0.7, &["y", "3"]));
            } else {
                labels.push(WaveLabel::new(points[2], "c?", WaveStage::C, 0.3, &["y", "3"]));
            }
        }

        for (i, &point) in points.iter().enumerate().skip(3) {
            let label = match i {
                3 => WaveLabel::new(point, "x", WaveStage::X, 0.5, &["a"]),
                4 => WaveLabel::new(point, "a2", WaveStage::SecondA, 0.5, &["w"]),
                _ => WaveLabel::new(point, "?", WaveStage::Unknown, 0.3, &[]),
            };
            labels.push(label);
        }

        Some(Candidate {
            scenario: if is_up { WaveScenario::CorrectionUp } else { WaveScenario::CorrectionDown },
            current_position: corrective_position(&labels).to_string(),
            labels,
            confidence: confidence.clamp(0.0, 1.0),
            direction: Direction::from_is_up(is_up),
        })
    }

    /// W-X-Y double three over the last ten swings
    fn try_complex(&self, swings: &[SwingPoint]) -> Option<Candidate> {
        let points = tail(swings, self.settings.complex_window);
        if points.len() < 7 {
            return None;
        }

        let labels = points
            .iter()
            .enumerate()
            .map(|(i, &point)| match i {
                0 => WaveLabel::new(point, "w", WaveStage::W, 0.5, &["a", "1"]),
                6 => WaveLabel::new(point, "y", WaveStage::Y, 0.5, &["a", "7"]),
                i if i % 3 == 0 => {
                    let alt = (i + 1).to_string();
                    WaveLabel::new(point, "x", WaveStage::X, 0.5, &["a", alt.as_str()])
                }
                _ => WaveLabel::new(point, "?", WaveStage::Unknown, 0.3, &[]),
            })
            .collect();

        Some(Candidate {
            scenario: WaveScenario::Unclear,
            labels,
            confidence: 0.3,
            current_position: "Complex correction in progress".to_string(),
            direction: Direction::Sideways,
        })
    }

    // ------------------------------------------------------------------
    // Predictions
    // ------------------------------------------------------------------

    fn predict(&self, candidate: &Candidate, current_price: f64) -> WavePrediction {
        let is_up = candidate.direction == Direction::Up;
        if candidate.scenario.is_impulse() {
            predict_impulse(&candidate.labels, is_up, current_price)
        } else {
            predict_corrective(&candidate.labels, is_up, current_price)
        }
    }

    fn key_observations(&self, candidate: &Candidate, closes: &[f64]) -> Vec<String> {
        let mut observations = Vec::new();
        let sizes = leg_sizes(&candidate.labels);

        if candidate.labels.len() >= 3 {
            // First largest leg wins ties
            let largest = sizes
                .iter()
                .enumerate()
                .fold(None::<(usize, f64)>, |acc, (i, &s)| match acc {
                    Some((_, best)) if best >= s => acc,
                    _ => Some((i, s)),
                })
                .map(|(i, _)| i);
            match largest {
                Some(2) => observations.push("Wave 3 appears extended (typical and bullish)".to_string()),
                Some(4) => observations.push("Wave 5 appears extended (potential exhaustion)".to_string()),
                _ => {}
            }
        }

        if closes.len() >= MOMENTUM_PERIODS {
            let base = closes[closes.len() - MOMENTUM_PERIODS];
            let last = closes[closes.len() - 1];
            let momentum = (safe_ratio(last, base) - 1.0) * 100.0;
            if base != 0.0 {
                if momentum.abs() > 10.0 {
                    observations.push(format!("Strong momentum: {:.1}% over {} periods", momentum, MOMENTUM_PERIODS));
                } else if momentum.abs() < 2.0 {
                    observations.push("Low momentum - potential consolidation".to_string());
                }
            }
        }

        if candidate.confidence > 0.7 {
            observations.push("High confidence pattern - clear wave structure".to_string());
        } else if candidate.confidence < 0.5 {
            observations.push("Low confidence - consider alternative counts".to_string());
        }

        if candidate.scenario.is_impulse() && sizes.len() >= 5 && sizes[0] > 0.0 {
            let ratio = sizes[4] / sizes[0];
            if (ratio - 1.0).abs() <= self.settings.wave_tolerance {
                observations.push(format!(
                    "Wave 5 equals wave 1 within {:.0}% (common target)",
                    self.settings.wave_tolerance * 100.0
                ));
            }
        }

        observations
    }
}

/// Highest-confidence candidate. Scores within `CONFIDENCE_TOLERANCE` of each
/// other tie, and ties keep the earlier interpretation.
fn best_candidate_index(candidates: &[Candidate]) -> Option<usize> {
    (0..candidates.len()).reduce(|best, i| {
        if candidates[i].confidence > candidates[best].confidence + CONFIDENCE_TOLERANCE {
            i
        } else {
            best
        }
    })
}

fn tail(swings: &[SwingPoint], window: usize) -> &[SwingPoint] {
    &swings[swings.len().saturating_sub(window)..]
}

/// Absolute sizes of the legs between consecutive labels
fn leg_sizes(labels: &[WaveLabel]) -> Vec<f64> {
    labels
        .windows(2)
        .map(|w| (w[1].point.price - w[0].point.price).abs())
        .collect()
}

/// Price is still pushing beyond `level` in the trend direction.
fn continues(direction: Direction, current_price: f64, level: f64) -> bool {
    match direction {
        Direction::Up => current_price > level,
        Direction::Down => current_price < level,
        _ => false,
    }
}

fn impulse_position(labels: &[WaveLabel], direction: Direction, current_price: f64) -> String {
    let Some(last) = labels.last() else {
        return "No waves identified".to_string();
    };
    let extending = continues(direction, current_price, last.point.price);

    match last.stage {
        WaveStage::Five | WaveStage::FifthExtension(_) if extending => {
            if matches!(last.stage, WaveStage::FifthExtension(n) if n > 1) {
                format!("Wave 5 extending {} (strong momentum)", direction)
            } else {
                format!("Wave 5 extending {}", direction)
            }
        }
        WaveStage::Five | WaveStage::FifthExtension(_) => "Wave 5 complete, ABC correction expected".to_string(),
        WaveStage::Four => "Wave iv correction in progress".to_string(),
        WaveStage::Three if extending => format!("Wave iii extending {} (strongest move)", direction),
        WaveStage::Three => "Wave iii possibly complete".to_string(),
        WaveStage::Two => "Wave ii correction in progress".to_string(),
        WaveStage::One => "Wave i in progress".to_string(),
        _ => "Pattern developing".to_string(),
    }
}

fn corrective_position(labels: &[WaveLabel]) -> &'static str {
    match labels.last().map(|l| l.stage) {
        None => "No waves identified",
        Some(WaveStage::C) => "Wave C in progress (correction ending soon)",
        Some(WaveStage::B) => "Wave B retracement in progress",
        Some(WaveStage::A | WaveStage::SecondA) => "Wave A of correction in progress",
        Some(_) => "Complex correction developing",
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Moves `price` by `distance` with (`true`) or against (`false`) the trend.
fn offset(price: f64, distance: f64, is_up: bool, with_trend: bool) -> f64 {
    if is_up == with_trend { price + distance } else { price - distance }
}

fn predict_impulse(labels: &[WaveLabel], is_up: bool, price: f64) -> WavePrediction {
    let Some(last) = labels.last() else {
        return WavePrediction::developing(price);
    };
    let sizes = leg_sizes(labels);
    let n = sizes.len();
    let trend = Direction::from_is_up(is_up);

    match last.stage {
        WaveStage::Five | WaveStage::FifthExtension(_) => {
            let wave1 = sizes.first().copied().unwrap_or(price * 0.05);
            let retrace = |ratio: f64| offset(price, wave1 * ratio, is_up, false);
            let current_wave = if continues(trend, price, last.point.price) {
                "Wave v in progress"
            } else {
                "Wave v complete"
            };
            WavePrediction {
                current_wave: current_wave.to_string(),
                next_wave: "ABC correction expected".to_string(),
                target_range: ordered(retrace(0.382), retrace(0.618)),
                direction: trend.opposite(),
                confidence: 0.7,
                timeframe_estimate: format!("{}-{} periods", n * 2, n * 4),
                key_levels: vec![
                    KeyLevel::new("0.236 retracement", retrace(0.236)),
                    KeyLevel::new("0.382 retracement", retrace(0.382)),
                    KeyLevel::new("0.618 retracement", retrace(0.618)),
                ],
                invalidation_level: labels[0].point.price,
            }
        }
        WaveStage::Four => {
            let wave1 = sizes.first().copied().unwrap_or(price * 0.05);
            let (min_target, max_target) = match sizes.get(2) {
                Some(&wave3) => (
                    offset(price, wave1 * 0.618, is_up, true),
                    offset(price, wave1.max(wave3 * 0.618), is_up, true),
                ),
                // Without a measured wave 3, aim 2-5% beyond the current price
                None => (
                    offset(price, price * 0.02, is_up, true),
                    offset(price, price * 0.05, is_up, true),
                ),
            };
            WavePrediction {
                current_wave: "Wave iv correction".to_string(),
                next_wave: "Wave v impulse expected".to_string(),
                target_range: ordered(min_target, max_target),
                direction: trend,
                confidence: 0.75,
                timeframe_estimate: format!("{}-{} periods", n, n * 2),
                key_levels: vec![
                    KeyLevel::new("Wave 1 target", offset(price, wave1, is_up, true)),
                    KeyLevel::new("0.618 extension", min_target),
                ],
                invalidation_level: labels.get(1).map(|l| l.point.price).unwrap_or(price * 0.95),
            }
        }
        WaveStage::Three => {
            // Wave 3 runs from its labeled start to the current price
            let mut wave3 = (price - last.point.price).abs();
            if wave3 == 0.0 {
                wave3 = sizes.last().copied().unwrap_or(price * 0.05);
            }
            let retrace = |ratio: f64| offset(price, wave3 * ratio, is_up, false);
            WavePrediction {
                current_wave: "Wave iii impulse (strongest move)".to_string(),
                next_wave: "Wave iv correction expected".to_string(),
                target_range: ordered(retrace(0.236), retrace(0.5)),
                direction: trend.opposite(),
                confidence: 0.8,
                timeframe_estimate: format!("{}-{} periods", n / 2, n),
                key_levels: vec![
                    KeyLevel::new("0.236 retracement", retrace(0.236)),
                    KeyLevel::new("0.382 retracement", retrace(0.382)),
                    KeyLevel::new("0.5 retracement", retrace(0.5)),
                ],
                invalidation_level: labels.get(1).map(|l| l.point.price).unwrap_or(price),
            }
        }
        _ => WavePrediction {
            current_wave: "Early impulse development".to_string(),
            next_wave: "Pattern developing".to_string(),
            target_range: (price * 0.95, price * 1.05),
            direction: Direction::Unclear,
            confidence: 0.4,
            timeframe_estimate: "Uncertain".to_string(),
            key_levels: Vec::new(),
            invalidation_level: labels[0].point.price,
        },
    }
}

fn predict_corrective(labels: &[WaveLabel], is_up: bool, price: f64) -> WavePrediction {
    match labels.last().map(|l| l.stage) {
        Some(WaveStage::C) => WavePrediction {
            current_wave: "Wave C of correction".to_string(),
            next_wave: "New impulse wave expected (correction ending)".to_string(),
            target_range: (price * 0.95, price * 1.1),
            // Against the correction
            direction: Direction::from_is_up(!is_up),
            confidence: 0.65,
            timeframe_estimate: "Starting soon".to_string(),
            key_levels: vec![KeyLevel::new("Correction end", price)],
            invalidation_level: labels[0].point.price,
        },
        Some(WaveStage::B) if labels.len() >= 2 => {
            let wave_a = (labels[1].point.price - labels[0].point.price).abs();
            let target = offset(price, wave_a, is_up, true);
            WavePrediction {
                current_wave: "Wave B retracement".to_string(),
                next_wave: "Wave C expected (final leg)".to_string(),
                target_range: ordered(target * 0.95, target * 1.05),
                direction: Direction::from_is_up(is_up),
                confidence: 0.7,
                timeframe_estimate: format!("{} periods", labels.len() * 2),
                key_levels: vec![
                    KeyLevel::new("Wave A equality", target),
                    KeyLevel::new("1.618 extension", offset(price, wave_a * 1.618, is_up, true)),
                ],
                invalidation_level: labels[0].point.price,
            }
        }
        _ => WavePrediction::developing(price),
    }
}
