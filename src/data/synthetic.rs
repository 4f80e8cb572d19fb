use crate::domain::PriceSeries;
use crate::utils::time_utils::TimeUtils;

const START_TIMESTAMP_MS: i64 = 1_700_000_000_000;
const INTERVAL_MS: i64 = TimeUtils::MS_IN_H;

/// One five-wave advance and a three-wave pullback: (fractional move, steps)
const CYCLE: [(f64, usize); 8] = [
    (0.12, 10),
    (-0.06, 6),
    (0.20, 14),
    (-0.07, 6),
    (0.12, 10),
    (-0.10, 8),
    (0.05, 5),
    (-0.10, 8),
];

const NOISE_PCT: f64 = 0.003;
const BAR_RANGE_PCT: f64 = 0.002;

/// Linear congruential generator: reproducible noise without a rand dependency.
struct Lcg(u64);

impl Lcg {
    /// Uniform in [-1, 1)
    fn next_signed(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0
    }
}

/// Deterministic Elliott-shaped series with volume and high/low, `len` hourly bars.
///
/// The same `(len, seed)` always gives the same series; the seed shifts the
/// starting price and the noise.
pub fn synthetic_impulse_series(symbol: &str, len: usize, seed: u64) -> PriceSeries {
    let mut rng = Lcg(seed.wrapping_add(0x9E37_79B9_7F4A_7C15));
    let mut closes = Vec::with_capacity(len);
    let mut volumes = Vec::with_capacity(len);
    let mut highs = Vec::with_capacity(len);
    let mut lows = Vec::with_capacity(len);

    let mut anchor = 100.0 + (seed % 50) as f64;

    'outer: for (move_pct, steps) in CYCLE.iter().cycle() {
        let target = anchor * (1.0 + move_pct);
        let step_ratio = (target / anchor).powf(1.0 / *steps as f64);
        let trending_volume = if *move_pct > 0.0 { 1_500.0 } else { 900.0 };

        for step in 1..=*steps {
            if closes.len() >= len {
                break 'outer;
            }
            let clean = anchor * step_ratio.powi(step as i32);
            let close = clean * (1.0 + rng.next_signed() * NOISE_PCT);
            let spread = close * (BAR_RANGE_PCT + rng.next_signed().abs() * BAR_RANGE_PCT);

            closes.push(close);
            highs.push(close + spread);
            lows.push(close - spread);
            volumes.push(trending_volume * (1.0 + rng.next_signed() * 0.3));
        }
        anchor = target;
    }

    let timestamps_ms = (0..closes.len() as i64)
        .map(|i| START_TIMESTAMP_MS + i * INTERVAL_MS)
        .collect();

    // Lengths match and every value is finite by construction
    PriceSeries {
        symbol: symbol.to_string(),
        timestamps_ms,
        closes,
        volumes: Some(volumes),
        highs: Some(highs),
        lows: Some(lows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::detect_swings;
    use crate::config::ANALYSIS;

    #[test]
    fn same_seed_same_series() {
        let a = synthetic_impulse_series("A", 100, 9);
        let b = synthetic_impulse_series("A", 100, 9);
        assert_eq!(a, b);
        assert_ne!(a.closes, synthetic_impulse_series("A", 100, 10).closes);
    }

    #[test]
    fn series_is_well_formed() {
        let s = synthetic_impulse_series("A", 250, 4);
        assert_eq!(s.len(), 250);
        assert!(s.validate().is_ok());
        assert!(s.has_volume() && s.has_ohlc());
        let (highs, lows) = (s.highs().unwrap(), s.lows().unwrap());
        for i in 0..s.len() {
            assert!(lows[i] <= s.closes[i] && s.closes[i] <= highs[i]);
        }
    }

    #[test]
    fn swings_follow_the_wave_legs() {
        let s = synthetic_impulse_series("A", 134, 2);
        let swings = detect_swings(&s, &ANALYSIS.swing);
        // Two full cycles of eight legs
        assert!(swings.len() >= 12, "got {} swings", swings.len());
    }
}
