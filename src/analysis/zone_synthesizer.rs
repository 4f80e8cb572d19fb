use rayon::prelude::*;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

#[allow(unused_imports)]
use crate::config::PRINT_ZONE_SOURCES;
use crate::config::{FibImportance, ZoneParams};
use crate::domain::{PriceSeries, SwingKind, SwingPoint};
use crate::models::{FibonacciLevel, PivotLevel, SupportResistanceZone, ZoneKind, ZoneSet, ZoneSource};
use crate::utils::maths_utils::{
    RangeF64, get_min_max, mean, median, normalize_max, pct_change, pct_distance, percentile, rolling_std,
    sample_std_dev,
};

use super::zone_merger::merge_overlapping_zones;

/// Share of the ATR used when there is too little data to measure it
const ATR_FALLBACK_PCT: f64 = 0.02;

/// Independent zone generators. Each one skips itself when its inputs are missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum ZoneMethod {
    #[strum(serialize = "volume profile")]
    VolumeProfile,
    #[strum(serialize = "wave structure")]
    WaveStructure,
    #[strum(serialize = "fibonacci")]
    Fibonacci,
    #[strum(serialize = "consolidation")]
    Consolidation,
    #[strum(serialize = "dynamic pivots")]
    DynamicPivots,
}

/// Builds support/resistance zones for one series.
///
/// ATR and the volatility factor are measured once up front and shared by all
/// generators.
pub struct ZoneSynthesizer<'a> {
    series: &'a PriceSeries,
    params: ZoneParams,
    current_price: f64,
    atr: f64,
    volatility_factor: f64,
}

impl<'a> ZoneSynthesizer<'a> {
    pub fn new(series: &'a PriceSeries, params: ZoneParams) -> Self {
        let current_price = series.last_price().unwrap_or(0.0);
        let atr = average_true_range(series, params.atr_period);
        let volatility_factor = volatility_factor(&series.closes, params.volatility_window, params.volatility_factor_bounds);
        Self {
            series,
            params,
            current_price,
            atr,
            volatility_factor,
        }
    }

    pub fn atr(&self) -> f64 {
        self.atr
    }

    pub fn volatility_factor(&self) -> f64 {
        self.volatility_factor
    }

    /// Runs every generator, merges overlaps, then filters, clamps and ranks.
    pub fn synthesize(&self, swings: &[SwingPoint], fibonacci_levels: &[FibonacciLevel]) -> ZoneSet {
        if self.series.is_empty() {
            log::warn!("{}: no prices, zone synthesis skipped", self.series.symbol);
            return ZoneSet::default();
        }

        let methods: Vec<ZoneMethod> = ZoneMethod::iter().collect();
        let per_method: Vec<Vec<SupportResistanceZone>> = methods
            .par_iter()
            .map(|&method| self.generate(method, swings, fibonacci_levels))
            .collect();

        #[cfg(debug_assertions)]
        if PRINT_ZONE_SOURCES {
            for (method, zones) in methods.iter().zip(&per_method) {
                log::info!("{}: {} zones from {}", self.series.symbol, zones.len(), method);
            }
        }

        let merged = merge_overlapping_zones(per_method.concat(), self.params.overlap_threshold_pct);
        classify_and_rank(merged, self.current_price, &self.params)
    }

    pub fn generate(
        &self,
        method: ZoneMethod,
        swings: &[SwingPoint],
        fibonacci_levels: &[FibonacciLevel],
    ) -> Vec<SupportResistanceZone> {
        match method {
            ZoneMethod::VolumeProfile => self.volume_profile_zones(),
            ZoneMethod::WaveStructure => self.wave_zones(swings),
            ZoneMethod::Fibonacci => self.fibonacci_zones(fibonacci_levels),
            ZoneMethod::Consolidation => self.consolidation_zones(),
            ZoneMethod::DynamicPivots => self.pivot_zones(),
        }
    }

    fn volume_profile_zones(&self) -> Vec<SupportResistanceZone> {
        let Some(volumes) = self.series.volumes() else {
            log::debug!("{}: no volume data, volume profile skipped", self.series.symbol);
            return Vec::new();
        };
        let closes = &self.series.closes;
        if closes.len() < self.params.volume_min_samples {
            return Vec::new();
        }
        let Some((min_price, max_price)) = get_min_max(closes) else {
            return Vec::new();
        };
        if max_price <= min_price {
            return Vec::new();
        }

        let range = RangeF64::new(min_price, max_price, self.params.volume_bins);
        let mut profile = vec![0.0; range.n_chunks()];
        let mut hits = vec![0usize; range.n_chunks()];
        for (&price, &volume) in closes.iter().zip(volumes) {
            if let Some(bin) = range.chunk_index(price) {
                profile[bin] += volume;
                hits[bin] += 1;
            }
        }

        let traded: Vec<f64> = profile.iter().copied().filter(|v| *v > 0.0).collect();
        let Some(threshold) = percentile(&traded, self.params.volume_percentile) else {
            return Vec::new();
        };
        let shares = normalize_max(&profile);

        profile
            .iter()
            .enumerate()
            .filter(|&(_, &volume)| volume > 0.0 && volume >= threshold)
            .map(|(bin, _)| {
                let share = shares[bin];
                let width = range.chunk_size() * (1.0 + share);
                SupportResistanceZone::centered(
                    range.chunk_center(bin),
                    width,
                    50.0 + share * 40.0,
                    ZoneSource::VolumeProfile,
                )
                .with_touches(hits[bin])
                .with_volume_concentration(share)
            })
            .collect()
    }

    fn wave_zones(&self, swings: &[SwingPoint]) -> Vec<SupportResistanceZone> {
        let closes = &self.series.closes;
        let timestamps = &self.series.timestamps_ms;
        if closes.is_empty() {
            return Vec::new();
        }
        let window = self.params.wave_local_window;
        let recent = &swings[swings.len().saturating_sub(self.params.wave_zone_lookback)..];

        recent
            .iter()
            .filter(|point| point.price.is_finite())
            .map(|point| {
                let idx = timestamps
                    .partition_point(|&ts| ts < point.timestamp_ms)
                    .min(closes.len() - 1);
                let start = idx.saturating_sub(window);
                let end = (idx + window).min(closes.len());
                let local_volatility = sample_std_dev(&pct_change(&closes[start..end])).unwrap_or(0.0);

                let width = self.atr * self.volatility_factor * (1.0 + local_volatility * 10.0);
                let price = point.price;
                // Highs lean upward (resistance), lows lean downward (support)
                let (low, high) = match point.kind {
                    SwingKind::High => (price - width * 0.3, price + width * 0.7),
                    SwingKind::Low => (price - width * 0.7, price + width * 0.3),
                };

                SupportResistanceZone::new(price, low, high, 60.0, ZoneSource::ElliottWave)
                    .with_touches(1)
                    .with_last_test(Some(point.timestamp_ms))
            })
            .collect()
    }

    fn fibonacci_zones(&self, levels: &[FibonacciLevel]) -> Vec<SupportResistanceZone> {
        levels
            .iter()
            .filter(|level| level.price > 0.0 && level.price.is_finite())
            .map(|level| {
                let importance = self.fibonacci_importance(level.ratio);
                let width = self.atr * self.volatility_factor * importance.width_mult;
                SupportResistanceZone::centered(level.price, width, importance.strength, ZoneSource::Fibonacci)
            })
            .collect()
    }

    fn fibonacci_importance(&self, ratio: f64) -> FibImportance {
        self.params
            .fibonacci_importance
            .iter()
            .find(|entry| (entry.ratio - ratio).abs() < 1e-6)
            .copied()
            .unwrap_or(self.params.fibonacci_fallback)
    }

    fn consolidation_zones(&self) -> Vec<SupportResistanceZone> {
        let closes = &self.series.closes;
        let window = self.params.consolidation_window;
        if window == 0 || closes.len() < window * 2 {
            return Vec::new();
        }

        let rolling = rolling_std(closes, window);
        let defined: Vec<f64> = rolling.iter().flatten().copied().collect();
        let Some(median_std) = median(&defined) else {
            return Vec::new();
        };
        let threshold = median_std * self.params.consolidation_std_ratio;
        let calm: Vec<bool> = rolling
            .iter()
            .map(|std| matches!(std, Some(value) if *value < threshold))
            .collect();

        let mut zones = Vec::new();
        let mut i = 0;
        while i < calm.len() {
            if !calm[i] {
                i += 1;
                continue;
            }
            let run_start = i;
            while i < calm.len() && calm[i] {
                i += 1;
            }
            let run_len = i - run_start;

            // The first calm window reaches back `window - 1` samples
            let prices = &closes[run_start + 1 - window..i];
            let (Some((low, high)), Some(center)) = (get_min_max(prices), mean(prices)) else {
                continue;
            };
            if center <= 0.0 || (high - low) / center * 100.0 <= self.params.consolidation_min_range_pct {
                continue;
            }

            zones.push(
                SupportResistanceZone::new(
                    center,
                    low,
                    high,
                    30.0 + (run_len as f64).min(30.0),
                    ZoneSource::Consolidation,
                )
                .with_touches(run_len)
                .with_last_test(Some(self.series.timestamps_ms[i - 1])),
            );
        }
        zones
    }

    fn pivot_zones(&self) -> Vec<SupportResistanceZone> {
        if self.series.len() < 2 {
            return Vec::new();
        }
        let close = self.current_price;
        let high = self.series.highs().and_then(|h| h.last().copied()).unwrap_or(close);
        let low = self.series.lows().and_then(|l| l.last().copied()).unwrap_or(close);

        let pivot = (high + low + close) / 3.0;
        let range = high - low;
        let width = range * 0.25 * self.volatility_factor;

        [
            (PivotLevel::S2, pivot - range, 30.0),
            (PivotLevel::S1, 2.0 * pivot - high, 40.0),
            (PivotLevel::Pivot, pivot, 50.0),
            (PivotLevel::R1, 2.0 * pivot - low, 40.0),
            (PivotLevel::R2, pivot + range, 30.0),
        ]
        .into_iter()
        .filter(|(_, level, _)| *level > 0.0 && level.is_finite())
        .map(|(label, level, strength)| {
            SupportResistanceZone::centered(level, width, strength, ZoneSource::Pivot(label))
        })
        .collect()
    }
}

/// Convenience wrapper: one synthesizer, one call.
pub fn synthesize_zones(
    series: &PriceSeries,
    swings: &[SwingPoint],
    fibonacci_levels: &[FibonacciLevel],
    params: &ZoneParams,
) -> ZoneSet {
    ZoneSynthesizer::new(series, *params).synthesize(swings, fibonacci_levels)
}

/// Average true range over the last `period` samples.
///
/// Uses high/low/close when available, otherwise estimates it from the
/// standard deviation of returns. Short series fall back to 2% of the last price.
pub fn average_true_range(series: &PriceSeries, period: usize) -> f64 {
    let Some(last) = series.last_price() else {
        return 0.0;
    };
    let fallback = last * ATR_FALLBACK_PCT;
    let closes = &series.closes;

    match (series.highs(), series.lows()) {
        (Some(highs), Some(lows)) => {
            if period == 0 || closes.len() < period {
                return fallback;
            }
            let true_ranges: Vec<f64> = (closes.len() - period..closes.len())
                .map(|i| {
                    let high_low = highs[i] - lows[i];
                    if i == 0 {
                        high_low
                    } else {
                        let prev_close = closes[i - 1];
                        high_low
                            .max((highs[i] - prev_close).abs())
                            .max((lows[i] - prev_close).abs())
                    }
                })
                .collect();
            mean(&true_ranges).unwrap_or(fallback)
        }
        _ => match sample_std_dev(&series.returns()) {
            Some(sd) => sd * last * (period as f64).sqrt(),
            None => fallback,
        },
    }
}

/// Recent-vs-historical volatility ratio, clamped to `bounds`. 1.0 when undetermined.
pub fn volatility_factor(closes: &[f64], window: usize, bounds: (f64, f64)) -> f64 {
    if window == 0 || closes.len() < window {
        return 1.0;
    }
    let recent = sample_std_dev(&pct_change(&closes[closes.len() - window..]));
    let historical = sample_std_dev(&pct_change(closes));
    match (recent, historical) {
        (Some(recent), Some(historical)) if historical > 0.0 => (recent / historical).clamp(bounds.0, bounds.1),
        _ => 1.0,
    }
}

/// Scales a zone's bounds about its center so its width stays within
/// `[min_pct, max_pct]` of the center price.
pub fn clamp_zone_width(zone: &mut SupportResistanceZone, min_pct: f64, max_pct: f64) {
    if zone.center <= 0.0 {
        return;
    }
    let width = zone.width();
    let width_pct = width / zone.center * 100.0;
    let target_pct = if width_pct < min_pct {
        min_pct
    } else if width_pct > max_pct {
        max_pct
    } else {
        return;
    };
    let target = zone.center * target_pct / 100.0;

    if width > 0.0 {
        let scale = target / width;
        zone.low = zone.center - (zone.center - zone.low) * scale;
        zone.high = zone.center + (zone.high - zone.center) * scale;
    } else {
        zone.low = zone.center - target / 2.0;
        zone.high = zone.center + target / 2.0;
    }
    zone.refresh_width_pct();
}

/// Distance filter, width clamp, support/resistance split and ranking.
pub fn classify_and_rank(zones: Vec<SupportResistanceZone>, current_price: f64, params: &ZoneParams) -> ZoneSet {
    let mut support_zones = Vec::new();
    let mut resistance_zones = Vec::new();

    for mut zone in zones {
        let distance = pct_distance(zone.center, current_price);
        if distance < params.min_distance_pct || distance > params.max_distance_pct {
            continue;
        }
        zone.distance_from_current_pct = distance;
        clamp_zone_width(&mut zone, params.min_zone_width_pct, params.max_zone_width_pct);

        if zone.center < current_price {
            zone.kind = ZoneKind::Support;
            support_zones.push(zone);
        } else {
            zone.kind = ZoneKind::Resistance;
            resistance_zones.push(zone);
        }
    }

    for side in [&mut support_zones, &mut resistance_zones] {
        side.sort_by(|a, b| {
            b.strength
                .total_cmp(&a.strength)
                .then(a.distance_from_current_pct.total_cmp(&b.distance_from_current_pct))
        });
        side.truncate(params.max_zones);
    }

    ZoneSet {
        current_price,
        support_zones,
        resistance_zones,
    }
}
