use crate::config::SwingSettings;
#[allow(unused_imports)]
use crate::config::PRINT_SWING_DETECTION;
use crate::domain::{PriceSeries, SwingKind, SwingPoint};
use crate::utils::maths_utils::safe_ratio;

/// Zigzag swing extraction.
///
/// Tracks a running trend and the most extreme close seen in that direction.
/// A reversal of at least `min_swing_pct` from the tracked extreme confirms it
/// as a swing point, flips the trend and restarts tracking from the reversal
/// bar. The last tracked extreme is always emitted as a terminal point.
///
/// Series shorter than `settings.min_samples` yield no swings.
pub fn detect_swings(series: &PriceSeries, settings: &SwingSettings) -> Vec<SwingPoint> {
    let prices = &series.closes;
    let timestamps = &series.timestamps_ms;

    if prices.len() < settings.min_samples.max(2) {
        log::debug!(
            "{}: {} samples, need {} for swing detection",
            series.symbol,
            prices.len(),
            settings.min_samples
        );
        return Vec::new();
    }

    let threshold = settings.min_swing_pct / 100.0;
    let mut swings = Vec::new();

    let mut trend = if prices[0] < prices[1] {
        SwingKind::High
    } else {
        SwingKind::Low
    };
    let mut extreme_idx = 0;
    let mut extreme_price = prices[0];

    for (i, &price) in prices.iter().enumerate().skip(1) {
        let (extends, reversal) = match trend {
            SwingKind::High => (price > extreme_price, safe_ratio(extreme_price - price, extreme_price)),
            SwingKind::Low => (price < extreme_price, safe_ratio(price - extreme_price, extreme_price)),
        };

        if extends {
            extreme_idx = i;
            extreme_price = price;
        } else if reversal >= threshold && reversal > 0.0 {
            let swing = SwingPoint::new(extreme_idx, timestamps[extreme_idx], extreme_price, trend);

            #[cfg(debug_assertions)]
            if PRINT_SWING_DETECTION {
                log::info!("{}: swing {} (reversal {:.2}%)", series.symbol, swing, reversal * 100.0);
            }

            swings.push(swing);
            trend = trend.opposite();
            extreme_idx = i;
            extreme_price = price;
        }
    }

    swings.push(SwingPoint::new(extreme_idx, timestamps[extreme_idx], extreme_price, trend));
    swings
}
