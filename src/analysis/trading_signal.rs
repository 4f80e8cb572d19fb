use crate::models::{Direction, LabelingResult, SignalKind, TradingSignal};

/// Reads the wave prediction into a trade plan.
///
/// Classification matches fixed phrases of the current-wave description;
/// entries, stops and targets are fixed offsets from the current price and
/// the invalidation level.
pub fn generate_signal(result: &LabelingResult, current_price: f64) -> TradingSignal {
    let Some(scenario) = result.scenario.filter(|_| result.is_identified()) else {
        return TradingSignal::neutral("No clear wave pattern");
    };
    let prediction = &result.prediction;
    let current_wave = prediction.current_wave.as_str();
    let p = current_price;

    let mut signal = TradingSignal {
        confidence: prediction.confidence,
        ..TradingSignal::neutral("No actionable wave position")
    };

    if current_wave.contains("Wave iii") && scenario.is_impulse() {
        // Ride the strongest wave in the impulse direction
        if scenario.is_down() {
            signal.kind = SignalKind::Sell;
            signal.reason = "Wave iii impulse down - strongest move".to_string();
            signal.stop_loss = Some(prediction.invalidation_level * 1.02);
            signal.take_profit = vec![p * 0.95, p * 0.90, p * 0.85];
        } else {
            signal.kind = SignalKind::Buy;
            signal.reason = "Wave iii impulse up - strongest move".to_string();
            signal.stop_loss = Some(prediction.invalidation_level * 0.98);
            signal.take_profit = vec![p * 1.05, p * 1.10, p * 1.15];
        }
        signal.entry_zone = Some((p * 0.99, p * 1.01));
    } else if current_wave.contains("Wave v") && current_wave.contains("complete") {
        // Counter-trend: trade the expected correction, nearest target first
        let (lo, hi) = prediction.target_range;
        signal.reason = "Wave v complete - correction starting".to_string();
        signal.entry_zone = Some((p * 0.995, p * 1.005));
        if prediction.direction == Direction::Down {
            signal.kind = SignalKind::Sell;
            signal.stop_loss = Some(p * 1.02);
            signal.take_profit = vec![hi, lo];
        } else {
            signal.kind = SignalKind::Buy;
            signal.stop_loss = Some(p * 0.98);
            signal.take_profit = vec![lo, hi];
        }
    } else if current_wave.contains("Wave iv") {
        signal.kind = SignalKind::Wait;
        signal.reason = "Wave iv correction - wait for completion".to_string();
        signal.entry_zone = Some(prediction.target_range);
    } else if current_wave.contains("Wave C") && prediction.next_wave.contains("ending") {
        if scenario.is_down() {
            signal.kind = SignalKind::BuyPrepare;
            signal.reason = "Wave C ending - major bottom forming".to_string();
        } else {
            signal.kind = SignalKind::SellPrepare;
            signal.reason = "Wave C ending - major top forming".to_string();
        }
    }

    if let (Some(stop), Some(&first_target)) = (signal.stop_loss, signal.take_profit.first()) {
        let risk = (p - stop).abs();
        let reward = (first_target - p).abs();
        signal.risk_reward = Some(if risk > 0.0 { reward / risk } else { 0.0 });
    }

    signal
}
