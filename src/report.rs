use std::fmt::Write;

use itertools::Itertools;

use crate::analysis::render_zones;
use crate::engine::MarketAnalysis;
use crate::utils::time_utils::{TimeUtils, epoch_ms_to_utc_detailed};

fn price_list(prices: &[f64]) -> String {
    prices.iter().map(|p| format!("${:.2}", p)).join(", ")
}

/// Plain-text report of one analysis, as printed by the CLI.
pub fn render_report(analysis: &MarketAnalysis, interval_ms: Option<i64>) -> String {
    let mut out = String::new();
    let when = analysis
        .last_timestamp_ms
        .map_or_else(|| "n/a".to_string(), epoch_ms_to_utc_detailed);
    let interval = interval_ms.map_or("n/a", TimeUtils::interval_to_string);

    // Writing to a String cannot fail
    let _ = writeln!(
        out,
        "=== {} | {} ({}) | last ${:.2} ===",
        analysis.symbol, when, interval, analysis.current_price
    );
    let _ = writeln!(
        out,
        "Degree: {} ({})",
        analysis.degree,
        analysis.degree.timeframe()
    );

    let stats = &analysis.summary.statistics;
    let _ = writeln!(
        out,
        "Swings: {} | Patterns: {} ({} impulse, {} corrective) | Avg confidence {:.2}",
        analysis.swings.len(),
        stats.total,
        stats.impulse,
        stats.corrective,
        stats.avg_confidence
    );
    let _ = writeln!(out, "Analysis quality: {}", analysis.summary.quality);

    if let Some(current) = &analysis.summary.current {
        let _ = writeln!(
            out,
            "Active {} pattern: {} ({:.0}% complete), support ${:.2}, resistance ${:.2}",
            current.pattern_kind, current.current_wave, current.completion_pct, current.support, current.resistance
        );
    }
    let targets = &analysis.summary.next_targets;
    if let Some(target) = targets.correction_target {
        let _ = writeln!(out, "Correction target: ${:.2}", target);
    }
    if let Some(target) = targets.extension_target {
        let _ = writeln!(out, "Extension target: ${:.2}", target);
    }

    out.push('\n');
    let labeling = &analysis.labeling;
    match labeling.scenario {
        Some(scenario) => {
            let _ = writeln!(out, "Wave count: {} ({:.0}%)", scenario, labeling.confidence * 100.0);
        }
        None => {
            let _ = writeln!(out, "Wave count: {}", labeling.status);
        }
    }
    if !labeling.labeled_waves.is_empty() {
        let labels = labeling
            .labeled_waves
            .iter()
            .map(|w| format!("{} ${:.2}", w.label, w.point.price))
            .join(" | ");
        let _ = writeln!(out, "  Labels: {}", labels);
    }
    let prediction = &labeling.prediction;
    let _ = writeln!(out, "  Now: {}", prediction.current_wave);
    let _ = writeln!(out, "  Next: {} ({})", prediction.next_wave, prediction.direction);
    let _ = writeln!(
        out,
        "  Target ${:.2} - ${:.2}, invalidation ${:.2}, {}",
        prediction.target_range.0, prediction.target_range.1, prediction.invalidation_level, prediction.timeframe_estimate
    );
    for level in &prediction.key_levels {
        let _ = writeln!(out, "  {}: ${:.2}", level.name, level.price);
    }
    for alt in &labeling.alternatives {
        let _ = writeln!(out, "  Alternative: {} ({:.0}%)", alt.scenario, alt.confidence * 100.0);
    }
    for note in &labeling.key_observations {
        let _ = writeln!(out, "  * {}", note);
    }

    let signal = &analysis.signal;
    let _ = writeln!(out, "\nSignal: {} - {}", signal.kind, signal.reason);
    if let Some((lo, hi)) = signal.entry_zone {
        let _ = writeln!(out, "  Entry ${:.2} - ${:.2}", lo, hi);
    }
    if let Some(stop) = signal.stop_loss {
        let _ = writeln!(out, "  Stop ${:.2}", stop);
    }
    if !signal.take_profit.is_empty() {
        let _ = writeln!(out, "  Targets {}", price_list(&signal.take_profit));
    }
    if let Some(rr) = signal.risk_reward {
        let _ = writeln!(out, "  Risk/reward {:.2}", rr);
    }

    let _ = writeln!(out, "\n{}", render_zones(&analysis.zones));
    let context = &analysis.zone_context;
    let _ = writeln!(out, "Zone context: {}", context.market_context);
    let _ = writeln!(out, "Zone bias: {}", context.bias);
    let _ = writeln!(out, "Market structure: {}", context.insights.market_structure);

    let quality = &analysis.data_quality;
    let _ = writeln!(out, "\nData quality: {}/100 ({})", quality.score, quality.level);
    for factor in &quality.factors {
        let _ = writeln!(out, "  + {}", factor);
    }
    for rec in &quality.recommendations {
        let _ = writeln!(out, "  > {}", rec);
    }

    if let Some(multi) = &analysis.multi_degree {
        let _ = writeln!(out, "\nMulti-degree analysis:");
        for degree in &multi.degrees {
            let _ = writeln!(
                out,
                "  {:<12} swing {:>4.1}%  swings {:>3}  patterns {:>3}  {}",
                degree.degree.to_string(),
                degree.swing_pct,
                degree.swing_count,
                degree.pattern_count,
                degree.summary.quality
            );
        }
        for zone in &multi.confluence_zones {
            let degrees = zone.degrees.iter().join(", ");
            let _ = writeln!(
                out,
                "  Confluence ${:.2}: {} levels from {} ({:.1}% away)",
                zone.price,
                zone.strength,
                degrees,
                zone.distance_from_current_pct
            );
        }
    }

    out
}
