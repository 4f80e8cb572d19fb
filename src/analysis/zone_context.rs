use serde::Serialize;
use strum_macros::Display;

use crate::models::{SupportResistanceZone, ZoneSet};

/// A strongest zone this close (percent) sets a firm bias
const NEAR_ZONE_PCT: f64 = 2.0;
/// Zones this close (percent) count as entry opportunities
const ENTRY_DISTANCE_PCT: f64 = 5.0;
const HIGH_CONFIDENCE_STRENGTH: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum ZoneBias {
    #[strum(serialize = "Bullish - Near strong support")]
    Bullish,
    #[strum(serialize = "Bearish - Near strong resistance")]
    Bearish,
    #[strum(serialize = "Cautiously Bullish - Support closer than resistance")]
    CautiouslyBullish,
    #[strum(serialize = "Cautiously Bearish - Resistance closer than support")]
    CautiouslyBearish,
    #[strum(serialize = "Neutral - Equidistant from zones")]
    Equidistant,
    #[strum(serialize = "Neutral - No clear zones")]
    NoZones,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum TradeSide {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum MarketStructure {
    #[strum(serialize = "Bullish structure (more support levels)")]
    Bullish,
    #[strum(serialize = "Bearish structure (more resistance levels)")]
    Bearish,
    #[strum(serialize = "Balanced structure")]
    Balanced,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryOpportunity {
    pub side: TradeSide,
    pub low: f64,
    pub high: f64,
    pub strength: f64,
    pub distance_pct: f64,
    pub high_confidence: bool,
}

/// Stop placed just beyond the strongest zone on one side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskLevel {
    pub side: TradeSide,
    pub level: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetZone {
    pub side: TradeSide,
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradingInsights {
    pub entry_opportunities: Vec<EntryOpportunity>,
    pub risk_levels: Vec<RiskLevel>,
    pub target_zones: Vec<TargetZone>,
    pub market_structure: MarketStructure,
}

/// Where the latest price sits relative to the synthesized zones
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneContext {
    pub market_context: String,
    pub in_support_zone: bool,
    pub in_resistance_zone: bool,
    pub current_zone_strength: f64,
    pub bias: ZoneBias,
    pub insights: TradingInsights,
}

pub fn zone_context(zones: &ZoneSet, current_price: f64) -> ZoneContext {
    let in_support = zones.support_zones.iter().find(|z| z.contains(current_price));
    let in_resistance = zones.resistance_zones.iter().find(|z| z.contains(current_price));

    let (market_context, current_zone_strength) = match (in_support, in_resistance) {
        (Some(zone), _) => (
            format!("Inside support zone (${:.2} - ${:.2})", zone.low, zone.high),
            zone.strength,
        ),
        (None, Some(zone)) => (
            format!("Inside resistance zone (${:.2} - ${:.2})", zone.low, zone.high),
            zone.strength,
        ),
        (None, None) => ("Between zones - no immediate S/R".to_string(), 0.0),
    };

    ZoneContext {
        market_context,
        in_support_zone: in_support.is_some(),
        in_resistance_zone: in_resistance.is_some(),
        current_zone_strength,
        bias: zone_bias(zones, current_price),
        insights: trading_insights(zones),
    }
}

/// Bias from the strongest zone on each side (zones are ranked strongest first).
pub fn zone_bias(zones: &ZoneSet, current_price: f64) -> ZoneBias {
    if zones.is_empty() {
        return ZoneBias::NoZones;
    }
    if current_price == 0.0 {
        return ZoneBias::Equidistant;
    }

    let support_distance = zones
        .support_zones
        .first()
        .map_or(f64::INFINITY, |z| (current_price - z.center) / current_price * 100.0);
    let resistance_distance = zones
        .resistance_zones
        .first()
        .map_or(f64::INFINITY, |z| (z.center - current_price) / current_price * 100.0);

    if support_distance > 0.0 && support_distance < NEAR_ZONE_PCT {
        ZoneBias::Bullish
    } else if resistance_distance > 0.0 && resistance_distance < NEAR_ZONE_PCT {
        ZoneBias::Bearish
    } else if support_distance < resistance_distance {
        ZoneBias::CautiouslyBullish
    } else if resistance_distance < support_distance {
        ZoneBias::CautiouslyBearish
    } else {
        ZoneBias::Equidistant
    }
}

pub fn trading_insights(zones: &ZoneSet) -> TradingInsights {
    let entry = |side: TradeSide, zone: &SupportResistanceZone| EntryOpportunity {
        side,
        low: zone.low,
        high: zone.high,
        strength: zone.strength,
        distance_pct: zone.distance_from_current_pct,
        high_confidence: zone.strength > HIGH_CONFIDENCE_STRENGTH,
    };

    let mut entry_opportunities: Vec<EntryOpportunity> = zones
        .support_zones
        .iter()
        .take(2)
        .filter(|z| z.distance_from_current_pct <= ENTRY_DISTANCE_PCT)
        .map(|z| entry(TradeSide::Long, z))
        .collect();
    entry_opportunities.extend(
        zones
            .resistance_zones
            .iter()
            .take(2)
            .filter(|z| z.distance_from_current_pct <= ENTRY_DISTANCE_PCT)
            .map(|z| entry(TradeSide::Short, z)),
    );

    let strongest_support = zones.support_zones.first();
    let strongest_resistance = zones.resistance_zones.first();

    let mut risk_levels = Vec::new();
    if let Some(zone) = strongest_support {
        risk_levels.push(RiskLevel {
            side: TradeSide::Long,
            level: zone.low,
            reason: "Break of strongest support zone".to_string(),
        });
    }
    if let Some(zone) = strongest_resistance {
        risk_levels.push(RiskLevel {
            side: TradeSide::Short,
            level: zone.high,
            reason: "Break of strongest resistance zone".to_string(),
        });
    }

    let mut target_zones = Vec::new();
    if let (Some(support), Some(resistance)) = (strongest_support, strongest_resistance) {
        target_zones.push(TargetZone {
            side: TradeSide::Long,
            low: resistance.low,
            high: resistance.high,
        });
        target_zones.push(TargetZone {
            side: TradeSide::Short,
            low: support.low,
            high: support.high,
        });
    }

    let market_structure = match zones.support_zones.len().cmp(&zones.resistance_zones.len()) {
        std::cmp::Ordering::Greater => MarketStructure::Bullish,
        std::cmp::Ordering::Less => MarketStructure::Bearish,
        std::cmp::Ordering::Equal => MarketStructure::Balanced,
    };

    TradingInsights {
        entry_opportunities,
        risk_levels,
        target_zones,
        market_structure,
    }
}

/// Plain-text zone ladder, highest zone first.
pub fn render_zones(zones: &ZoneSet) -> String {
    let mut all: Vec<(&str, &SupportResistanceZone)> = zones
        .support_zones
        .iter()
        .map(|z| ("SUP", z))
        .chain(zones.resistance_zones.iter().map(|z| ("RES", z)))
        .collect();
    if all.is_empty() {
        return "No zones identified".to_string();
    }
    all.sort_by(|a, b| b.1.center.total_cmp(&a.1.center));

    let mut out = Vec::new();
    out.push(format!("Current Price: ${:.2}", zones.current_price));
    out.push("=".repeat(60));

    for (tag, zone) in all {
        let glyph = if tag == "RES" { "▀" } else { "▄" };
        let bar = glyph.repeat((zone.strength / 10.0) as usize);
        out.push(format!("{} Zone: ${:.2} - ${:.2}", tag, zone.low, zone.high));
        out.push(format!(
            "  Center: ${:.2} ({:.1}% away)",
            zone.center, zone.distance_from_current_pct
        ));
        out.push(format!(
            "  Width: {:.2}% | Strength: {:.0}/100",
            zone.width_pct, zone.strength
        ));
        out.push(format!("  Sources: {}", zone.source_labels().join(", ")));
        out.push(format!("  Visual: {}", bar));
        out.push(String::new());
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ZoneKind, ZoneSource};
    use crate::utils::maths_utils::pct_distance;

    fn zone(center: f64, strength: f64, kind: ZoneKind, price: f64) -> SupportResistanceZone {
        let mut z = SupportResistanceZone::centered(center, center * 0.01, strength, ZoneSource::Fibonacci);
        z.kind = kind;
        z.distance_from_current_pct = pct_distance(center, price);
        z
    }

    fn set(price: f64, support: &[(f64, f64)], resistance: &[(f64, f64)]) -> ZoneSet {
        ZoneSet {
            current_price: price,
            support_zones: support.iter().map(|&(c, s)| zone(c, s, ZoneKind::Support, price)).collect(),
            resistance_zones: resistance
                .iter()
                .map(|&(c, s)| zone(c, s, ZoneKind::Resistance, price))
                .collect(),
        }
    }

    #[test]
    fn no_zones_is_neutral() {
        let ctx = zone_context(&ZoneSet::default(), 100.0);
        assert_eq!(ctx.bias, ZoneBias::NoZones);
        assert_eq!(ctx.market_context, "Between zones - no immediate S/R");
        assert_eq!(ctx.insights.market_structure, MarketStructure::Balanced);
    }

    #[test]
    fn near_support_is_bullish() {
        let zones = set(100.0, &[(98.5, 70.0)], &[(101.5, 60.0)]);
        assert_eq!(zone_bias(&zones, 100.0), ZoneBias::Bullish);
    }

    #[test]
    fn closer_resistance_is_cautiously_bearish() {
        let zones = set(100.0, &[(90.0, 70.0)], &[(104.0, 60.0)]);
        assert_eq!(zone_bias(&zones, 100.0), ZoneBias::CautiouslyBearish);
        assert_eq!(
            zone_bias(&zones, 100.0).to_string(),
            "Cautiously Bearish - Resistance closer than support"
        );
    }

    #[test]
    fn price_inside_a_zone_is_reported() {
        let mut zones = set(100.0, &[(99.8, 80.0)], &[]);
        zones.support_zones[0].low = 99.0;
        zones.support_zones[0].high = 100.5;
        let ctx = zone_context(&zones, 100.0);
        assert!(ctx.in_support_zone);
        assert!(!ctx.in_resistance_zone);
        assert_eq!(ctx.market_context, "Inside support zone ($99.00 - $100.50)");
        assert!((ctx.current_zone_strength - 80.0).abs() < 1e-9);
    }

    #[test]
    fn insights_pick_nearby_entries_stops_and_targets() {
        let zones = set(100.0, &[(97.0, 75.0), (85.0, 60.0)], &[(103.0, 50.0)]);
        let insights = trading_insights(&zones);

        assert_eq!(insights.entry_opportunities.len(), 2);
        assert!(insights.entry_opportunities[0].high_confidence);
        assert_eq!(insights.entry_opportunities[1].side, TradeSide::Short);
        assert_eq!(insights.risk_levels.len(), 2);
        assert_eq!(insights.target_zones.len(), 2);
        assert_eq!(insights.market_structure, MarketStructure::Bullish);
    }

    #[test]
    fn ladder_lists_highest_zone_first() {
        let zones = set(100.0, &[(95.0, 60.0)], &[(105.0, 40.0)]);
        let text = render_zones(&zones);
        let res = text.find("RES Zone").unwrap();
        let sup = text.find("SUP Zone").unwrap();
        assert!(text.starts_with("Current Price: $100.00"));
        assert!(res < sup);
        assert!(text.contains("Visual: ▄▄▄▄▄▄"));
        assert_eq!(render_zones(&ZoneSet::default()), "No zones identified");
    }
}
