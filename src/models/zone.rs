use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Support or resistance, decided against the latest price at classification time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ZoneKind {
    /// Freshly generated or merged, not yet classified
    Pending,
    Support,
    Resistance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display)]
pub enum PivotLevel {
    S2,
    S1,
    Pivot,
    R1,
    R2,
}

/// Evidence a zone was derived from. Merging unions these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneSource {
    VolumeProfile,
    ElliottWave,
    Fibonacci,
    Consolidation,
    Pivot(PivotLevel),
}

impl fmt::Display for ZoneSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ZoneSource::VolumeProfile => write!(f, "volume_profile"),
            ZoneSource::ElliottWave => write!(f, "elliott_wave"),
            ZoneSource::Fibonacci => write!(f, "fibonacci"),
            ZoneSource::Consolidation => write!(f, "consolidation"),
            ZoneSource::Pivot(level) => write!(f, "pivot_{}", level),
        }
    }
}

/// A price interval acting as support or resistance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportResistanceZone {
    pub center: f64,
    pub low: f64,
    pub high: f64,
    /// Width in percent of the center price
    pub width_pct: f64,
    /// 0 ..= 100
    pub strength: f64,
    pub kind: ZoneKind,
    pub sources: BTreeSet<ZoneSource>,
    pub touch_count: usize,
    /// 0 ..= 1
    pub volume_concentration: f64,
    pub last_test_ms: Option<i64>,
    pub distance_from_current_pct: f64,
}

impl SupportResistanceZone {
    /// Zone spanning `[low, high]` around `center`, not yet classified.
    pub fn new(center: f64, low: f64, high: f64, strength: f64, source: ZoneSource) -> Self {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let mut zone = Self {
            center,
            low,
            high,
            width_pct: 0.0,
            strength: strength.clamp(0.0, 100.0),
            kind: ZoneKind::Pending,
            sources: BTreeSet::from([source]),
            touch_count: 0,
            volume_concentration: 0.0,
            last_test_ms: None,
            distance_from_current_pct: 0.0,
        };
        zone.refresh_width_pct();
        zone
    }

    /// Symmetric zone of absolute `width` around `center`.
    pub fn centered(center: f64, width: f64, strength: f64, source: ZoneSource) -> Self {
        let half = width.abs() / 2.0;
        Self::new(center, center - half, center + half, strength, source)
    }

    pub fn with_touches(mut self, touch_count: usize) -> Self {
        self.touch_count = touch_count;
        self
    }

    pub fn with_volume_concentration(mut self, volume_concentration: f64) -> Self {
        self.volume_concentration = volume_concentration.clamp(0.0, 1.0);
        self
    }

    pub fn with_last_test(mut self, last_test_ms: Option<i64>) -> Self {
        self.last_test_ms = last_test_ms;
        self
    }

    /// Absolute width in price units
    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    pub fn refresh_width_pct(&mut self) {
        self.width_pct = if self.center != 0.0 {
            self.width() / self.center.abs() * 100.0
        } else {
            0.0
        };
    }

    pub fn contains(&self, price: f64) -> bool {
        self.low <= price && price <= self.high
    }

    /// Share of *this* zone's width covered by `other`, 0 ..= 100.
    pub fn overlap_percentage(&self, other: &SupportResistanceZone) -> f64 {
        let overlap_low = self.low.max(other.low);
        let overlap_high = self.high.min(other.high);
        if overlap_low >= overlap_high {
            return 0.0;
        }
        let own_width = self.width();
        if own_width > 0.0 {
            (overlap_high - overlap_low) / own_width * 100.0
        } else {
            0.0
        }
    }

    pub fn source_labels(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.to_string()).collect()
    }
}

/// Ranked zones on each side of the current price
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneSet {
    pub current_price: f64,
    pub support_zones: Vec<SupportResistanceZone>,
    pub resistance_zones: Vec<SupportResistanceZone>,
}

impl ZoneSet {
    pub fn is_empty(&self) -> bool {
        self.support_zones.is_empty() && self.resistance_zones.is_empty()
    }

    pub fn all(&self) -> impl Iterator<Item = &SupportResistanceZone> {
        self.support_zones.iter().chain(self.resistance_zones.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_is_relative_to_own_width() {
        let wide = SupportResistanceZone::new(100.0, 95.0, 105.0, 50.0, ZoneSource::Fibonacci);
        let narrow = SupportResistanceZone::new(104.0, 103.0, 105.0, 50.0, ZoneSource::ElliottWave);
        assert!((wide.overlap_percentage(&narrow) - 20.0).abs() < 1e-9);
        assert!((narrow.overlap_percentage(&wide) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_or_touching_zones_do_not_overlap() {
        let a = SupportResistanceZone::new(100.0, 99.0, 101.0, 50.0, ZoneSource::Fibonacci);
        let b = SupportResistanceZone::new(102.0, 101.0, 103.0, 50.0, ZoneSource::Fibonacci);
        assert_eq!(a.overlap_percentage(&b), 0.0);
    }

    #[test]
    fn pivot_sources_carry_their_level() {
        assert_eq!(ZoneSource::Pivot(PivotLevel::R1).to_string(), "pivot_R1");
        assert_eq!(ZoneSource::VolumeProfile.to_string(), "volume_profile");
    }

    #[test]
    fn centered_zone_reports_width_pct() {
        let zone = SupportResistanceZone::centered(200.0, 4.0, 60.0, ZoneSource::Consolidation);
        assert!((zone.width_pct - 2.0).abs() < 1e-9);
        assert!(zone.low <= zone.center && zone.center <= zone.high);
    }
}
