use std::collections::BTreeSet;

use crate::models::{SupportResistanceZone, ZoneKind};
use crate::utils::maths_utils::mean;

const MAX_CONFLUENCE_BONUS: f64 = 30.0;
const BONUS_PER_MEMBER: f64 = 5.0;

/// Merges overlapping zones into confluence zones.
///
/// Zones are sorted by center and each one is compared with the last member
/// of the current group: an overlap of at least `overlap_threshold_pct` of that
/// member's width joins the group. Passes repeat until the count stops
/// shrinking, so merging the output again changes nothing.
pub fn merge_overlapping_zones(
    zones: Vec<SupportResistanceZone>,
    overlap_threshold_pct: f64,
) -> Vec<SupportResistanceZone> {
    let input_count = zones.len();
    let mut current = zones;
    let mut passes = 0;

    loop {
        let before = current.len();
        current = merge_pass(current, overlap_threshold_pct);
        passes += 1;
        if current.len() >= before || current.len() <= 1 {
            break;
        }
    }

    log::debug!(
        "Zone merge: {} zones in, {} out after {} passes",
        input_count,
        current.len(),
        passes
    );

    current
}

fn merge_pass(mut zones: Vec<SupportResistanceZone>, overlap_threshold_pct: f64) -> Vec<SupportResistanceZone> {
    if zones.is_empty() {
        return zones;
    }
    zones.sort_by(|a, b| a.center.total_cmp(&b.center));

    let mut merged = Vec::new();
    let mut group: Vec<SupportResistanceZone> = Vec::new();

    for zone in zones {
        let joins = group.last().is_none_or(|last| {
            let overlap = last.overlap_percentage(&zone);
            overlap > 0.0 && overlap >= overlap_threshold_pct
        });

        if !joins {
            // Gap found - finalize current group and start a new one
            merged.push(merge_group(std::mem::take(&mut group)));
        }
        group.push(zone);
    }

    if !group.is_empty() {
        merged.push(merge_group(group));
    }

    merged
}

/// Collapses a group into one zone: strength-weighted center, union of bounds,
/// strongest member plus a confluence bonus of 5 per member (30 at most).
fn merge_group(mut group: Vec<SupportResistanceZone>) -> SupportResistanceZone {
    if group.len() == 1 {
        if let Some(zone) = group.pop() {
            return zone;
        }
    }

    let total_strength: f64 = group.iter().map(|z| z.strength).sum();
    let centers: Vec<f64> = group.iter().map(|z| z.center).collect();
    let center = if total_strength > 0.0 {
        group.iter().map(|z| z.center * z.strength).sum::<f64>() / total_strength
    } else {
        mean(&centers).unwrap_or(0.0)
    };

    let low = group.iter().map(|z| z.low).fold(f64::INFINITY, f64::min);
    let high = group.iter().map(|z| z.high).fold(f64::NEG_INFINITY, f64::max);

    let base_strength = group.iter().map(|z| z.strength).fold(0.0, f64::max);
    let bonus = (group.len() as f64 * BONUS_PER_MEMBER).min(MAX_CONFLUENCE_BONUS);

    let sources: BTreeSet<_> = group.iter().flat_map(|z| z.sources.iter().copied()).collect();
    let volumes: Vec<f64> = group.iter().map(|z| z.volume_concentration).collect();

    let mut zone = SupportResistanceZone {
        center,
        low,
        high,
        width_pct: 0.0,
        strength: (base_strength + bonus).min(100.0),
        kind: ZoneKind::Pending,
        sources,
        touch_count: group.iter().map(|z| z.touch_count).sum(),
        volume_concentration: mean(&volumes).unwrap_or(0.0),
        last_test_ms: group.iter().filter_map(|z| z.last_test_ms).max(),
        distance_from_current_pct: 0.0,
    };
    zone.refresh_width_pct();
    zone
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ZoneSource;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn zone(low: f64, high: f64, strength: f64, source: ZoneSource) -> SupportResistanceZone {
        SupportResistanceZone::new((low + high) / 2.0, low, high, strength, source)
    }

    #[test]
    fn overlapping_zones_combine_attributes() {
        let a = zone(99.0, 101.0, 60.0, ZoneSource::ElliottWave)
            .with_touches(1)
            .with_last_test(Some(1_000));
        let b = zone(99.5, 101.5, 40.0, ZoneSource::Fibonacci)
            .with_volume_concentration(0.5)
            .with_last_test(Some(5_000));

        let merged = merge_overlapping_zones(vec![b, a], 50.0);
        assert_eq!(merged.len(), 1);

        let m = &merged[0];
        assert!(approx_eq(m.center, (100.0 * 60.0 + 100.5 * 40.0) / 100.0));
        assert!(approx_eq(m.low, 99.0));
        assert!(approx_eq(m.high, 101.5));
        assert!(approx_eq(m.strength, 70.0));
        assert_eq!(m.sources.len(), 2);
        assert_eq!(m.touch_count, 1);
        assert!(approx_eq(m.volume_concentration, 0.25));
        assert_eq!(m.last_test_ms, Some(5_000));
        assert!(approx_eq(m.width_pct, 2.5 / m.center * 100.0));
    }

    #[test]
    fn light_overlap_keeps_zones_apart() {
        let a = zone(99.0, 101.0, 60.0, ZoneSource::ElliottWave);
        let b = zone(100.5, 102.5, 60.0, ZoneSource::Fibonacci);
        assert_eq!(merge_overlapping_zones(vec![a, b], 50.0).len(), 2);
    }

    #[test]
    fn confluence_bonus_is_capped_and_strength_stays_in_range() {
        let zones: Vec<_> = (0..8)
            .map(|i| zone(100.0 + i as f64 * 0.01, 102.0 + i as f64 * 0.01, 80.0, ZoneSource::Consolidation))
            .collect();
        let merged = merge_overlapping_zones(zones, 50.0);
        assert_eq!(merged.len(), 1);
        assert!(approx_eq(merged[0].strength, 100.0));
    }

    #[test]
    fn merged_zones_keep_center_inside_bounds() {
        let zones = vec![
            zone(90.0, 110.0, 10.0, ZoneSource::VolumeProfile),
            zone(100.0, 101.0, 90.0, ZoneSource::Fibonacci),
        ];
        for z in merge_overlapping_zones(zones, 0.0) {
            assert!(z.low <= z.center && z.center <= z.high);
        }
    }

    #[test]
    fn re_merging_changes_nothing() {
        let mut seed = 11_u64;
        let mut next = || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((seed >> 33) % 10_000) as f64 / 100.0
        };
        let zones: Vec<_> = (0..60)
            .map(|_| {
                let low = 50.0 + next();
                let width = 0.2 + next() / 20.0;
                zone(low, low + width, 20.0 + next() / 2.0, ZoneSource::ElliottWave)
            })
            .collect();

        let once = merge_overlapping_zones(zones, 50.0);
        let twice = merge_overlapping_zones(once.clone(), 50.0);
        assert_eq!(once, twice);
        assert!(once.windows(2).all(|w| w[0].center <= w[1].center));
    }

    #[test]
    fn empty_input_is_fine() {
        assert!(merge_overlapping_zones(Vec::new(), 50.0).is_empty());
    }
}
