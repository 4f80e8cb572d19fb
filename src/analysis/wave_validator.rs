//! Rule engine for complete wave structures.
//!
//! Impulse rules, for waves 1-5 of an alternating quintuple:
//! - A (hard): wave 2 retraces no more than 100% of wave 1
//! - B (soft): a retracement deeper than 78.6% scales confidence by 0.7
//! - C (soft): wave 3 being the shortest of waves 1, 3 and 5 scales confidence by 0.5
//! - D (hard): wave 4 stays out of wave 1's price territory
//!
//! Confidence starts at 1.0 and soft rules only ever reduce it.

use crate::domain::swing_point::alternates;
use crate::domain::{SwingKind, SwingPoint};
use crate::utils::maths_utils::safe_ratio;

const INVALID: (bool, f64) = (false, 0.0);

pub const MAX_WAVE2_RETRACEMENT: f64 = 1.0;
pub const DEEP_WAVE2_RETRACEMENT: f64 = 0.786;
pub const DEEP_RETRACEMENT_PENALTY: f64 = 0.7;
pub const SHORT_WAVE3_PENALTY: f64 = 0.5;
pub const CORRECTION_RATIO_RANGE: (f64, f64) = (0.236, 0.786);

/// Validates five alternating swing points as an impulse.
/// A quintuple starting at a low is an up impulse, one starting at a high a down impulse.
///
/// Returns `(is_valid, confidence)`; invalid windows always report `0.0`.
pub fn validate_impulse(points: &[SwingPoint]) -> (bool, f64) {
    if points.len() != 5 || !alternates(points) {
        return INVALID;
    }

    // Lengths are measured along the impulse direction
    let sign = match points[0].kind {
        SwingKind::Low => 1.0,
        SwingKind::High => -1.0,
    };
    let p: Vec<f64> = points.iter().map(|pt| pt.price).collect();

    let wave1 = sign * (p[1] - p[0]);
    if wave1 < 0.0 {
        return INVALID;
    }

    let mut confidence = 1.0;

    // Rule A / B
    let retracement = safe_ratio(sign * (p[1] - p[2]), wave1);
    if retracement > MAX_WAVE2_RETRACEMENT {
        return INVALID;
    } else if retracement > DEEP_WAVE2_RETRACEMENT {
        confidence *= DEEP_RETRACEMENT_PENALTY;
    }

    // Rule C. The fifth point closes wave 4, so wave 5 has not printed yet and is
    // projected equal to wave 1.
    let wave3 = sign * (p[3] - p[2]);
    let projected_wave5 = wave1;
    if wave3 <= wave1.min(projected_wave5) {
        confidence *= SHORT_WAVE3_PENALTY;
    }

    // Rule D
    if sign * (p[4] - p[1]) <= 0.0 {
        return INVALID;
    }

    (true, confidence)
}

/// Ratio of the first leg against the net move from the first to the third point.
/// Positive only when the third point lies on the far side of the first.
pub fn correction_ratio(points: &[SwingPoint]) -> f64 {
    if points.len() != 3 {
        return 0.0;
    }
    let (p0, p1, p2) = (points[0].price, points[1].price, points[2].price);
    safe_ratio(p1 - p0, p0 - p2)
}

/// Three points form an ABC when the outer points share a kind and the
/// inner leg measures 23.6%..=78.6% of the outer move.
pub fn validate_correction(points: &[SwingPoint]) -> bool {
    if points.len() != 3 || points[0].kind != points[2].kind {
        return false;
    }
    let (lo, hi) = CORRECTION_RATIO_RANGE;
    (lo..=hi).contains(&correction_ratio(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn points(prices: &[f64], first: SwingKind) -> Vec<SwingPoint> {
        let mut kind = first;
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| {
                let p = SwingPoint::new(i, i as i64 * 1_000, price, kind);
                kind = kind.opposite();
                p
            })
            .collect()
    }

    #[test]
    fn textbook_up_impulse_keeps_full_confidence() {
        let window = points(&[100.0, 110.0, 105.0, 125.0, 115.0], SwingKind::Low);
        assert_eq!(validate_impulse(&window), (true, 1.0));
    }

    #[test]
    fn wave2_beyond_wave1_start_is_invalid() {
        // 110% retracement of wave 1
        let window = points(&[100.0, 110.0, 99.0, 125.0, 115.0], SwingKind::Low);
        assert_eq!(validate_impulse(&window), (false, 0.0));
    }

    #[test]
    fn deep_retracement_scales_confidence() {
        let window = points(&[100.0, 110.0, 101.0, 125.0, 115.0], SwingKind::Low);
        let (valid, confidence) = validate_impulse(&window);
        assert!(valid);
        assert!(approx_eq(confidence, 0.7));
    }

    #[test]
    fn short_wave3_halves_confidence() {
        let window = points(&[100.0, 120.0, 110.0, 125.0, 121.0], SwingKind::Low);
        let (valid, confidence) = validate_impulse(&window);
        assert!(valid);
        assert!(approx_eq(confidence, 0.5));
    }

    #[test]
    fn wave4_overlap_is_invalid() {
        let window = points(&[100.0, 110.0, 105.0, 125.0, 109.0], SwingKind::Low);
        assert_eq!(validate_impulse(&window), (false, 0.0));
    }

    #[test]
    fn down_impulse_mirrors_the_rules() {
        let valid = points(&[200.0, 180.0, 190.0, 150.0, 170.0], SwingKind::High);
        assert_eq!(validate_impulse(&valid), (true, 1.0));

        let overlap = points(&[200.0, 180.0, 190.0, 150.0, 185.0], SwingKind::High);
        assert_eq!(validate_impulse(&overlap), (false, 0.0));
    }

    #[test]
    fn non_alternating_or_wrong_length_windows_are_rejected() {
        let mut window = points(&[100.0, 110.0, 105.0, 125.0, 115.0], SwingKind::Low);
        window[2].kind = SwingKind::High;
        assert_eq!(validate_impulse(&window), (false, 0.0));
        assert_eq!(validate_impulse(&window[..4]), (false, 0.0));
    }

    #[test]
    fn zero_length_wave1_is_inconclusive_not_fatal() {
        let window = points(&[100.0, 100.0, 100.0, 120.0, 110.0], SwingKind::Low);
        let (valid, _) = validate_impulse(&window);
        assert!(valid);
    }

    #[test]
    fn valid_impulses_respect_rules_a_and_d() {
        let mut seed = 7_u64;
        let mut next = || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((seed >> 33) % 1000) as f64 / 10.0
        };
        for _ in 0..500 {
            let p0 = 100.0;
            let p1 = p0 + 1.0 + next();
            let p2 = p1 - next() * 0.3;
            let p3 = p2 + 1.0 + next();
            let p4 = p3 - next() * 0.5;
            let window = points(&[p0, p1, p2, p3, p4], SwingKind::Low);
            if let (true, confidence) = validate_impulse(&window) {
                assert!((p1 - p2) / (p1 - p0) <= 1.0);
                assert!(p4 > p1);
                assert!(confidence > 0.0 && confidence <= 1.0);
            }
        }
    }

    #[test]
    fn corrections_need_matching_ends_and_moderate_inner_leg() {
        // low, high, lower low: 5 up against a 10 net decline
        assert!(validate_correction(&points(&[100.0, 105.0, 90.0], SwingKind::Low)));
        // mirrored
        assert!(validate_correction(&points(&[100.0, 95.0, 110.0], SwingKind::High)));
        // inner leg too shallow
        assert!(!validate_correction(&points(&[100.0, 101.0, 90.0], SwingKind::Low)));
        // third point back on the same side
        assert!(!validate_correction(&points(&[100.0, 105.0, 102.0], SwingKind::Low)));
        // zero net move is inconclusive
        assert!(!validate_correction(&points(&[100.0, 105.0, 100.0], SwingKind::Low)));
    }
}
