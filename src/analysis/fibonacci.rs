use crate::domain::SwingPoint;
use crate::models::{FIBONACCI_RATIOS, FibKind, FibonacciLevel};

/// Price at `ratio` of the move `start -> end`.
///
/// Ratios up to 1.0 retrace from `end` back toward `start` (0.0 is `end`, 1.0 is `start`);
/// larger ratios extend beyond `end`.
#[inline]
pub fn level_price(start: f64, end: f64, ratio: f64) -> f64 {
    let diff = end - start;
    if ratio <= 1.0 {
        end - diff * ratio
    } else {
        end + diff * (ratio - 1.0)
    }
}

/// Retracements first, then extensions, each in ascending ratio order.
pub fn levels_between(start: f64, end: f64) -> Vec<FibonacciLevel> {
    let retracements = FIBONACCI_RATIOS.iter().filter(|&&r| r <= 1.0);
    let extensions = FIBONACCI_RATIOS.iter().filter(|&&r| r > 1.0);

    retracements
        .chain(extensions)
        .map(|&ratio| FibonacciLevel {
            ratio,
            price: level_price(start, end, ratio),
            kind: FibKind::for_ratio(ratio),
        })
        .collect()
}

pub fn levels(start: &SwingPoint, end: &SwingPoint) -> Vec<FibonacciLevel> {
    levels_between(start.price, end.price)
}
