use argminmax::ArgMinMax;
use statrs::statistics::{Data, Median, Statistics};

#[derive(serde::Deserialize, serde::Serialize, Default, Debug, Clone)]
pub struct RangeF64 {
    pub start_range: f64,
    pub end_range: f64,
    pub n_chunks: usize,
}

impl RangeF64 {
    pub fn new(start_range: f64, end_range: f64, n_chunks: usize) -> Self {
        Self {
            start_range,
            end_range,
            n_chunks: n_chunks.max(1),
        }
    }

    #[inline]
    pub fn n_chunks(&self) -> usize {
        self.n_chunks
    }

    pub fn min_max(&self) -> (f64, f64) {
        (self.start_range, self.end_range)
    }

    pub fn range_length(&self) -> f64 {
        self.end_range - self.start_range
    }

    pub fn chunk_size(&self) -> f64 {
        self.range_length() / (self.n_chunks as f64)
    }

    /// Chunk that `value` falls into. Values outside the range return `None`.
    /// The top edge belongs to the last chunk.
    pub fn chunk_index(&self, value: f64) -> Option<usize> {
        if !(self.start_range..=self.end_range).contains(&value) {
            return None;
        }
        if self.chunk_size() <= 0.0 {
            return Some(0);
        }
        let index = ((value - self.start_range) / self.chunk_size()) as usize;

        // Clamping handles floating-point inaccuracies at the boundary.
        Some(index.min(self.n_chunks - 1))
    }

    pub fn chunk_bounds(&self, chunk_index: usize) -> (f64, f64) {
        debug_assert!(chunk_index < self.n_chunks);
        let lower_bound = self.start_range + chunk_index as f64 * self.chunk_size();
        let upper_bound = self.start_range + (chunk_index + 1) as f64 * self.chunk_size();
        (lower_bound, upper_bound)
    }

    pub fn chunk_center(&self, chunk_index: usize) -> f64 {
        let (low, high) = self.chunk_bounds(chunk_index);
        (low + high) / 2.0
    }
}

pub fn get_max(vec: &[f64]) -> f64 {
    let max_index: usize = vec.argmax();
    vec[max_index]
}

pub fn get_min(vec: &[f64]) -> f64 {
    let min_index: usize = vec.argmin();
    vec[min_index]
}

pub fn get_min_max(vec: &[f64]) -> Option<(f64, f64)> {
    if vec.is_empty() {
        return None;
    }
    Some((get_min(vec), get_max(vec)))
}

// Normalizes a vector of (positive) f64 to 0.0 to 1.0. Guarantees largest value is 1.0
// Name: `Max normalization`, `Max-Abs normalization`, or `L∞ normalization`
pub fn normalize_max(vec: &[f64]) -> Vec<f64> {
    if vec.is_empty() {
        return Vec::new();
    }
    match get_max(vec) {
        val if val <= 0.0 => vec.to_vec(),
        val => vec.iter().map(|&x| x / val).collect(),
    }
}

/// Simple (fractional) returns between consecutive prices.
/// Steps starting from a zero price are skipped.
pub fn pct_change(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

/// Sample standard deviation (n - 1). `None` when fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let sd = values.iter().std_dev();
    sd.is_finite().then_some(sd)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().mean())
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(Data::new(values.to_vec()).median())
}

/// Percentile with `p` in 0..=100, interpolated linearly between the two
/// nearest ranks (rank = p / 100 * (n - 1)).
pub fn percentile(values: &[f64], p: usize) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = p.min(100) as f64 / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64))
}

/// Rolling sample standard deviation. Entry `i` covers `values[i + 1 - window..=i]`;
/// the first `window - 1` entries are `None`.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                sample_std_dev(&values[i + 1 - window..=i])
            }
        })
        .collect()
}

/// Relative distance between two prices, in percent of `reference`.
pub fn pct_distance(price: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        return 0.0;
    }
    (price - reference).abs() / reference * 100.0
}

/// Ratio guarded against zero-length denominators (rule inconclusive => 0.0).
#[inline]
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn chunk_index_keeps_top_edge_in_last_chunk() {
        let range = RangeF64::new(100.0, 130.0, 30);
        assert_eq!(range.chunk_index(100.0), Some(0));
        assert_eq!(range.chunk_index(130.0), Some(29));
        assert_eq!(range.chunk_index(115.5), Some(15));
        assert_eq!(range.chunk_index(99.9), None);
        assert!(approx_eq(range.chunk_center(0), 100.5));
    }

    #[test]
    fn pct_change_matches_simple_returns() {
        let returns = pct_change(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert!(approx_eq(returns[0], 0.1));
        assert!(approx_eq(returns[1], -0.1));
    }

    #[test]
    fn sample_std_dev_needs_two_values() {
        assert_eq!(sample_std_dev(&[1.0]), None);
        let sd = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - 2.138_089_935).abs() < 1e-6);
    }

    #[test]
    fn rolling_std_leaves_warmup_empty() {
        let rolled = rolling_std(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(rolled[0], None);
        assert_eq!(rolled[1], None);
        assert!(approx_eq(rolled[2].unwrap(), 1.0));
        assert!(approx_eq(rolled[3].unwrap(), 1.0));
    }

    #[test]
    fn safe_ratio_treats_zero_length_as_inconclusive() {
        assert_eq!(safe_ratio(5.0, 0.0), 0.0);
        assert!(approx_eq(safe_ratio(5.0, 10.0), 0.5));
    }

    #[test]
    fn normalize_max_scales_to_one() {
        let normalized = normalize_max(&[1.0, 4.0, 2.0]);
        assert!(approx_eq(normalized[1], 1.0));
        assert!(approx_eq(normalized[0], 0.25));
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert!(approx_eq(percentile(&values, 70).unwrap(), 3.1));
        assert!(approx_eq(percentile(&values, 50).unwrap(), 2.5));
        assert!(approx_eq(percentile(&values, 0).unwrap(), 1.0));
        assert!(approx_eq(percentile(&values, 100).unwrap(), 4.0));
        assert!(approx_eq(percentile(&values, 250).unwrap(), 4.0));
        assert!(approx_eq(percentile(&[7.0], 70).unwrap(), 7.0));
        assert_eq!(percentile(&[], 70), None);
    }
}
