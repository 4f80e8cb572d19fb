use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::utils::maths_utils::pct_change;

// ============================================================================
// PriceSeries: the immutable input of every analysis
// ============================================================================

/// An ordered, time-indexed close-price series with optional volume/high/low
/// companions of identical length. Gaps and duplicates are expected to be
/// forward-filled upstream.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    pub timestamps_ms: Vec<i64>,
    pub closes: Vec<f64>,

    #[serde(default)]
    pub volumes: Option<Vec<f64>>,
    #[serde(default)]
    pub highs: Option<Vec<f64>>,
    #[serde(default)]
    pub lows: Option<Vec<f64>>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, timestamps_ms: Vec<i64>, closes: Vec<f64>) -> Result<Self> {
        let series = Self {
            symbol: symbol.into(),
            timestamps_ms,
            closes,
            volumes: None,
            highs: None,
            lows: None,
        };
        series.validate()?;
        Ok(series)
    }

    /// Evenly spaced series starting at `first_timestamp_ms`.
    pub fn from_closes(
        symbol: impl Into<String>,
        first_timestamp_ms: i64,
        interval_ms: i64,
        closes: Vec<f64>,
    ) -> Result<Self> {
        if interval_ms <= 0 {
            bail!("Interval must be positive, got {} ms", interval_ms);
        }
        let timestamps_ms = (0..closes.len() as i64)
            .map(|i| first_timestamp_ms + i * interval_ms)
            .collect();
        Self::new(symbol, timestamps_ms, closes)
    }

    pub fn with_volumes(mut self, volumes: Vec<f64>) -> Result<Self> {
        self.volumes = Some(volumes);
        self.validate()?;
        Ok(self)
    }

    pub fn with_high_low(mut self, highs: Vec<f64>, lows: Vec<f64>) -> Result<Self> {
        self.highs = Some(highs);
        self.lows = Some(lows);
        self.validate()?;
        Ok(self)
    }

    /// Caller errors (mismatched lengths, non-finite values, unordered timestamps).
    /// A short series is *not* an error; downstream analysis degrades instead.
    pub fn validate(&self) -> Result<()> {
        let n = self.closes.len();
        if self.timestamps_ms.len() != n {
            bail!(
                "{}: {} timestamps for {} prices",
                self.symbol,
                self.timestamps_ms.len(),
                n
            );
        }
        if let Some(pos) = self.closes.iter().position(|p| !p.is_finite()) {
            bail!("{}: non-finite price at index {}", self.symbol, pos);
        }
        if let Some(pos) = self.timestamps_ms.windows(2).position(|w| w[1] < w[0]) {
            bail!("{}: timestamps out of order at index {}", self.symbol, pos + 1);
        }

        let companions = [
            ("volume", &self.volumes),
            ("high", &self.highs),
            ("low", &self.lows),
        ];
        for (name, values) in companions {
            if let Some(values) = values {
                if values.len() != n {
                    bail!(
                        "{}: {} series has {} values but price series has {}",
                        self.symbol,
                        name,
                        values.len(),
                        n
                    );
                }
                if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
                    bail!("{}: non-finite {} value at index {}", self.symbol, name, pos);
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn last_price(&self) -> Option<f64> {
        self.closes.last().copied()
    }

    pub fn last_timestamp_ms(&self) -> Option<i64> {
        self.timestamps_ms.last().copied()
    }

    pub fn volumes(&self) -> Option<&[f64]> {
        self.volumes.as_deref()
    }

    pub fn highs(&self) -> Option<&[f64]> {
        self.highs.as_deref()
    }

    pub fn lows(&self) -> Option<&[f64]> {
        self.lows.as_deref()
    }

    pub fn has_volume(&self) -> bool {
        self.volumes.is_some()
    }

    /// High and low are both present (enables true-range ATR and real pivots).
    pub fn has_ohlc(&self) -> bool {
        self.highs.is_some() && self.lows.is_some()
    }

    /// Simple returns of the close series.
    pub fn returns(&self) -> Vec<f64> {
        pct_change(&self.closes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_closes_spaces_timestamps_evenly() {
        let series = PriceSeries::from_closes("BTCUSDT", 1_000, 60_000, vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(series.timestamps_ms, vec![1_000, 61_000, 121_000]);
        assert_eq!(series.last_price(), Some(3.0));
        assert!(!series.has_volume());
        assert!(!series.has_ohlc());
    }

    #[test]
    fn mismatched_companion_lengths_are_rejected() {
        let series = PriceSeries::from_closes("ETHUSDT", 0, 1, vec![1.0, 2.0, 3.0]).unwrap();
        assert!(series.clone().with_volumes(vec![1.0, 2.0]).is_err());
        assert!(series.clone().with_high_low(vec![1.0, 2.0, 3.0], vec![1.0]).is_err());
        assert!(series.with_volumes(vec![5.0, 5.0, 5.0]).is_ok());
    }

    #[test]
    fn non_finite_prices_are_rejected() {
        assert!(PriceSeries::from_closes("X", 0, 1, vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn short_series_is_not_an_error() {
        let series = PriceSeries::from_closes("X", 0, 1, vec![1.0]).unwrap();
        assert_eq!(series.len(), 1);
        assert!(series.returns().is_empty());
    }
}
