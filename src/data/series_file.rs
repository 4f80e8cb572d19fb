use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result, bail};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::domain::PriceSeries;

/// On-disk layout: either one bare series or `{ "series": [...] }`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum SeriesFile {
    Collection { series: Vec<PriceSeries> },
    Single(PriceSeries),
}

impl SeriesFile {
    pub fn into_series(self) -> Vec<PriceSeries> {
        match self {
            SeriesFile::Collection { series } => series,
            SeriesFile::Single(series) => vec![series],
        }
    }
}

/// Reads and validates every series in a JSON file.
pub fn load_series_file(path: &Path) -> Result<Vec<PriceSeries>> {
    let file = File::open(path).context(format!("Failed to open series file: {}", path.display()))?;
    let reader = BufReader::new(file);
    let document: SeriesFile = serde_json::from_reader(reader)
        .context(format!("Failed to parse series file: {}", path.display()))?;

    let series = document.into_series();
    if series.is_empty() {
        bail!("{} contains no series", path.display());
    }
    for s in &series {
        s.validate().context(format!("Invalid series in {}", path.display()))?;
    }
    let repeated: Vec<&str> = series.iter().map(|s| s.symbol.as_str()).duplicates().collect();
    if !repeated.is_empty() {
        bail!("{} repeats symbol(s): {}", path.display(), repeated.join(", "));
    }

    log::info!("Loaded {} series from {}", series.len(), path.display());
    Ok(series)
}

pub fn save_series_file(path: &Path, series: &[PriceSeries]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context(format!("Failed to create directory: {}", parent.display()))?;
    }
    let file = File::create(path).context(format!("Failed to create file: {}", path.display()))?;
    let writer = BufWriter::new(file);
    let document = SeriesFile::Collection {
        series: series.to_vec(),
    };
    serde_json::to_writer_pretty(writer, &document)
        .context(format!("Failed to write series to: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic_impulse_series;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("wave-zones-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn saved_series_load_back() {
        let path = temp_path("roundtrip");
        let original = vec![synthetic_impulse_series("AAA", 60, 1), synthetic_impulse_series("BBB", 40, 2)];
        save_series_file(&path, &original).unwrap();

        let loaded = load_series_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].symbol, "BBB");
        let max_diff = loaded[0]
            .closes
            .iter()
            .zip(&original[0].closes)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        assert!(max_diff < 1e-9);
    }

    #[test]
    fn bare_series_document_is_accepted() {
        let path = temp_path("bare");
        std::fs::write(
            &path,
            r#"{"symbol":"X","timestamps_ms":[1,2,3],"closes":[10.0,11.0,10.5]}"#,
        )
        .unwrap();
        let loaded = load_series_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.len(), 1);
        assert!(!loaded[0].has_volume());
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let path = temp_path("mismatch");
        std::fs::write(
            &path,
            r#"{"symbol":"X","timestamps_ms":[1,2,3],"closes":[10.0,11.0,10.5],"volumes":[1.0]}"#,
        )
        .unwrap();
        let err = load_series_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(format!("{:#}", err).contains("volume"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_series_file(Path::new("/nonexistent/series.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/series.json"));
    }

    #[test]
    fn repeated_symbols_are_rejected() {
        let path = temp_path("repeated");
        let series = vec![
            synthetic_impulse_series("BTC", 40, 1),
            synthetic_impulse_series("ETH", 40, 2),
            synthetic_impulse_series("BTC", 40, 3),
        ];
        save_series_file(&path, &series).unwrap();
        let err = load_series_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        let msg = err.to_string();
        assert!(msg.contains("BTC"));
        assert!(!msg.contains("ETH"));
    }
}
