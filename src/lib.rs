#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::type_complexity)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod models;
pub mod report;
pub mod utils;

// Pipeline, worker thread, batch runs
pub mod engine;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Result, bail};

// Re-export commonly used types
pub use config::{ANALYSIS, AnalysisConfig};
pub use data::{load_series_file, synthetic_impulse_series};
pub use domain::{PriceSeries, SwingKind, SwingPoint, WaveDegree};
pub use engine::{AnalysisEngine, MarketAnalysis, analyze, analyze_batch};
pub use models::{SupportResistanceZone, TradingSignal, WavePattern, ZoneSet};

// CLI argument parsing
use clap::Parser;

const POLL_INTERVAL_MS: u64 = 10;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON series file: one series, or {"series": [...]}
    #[arg(long, conflicts_with = "demo")]
    pub input: Option<PathBuf>,

    /// Analyze a generated Elliott-shaped series instead of a file
    #[arg(long, default_value_t = false)]
    pub demo: bool,

    /// Bars in the demo series
    #[arg(long, default_value_t = 240)]
    pub demo_len: usize,

    /// Also write the demo series to this JSON file
    #[arg(long, requires = "demo")]
    pub export_demo: Option<PathBuf>,

    /// Wave degree (primary, intermediate, minor, minute); sets the swing threshold
    #[arg(long)]
    pub degree: Option<WaveDegree>,

    /// Minimum swing reversal in percent (overrides the degree's threshold)
    #[arg(long)]
    pub min_swing_pct: Option<f64>,

    /// Zones kept per side
    #[arg(long)]
    pub max_zones: Option<usize>,

    /// Run all four degrees and report confluence zones
    #[arg(long, default_value_t = false)]
    pub multi_degree: bool,

    /// Print the full analysis as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl Cli {
    /// `ANALYSIS` with the command-line overrides applied.
    pub fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = match self.degree {
            Some(degree) => ANALYSIS.for_degree(degree),
            None => ANALYSIS.clone(),
        };
        if let Some(pct) = self.min_swing_pct {
            if !(pct.is_finite() && pct > 0.0) {
                bail!("--min-swing-pct must be a positive number, got {}", pct);
            }
            config.swing.min_swing_pct = pct;
        }
        if let Some(max_zones) = self.max_zones {
            config.zones.max_zones = max_zones;
        }
        Ok(config)
    }

    pub fn load_series(&self) -> Result<Vec<PriceSeries>> {
        if let Some(path) = &self.input {
            return load_series_file(path);
        }
        if self.demo {
            let series = synthetic_impulse_series("DEMO", self.demo_len, 42);
            if let Some(path) = &self.export_demo {
                data::save_series_file(path, std::slice::from_ref(&series))?;
                log::info!("Demo series written to {}", path.display());
            }
            return Ok(vec![series]);
        }
        bail!("Nothing to analyze: pass --input <file> or --demo")
    }
}

/// Entry point for the binary: load, analyze on the worker thread, print.
pub fn run(args: &Cli) -> Result<()> {
    let config = args.analysis_config()?;
    let series = args.load_series()?;

    let intervals: Vec<Option<i64>> = series
        .iter()
        .map(|s| s.timestamps_ms.windows(2).next().map(|w| w[1] - w[0]))
        .collect();
    let symbols: Vec<String> = series.iter().map(|s| s.symbol.clone()).collect();

    let mut engine = AnalysisEngine::new(config);
    for s in series {
        engine.submit(s, args.multi_degree)?;
    }
    while engine.is_busy() {
        if engine.poll() > 0 {
            log::info!("{} of {} analyses finished", symbols.len() - engine.pending_jobs(), symbols.len());
        } else {
            if let Some(msg) = engine.get_worker_status_msg() {
                log::debug!("{}", msg);
            }
            thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
        }
    }

    let mut analyses = Vec::with_capacity(symbols.len());
    for symbol in &symbols {
        match engine.get_analysis(symbol) {
            Some(analysis) => analyses.push(analysis),
            None => {
                let (_, error) = engine.get_symbol_status(symbol);
                bail!(
                    "Analysis of {} failed: {}",
                    symbol,
                    error.unwrap_or_else(|| "no result".to_string())
                );
            }
        }
    }

    if args.json {
        let plain: Vec<&MarketAnalysis> = analyses.iter().map(|a| a.as_ref()).collect();
        println!("{}", serde_json::to_string_pretty(&plain)?);
    } else {
        for (analysis, interval) in analyses.iter().zip(intervals) {
            println!("{}", report::render_report(analysis, interval));
        }
    }
    Ok(())
}
