use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::JoinHandle;

use anyhow::{Result, anyhow, bail};

use crate::config::{ANALYSIS, AnalysisConfig};
use crate::domain::PriceSeries;

use super::messages::{JobRequest, JobResult};
use super::pipeline::MarketAnalysis;
use super::state::SymbolState;
use super::worker;

/// Background analysis service: jobs go to one worker thread over a channel,
/// finished analyses are collected by `poll` or `drain`.
pub struct AnalysisEngine {
    /// Registry of every symbol ever submitted
    pub symbols: HashMap<String, SymbolState>,

    /// Worker Communication
    job_tx: Option<Sender<JobRequest>>,
    result_rx: Receiver<JobResult>,
    worker: Option<JoinHandle<()>>,

    /// Jobs sent but not yet collected
    pending: usize,

    /// Applied to every job submitted from now on
    pub current_config: AnalysisConfig,
}

impl AnalysisEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        let (job_tx, job_rx) = channel::<JobRequest>();
        let (result_tx, result_rx) = channel::<JobResult>();

        let worker = worker::spawn_worker_thread(job_rx, result_tx);

        Self {
            symbols: HashMap::new(),
            job_tx: Some(job_tx),
            result_rx,
            worker: Some(worker),
            pending: 0,
            current_config: config,
        }
    }

    /// Queues an analysis of `series` under its own symbol. A symbol with a job
    /// still outstanding is refused, since its result would replace the other's.
    pub fn submit(&mut self, series: PriceSeries, multi_degree: bool) -> Result<()> {
        let Some(job_tx) = &self.job_tx else {
            return Err(anyhow!("analysis worker has shut down"));
        };
        let symbol = series.symbol.clone();
        if self.symbols.get(&symbol).is_some_and(|state| state.is_calculating) {
            bail!("{} already has an analysis queued", symbol);
        }
        let req = JobRequest {
            symbol: symbol.clone(),
            series: Arc::new(series),
            config: self.current_config.clone(),
            multi_degree,
        };
        job_tx
            .send(req)
            .map_err(|_| anyhow!("analysis worker is gone, cannot queue {}", symbol))?;

        self.symbols.entry(symbol).or_default().is_calculating = true;
        self.pending += 1;
        Ok(())
    }

    /// Collects finished jobs without blocking. Returns how many arrived.
    pub fn poll(&mut self) -> usize {
        let mut received = 0;
        loop {
            match self.result_rx.try_recv() {
                Ok(result) => {
                    self.handle_job_result(result);
                    received += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.pending > 0 {
                        log::error!("Analysis worker stopped with {} jobs outstanding", self.pending);
                        self.pending = 0;
                    }
                    break;
                }
            }
        }
        received
    }

    /// Blocks until every submitted job has reported back.
    pub fn drain(&mut self) -> usize {
        let mut received = 0;
        while self.pending > 0 {
            match self.result_rx.recv() {
                Ok(result) => {
                    self.handle_job_result(result);
                    received += 1;
                }
                Err(_) => {
                    log::error!("Analysis worker stopped with {} jobs outstanding", self.pending);
                    self.pending = 0;
                }
            }
        }
        received
    }

    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }

    pub fn pending_jobs(&self) -> usize {
        self.pending
    }

    pub fn get_analysis(&self, symbol: &str) -> Option<Arc<MarketAnalysis>> {
        self.symbols.get(symbol).and_then(|state| state.analysis.clone())
    }

    pub fn get_symbol_status(&self, symbol: &str) -> (bool, Option<String>) {
        self.symbols
            .get(symbol)
            .map_or((false, None), |state| (state.is_calculating, state.last_error.clone()))
    }

    pub fn get_worker_status_msg(&self) -> Option<String> {
        let calculating = self.symbols.values().filter(|s| s.is_calculating).count();
        (calculating > 0).then(|| format!("Analyzing {} symbols", calculating))
    }

    fn handle_job_result(&mut self, result: JobResult) {
        self.pending = self.pending.saturating_sub(1);
        let state = self.symbols.entry(result.symbol.clone()).or_default();
        match result.result {
            Ok(analysis) => state.update_analysis(analysis, result.duration_ms),
            Err(e) => {
                log::error!("Worker failed for {}: {}", result.symbol, e);
                state.record_failure(e);
            }
        }
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new(ANALYSIS.clone())
    }
}

impl Drop for AnalysisEngine {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop
        self.job_tx.take();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::error!("Analysis worker panicked");
            }
        }
    }
}
