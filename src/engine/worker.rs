use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;

#[allow(unused_imports)]
use crate::config::PRINT_WORKER_JOBS;

use super::messages::{JobRequest, JobResult};
use super::pipeline::{analyze, analyze_all_degrees};

/// Runs jobs until the request channel closes or nobody listens for results.
pub fn spawn_worker_thread(rx: Receiver<JobRequest>, tx: Sender<JobResult>) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(req) = rx.recv() {
            let start = Instant::now();

            let outcome = if req.multi_degree {
                analyze_all_degrees(&req.series, &req.config)
            } else {
                analyze(&req.series, &req.config)
            };

            let elapsed = start.elapsed().as_millis();

            #[cfg(debug_assertions)]
            if PRINT_WORKER_JOBS {
                log::info!("[{}] analysis finished in {} ms", req.symbol, elapsed);
            }

            let result = JobResult {
                symbol: req.symbol,
                duration_ms: elapsed,
                result: outcome.map(Arc::new).map_err(|e| format!("{:#}", e)),
            };

            if tx.send(result).is_err() {
                // Engine dropped its receiver: shutting down
                break;
            }
        }
    })
}
