//! Debugging feature flags.
//!
//! Toggle individual diagnostics here. All of them are further gated by
//! `cfg(debug_assertions)`, so release builds stay quiet.

/// Emit every confirmed swing point while running the zigzag.
pub const PRINT_SWING_DETECTION: bool = false;

/// Emit each labeling scenario (impulse / corrective / complex) with its confidence.
pub const PRINT_LABELING_SCENARIOS: bool = false;

/// Emit per-source zone counts before merging.
pub const PRINT_ZONE_SOURCES: bool = false;

/// Emit worker job timings.
pub const PRINT_WORKER_JOBS: bool = true;
