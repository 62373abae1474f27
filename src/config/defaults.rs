//! System-wide default constants that are not operator-tunable.
//!
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Pipeline
// ============================================================================

/// Records processed between periodic statistics log lines.
pub const STATS_LOG_INTERVAL: u64 = 500;

/// Maximum number of assets tracked by one processing loop.
///
/// Records for further assets are dropped with a warning so a corrupt
/// stream cannot grow the monitor map without bound.
pub const MAX_TRACKED_ASSETS: usize = 1_024;

// ============================================================================
// Simulation
// ============================================================================

/// Base delay between simulated records at `--speed 1` (milliseconds).
///
/// `delay_ms = SIMULATION_BASE_DELAY_MS / speed`
pub const SIMULATION_BASE_DELAY_MS: u64 = 1_000;

/// Records emitted per scenario phase by default.
pub const SIMULATION_PHASE_LENGTH: usize = 12;
