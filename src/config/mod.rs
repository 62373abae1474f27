//! Engine Configuration Module
//!
//! Every decision threshold of the engine, loaded from TOML and validated
//! once at startup. The validated config is shared read-only behind an
//! `Arc` by the engine, the shutdown advisor and the processing loop.
//!
//! ## Loading Order
//!
//! 1. `--config <FILE>` on the command line
//! 2. `PUMP_SENTINEL_CONFIG` environment variable (path to TOML file)
//! 3. `pump_sentinel.toml` in the current working directory
//! 4. Built-in defaults (the pump operating instruction values)
//!
//! ## Usage
//!
//! ```ignore
//! let config = Arc::new(EngineConfig::load(cli.config.as_deref())?);
//! let engine = HealthEngine::new(Arc::clone(&config));
//! ```

mod engine_config;
pub mod defaults;
pub mod validation;

pub use engine_config::*;
