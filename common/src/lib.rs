//! Shared infrastructure for the Modaics classification workspace.
//!
//! This crate sits at the bottom of the dependency hierarchy:
//! - Has NO dependencies on other workspace crates
//! - Owns the configuration model consumed by `client` and `pipeline`
//! - Owns the tracing subscriber setup used by hosts and tests
//!
//! ```text
//! pipeline ──▶ client ──▶ values
//!     │           │
//!     └───────────┴──▶ common (this crate)
//! ```

pub mod config;
pub mod logging;

pub use config::{
    ApiSettings, ConfigError, FusionSettings, LoggingSettings, ModaicsConfig, PipelineSettings,
};
pub use logging::{init_from_settings, init_tracing};
