//! Configuration module for PageScope
//!
//! All options are environment-driven with sensible defaults; the CLI
//! in `main.rs` maps env-backed flags into a [`Config`] which is then
//! validated once at startup.

mod types;
mod validation;

// Re-export types
pub use types::{Config, FetchConfig, ProbeConfig, ServerConfig};

// Re-export validation
pub use validation::validate;
