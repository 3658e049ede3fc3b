//! PageScope: a web page structure and link health analyzer
//!
//! This crate fetches a page by URL and produces a structured report:
//! declared document version, title, heading counts per level, every
//! hyperlink classified as internal or external with an accessibility
//! probe result, and a login-form flag. Link probing fans out through a
//! bounded worker pool under a shared deadline and always returns one
//! status per input link, in the original order.

pub mod analyzer;
pub mod config;
pub mod fetch;
pub mod html;
pub mod models;
pub mod probe;
pub mod server;

use thiserror::Error;

/// Errors raised while fetching a document or probing a link
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out for {url}")]
    Timeout { url: String },

    #[error("connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Errors raised by the document walker
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("base URL {url:?} is not an absolute URL")]
    BadBase { url: String },
}

/// Structural errors from the link probe engine
///
/// Per-link failures are never errors; they are carried as data inside
/// each `LinkStatus`. Only a lifecycle problem surfaces here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("link probe engine is not running")]
    NotStarted,
}

/// Top-level analysis errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid request URL {url:?}")]
    BadRequest { url: String },

    #[error("failed to fetch {url}: {source}")]
    Fetch { url: String, source: FetchError },

    #[error("{url} returned HTTP {code}")]
    Http { url: String, code: u16 },

    #[error("failed to walk document from {url}: {source}")]
    Parse { url: String, source: WalkError },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for walk operations
pub type WalkResult<T> = std::result::Result<T, WalkError>;

/// Result type alias for probe engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use analyzer::Analyzer;
pub use config::Config;
pub use fetch::{Fetch, HttpFetcher, Probe};
pub use models::{AnalysisReport, Link, LinkKind, LinkStatus};
pub use probe::LinkProbeEngine;
