use std::time::Duration;

/// Main configuration structure for PageScope
#[derive(Debug, Clone)]
pub struct Config {
    pub fetch: FetchConfig,
    pub probe: ProbeConfig,
    pub server: ServerConfig,
}

/// HTTP fetcher configuration
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Overall budget for one fetch, headers and body included
    pub request_timeout: Duration,

    /// TCP connect timeout, distinctly shorter than the request budget
    pub connect_timeout: Duration,

    /// Maximum bytes read from a response body; the rest is discarded
    pub max_body_bytes: usize,

    /// Idle connections kept per remote host
    pub max_idle_per_host: usize,
}

/// Link probe engine configuration
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Number of concurrent probe workers per batch
    pub worker_pool_size: usize,

    /// Sub-deadline for a single link probe
    pub link_timeout: Duration,

    /// Upper bound on one batch, regardless of the caller deadline
    pub batch_timeout: Duration,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the listener to (host:port)
    pub bind: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(2),
            max_body_bytes: 10 * 1024 * 1024,
            max_idle_per_host: 70,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            worker_pool_size: 10,
            link_timeout: Duration::from_secs(5),
            batch_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            probe: ProbeConfig::default(),
            server: ServerConfig::default(),
        }
    }
}
