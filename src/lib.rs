//! Sitebound: a single-site breadth-first crawler
//!
//! Sitebound walks every page of one website reachable from a seed URL,
//! never following links that leave the seed's host. Each crawl runs as a
//! session that can be polled for progress and stopped while in flight.

pub mod config;
pub mod crawler;
pub mod events;
pub mod session;
pub mod url;

use thiserror::Error;

/// Main error type for sitebound operations
#[derive(Debug, Error)]
pub enum SiteboundError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("No session with id {0}")]
    SessionNotFound(SessionId),

    #[error("Session {id} already finished as {status}")]
    AlreadyTerminal { id: SessionId, status: SessionStatus },

    #[error("Event stream for session {0} was already taken")]
    EventsTaken(SessionId),

    #[error("Internal fault: {0}")]
    Internal(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("URL is empty")]
    Empty,

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Failed to parse URL: {0}")]
    Parse(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for sitebound operations
pub type Result<T> = std::result::Result<T, SiteboundError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::EngineConfig;
pub use crawler::crawl;
pub use events::{CrawlEvent, CrawlSummary};
pub use session::{PageErrorKind, SessionId, SessionSnapshot, SessionStatus, SessionStore};
pub use crate::url::{complete_seed_url, normalize, resolve_href, same_site};
