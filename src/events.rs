//! Structured progress events emitted by the crawl engine
//!
//! The engine only emits; consumers (the CLI printer, a log-file writer,
//! an HTTP front end) decide what to render or persist. Each session's
//! events form a lazy, append-only sequence delivered over an unbounded
//! channel taken from [`SessionStore::events`](crate::SessionStore::events).

use crate::session::{PageErrorKind, SessionId, SessionStatus};
use serde::Serialize;

/// One entry in a session's event sequence
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CrawlEvent {
    /// The orchestrator entered its main loop
    SessionStart { id: SessionId, seed: String },

    /// A page was fetched and parsed; `links` holds every resolvable link
    /// discovered on it, on-site or not
    PageFetched { url: String, links: Vec<String> },

    /// A page failed; the crawl continues
    PageError {
        url: String,
        kind: PageErrorKind,
        message: String,
    },

    /// The session reached a terminal state; always the last event
    SessionEnd { summary: CrawlSummary },
}

/// Final accounting for a finished session
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub status: SessionStatus,
    pub pages_crawled: u64,
    pub links_found: u64,
    pub error_count: u64,
    pub elapsed_secs: f64,
}
