//! Session model: the externally observable state of one crawl
//!
//! A session is created by `SessionStore::start_crawl`, owned by the
//! orchestrator while it runs, and read-only once terminal. Everything
//! pollers see goes through [`SessionSnapshot`].

mod shared;
mod status;
mod store;

pub use shared::SessionShared;
pub use status::SessionStatus;
pub use store::SessionStore;

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Opaque identifier for one crawl session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Classification of a recoverable per-page failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageErrorKind {
    /// Connection, DNS, timeout, or body-read failure
    Network,

    /// Non-2xx response status
    Http,

    /// Body could not be parsed for links
    Parse,
}

impl fmt::Display for PageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Network => "network error",
            Self::Http => "HTTP error",
            Self::Parse => "parse error",
        };
        f.write_str(label)
    }
}

/// One recorded per-page failure
#[derive(Debug, Clone, Serialize)]
pub struct PageFailure {
    pub url: String,
    pub kind: PageErrorKind,
    pub message: String,
}

/// Read-only view of a session, safe to take while the crawl runs
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub seed: String,
    pub status: SessionStatus,
    pub pages_crawled: u64,
    pub links_found: u64,
    pub error_count: u64,
    pub elapsed_secs: f64,
    pub recent_errors: Vec<PageFailure>,
}
