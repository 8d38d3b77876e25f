//! Live session state shared between the orchestrator and pollers
//!
//! The orchestrator is the sole writer; pollers take snapshots at any
//! time. Counters are atomics and only ever grow, status moves through
//! the guarded transition method, so readers never see a session walk
//! backwards.

use super::{PageFailure, SessionId, SessionSnapshot, SessionStatus};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};
use url::Url;

/// How many failures a snapshot reports
const RECENT_ERRORS: usize = 10;

struct Finished {
    at: DateTime<Utc>,
    elapsed: Duration,
}

/// The mutable record of one crawl session
pub struct SessionShared {
    id: SessionId,
    seed: String,
    status: RwLock<SessionStatus>,
    pages_crawled: AtomicU64,
    links_found: AtomicU64,
    error_count: AtomicU64,
    errors: Mutex<Vec<PageFailure>>,
    started_at: DateTime<Utc>,
    start_instant: Instant,
    finished: RwLock<Option<Finished>>,
}

impl SessionShared {
    pub(crate) fn new(id: SessionId, seed: &Url) -> Self {
        Self {
            id,
            seed: seed.to_string(),
            status: RwLock::new(SessionStatus::Pending),
            pages_crawled: AtomicU64::new(0),
            links_found: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            errors: Mutex::new(Vec::new()),
            started_at: Utc::now(),
            start_instant: Instant::now(),
            finished: RwLock::new(None),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.read().unwrap()
    }

    /// Attempts a state transition, refusing illegal moves
    ///
    /// Returns false when the move is not on the state machine (for
    /// example a stop request racing a completed session). Entering a
    /// terminal state freezes `finished_at` and the elapsed time.
    pub(crate) fn transition(&self, to: SessionStatus) -> bool {
        let mut status = self.status.write().unwrap();
        if !status.can_transition(to) {
            return false;
        }
        *status = to;
        if to.is_terminal() {
            *self.finished.write().unwrap() = Some(Finished {
                at: Utc::now(),
                elapsed: self.start_instant.elapsed(),
            });
        }
        true
    }

    pub(crate) fn add_page_crawled(&self) {
        self.pages_crawled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_links_found(&self, count: u64) {
        self.links_found.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self, failure: PageFailure) {
        self.errors.lock().unwrap().push(failure);
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pages_crawled(&self) -> u64 {
        self.pages_crawled.load(Ordering::Relaxed)
    }

    pub fn links_found(&self) -> u64 {
        self.links_found.load(Ordering::Relaxed)
    }

    pub fn error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished.read().unwrap().as_ref().map(|f| f.at)
    }

    /// Wall-clock time spent crawling; frozen once the session is terminal
    pub fn elapsed(&self) -> Duration {
        self.finished
            .read()
            .unwrap()
            .as_ref()
            .map(|f| f.elapsed)
            .unwrap_or_else(|| self.start_instant.elapsed())
    }

    /// Takes a consistent-enough snapshot for pollers
    ///
    /// Counters are read individually, so a snapshot taken mid-update may
    /// be one page ahead or behind on a single counter. Every value is
    /// still monotone across successive snapshots.
    pub fn snapshot(&self) -> SessionSnapshot {
        let recent_errors = {
            let errors = self.errors.lock().unwrap();
            let skip = errors.len().saturating_sub(RECENT_ERRORS);
            errors[skip..].to_vec()
        };

        SessionSnapshot {
            id: self.id,
            seed: self.seed.clone(),
            status: self.status(),
            pages_crawled: self.pages_crawled(),
            links_found: self.links_found(),
            error_count: self.error_count(),
            elapsed_secs: self.elapsed().as_secs_f64(),
            recent_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::PageErrorKind;

    fn shared() -> SessionShared {
        let seed = Url::parse("https://example.com/").unwrap();
        SessionShared::new(SessionId::new(), &seed)
    }

    #[test]
    fn test_new_session_is_pending() {
        let shared = shared();
        assert_eq!(shared.status(), SessionStatus::Pending);
        assert!(shared.finished_at().is_none());
    }

    #[test]
    fn test_legal_transition_applies() {
        let shared = shared();
        assert!(shared.transition(SessionStatus::Running));
        assert_eq!(shared.status(), SessionStatus::Running);
    }

    #[test]
    fn test_illegal_transition_refused() {
        let shared = shared();
        assert!(shared.transition(SessionStatus::Running));
        assert!(shared.transition(SessionStatus::Completed));
        assert!(!shared.transition(SessionStatus::Running));
        assert_eq!(shared.status(), SessionStatus::Completed);
    }

    #[test]
    fn test_terminal_freezes_elapsed() {
        let shared = shared();
        shared.transition(SessionStatus::Running);
        shared.transition(SessionStatus::Completed);
        let first = shared.elapsed();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(shared.elapsed(), first);
        assert!(shared.finished_at().is_some());
    }

    #[test]
    fn test_counters_accumulate() {
        let shared = shared();
        shared.add_page_crawled();
        shared.add_page_crawled();
        shared.add_links_found(7);
        assert_eq!(shared.pages_crawled(), 2);
        assert_eq!(shared.links_found(), 7);
    }

    #[test]
    fn test_snapshot_reports_recent_errors_only() {
        let shared = shared();
        for i in 0..15 {
            shared.record_failure(PageFailure {
                url: format!("https://example.com/{i}"),
                kind: PageErrorKind::Http,
                message: "HTTP 500".to_string(),
            });
        }
        let snapshot = shared.snapshot();
        assert_eq!(snapshot.error_count, 15);
        assert_eq!(snapshot.recent_errors.len(), 10);
        assert_eq!(snapshot.recent_errors[0].url, "https://example.com/5");
    }
}
