//! Session registry: starting, observing, and stopping crawls
//!
//! The store is an explicit object handed to whoever needs it (CLI, HTTP
//! front end, tests); there is no process-wide registry. Lookups stay
//! concurrent while sessions run.

use super::{SessionId, SessionShared, SessionSnapshot, SessionStatus};
use crate::config::EngineConfig;
use crate::crawler::{build_http_client, Orchestrator};
use crate::events::CrawlEvent;
use crate::url::complete_seed_url;
use crate::{Result, SiteboundError};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::mpsc;

struct SessionEntry {
    shared: Arc<SessionShared>,
    /// Single-consumer event stream, handed out once by `events`
    events: Mutex<Option<mpsc::UnboundedReceiver<CrawlEvent>>>,
}

/// Registry of crawl sessions sharing one HTTP client and configuration
pub struct SessionStore {
    client: Client,
    config: EngineConfig,
    sessions: RwLock<HashMap<SessionId, Arc<SessionEntry>>>,
}

impl SessionStore {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let client = build_http_client(&config)?;
        Ok(Self {
            client,
            config,
            sessions: RwLock::new(HashMap::new()),
        })
    }

    /// Starts a crawl from `seed_input`
    ///
    /// Fails synchronously when the seed cannot be completed into a
    /// crawlable URL; no session is created in that case. Otherwise the
    /// session runs in the background and is observable through
    /// [`snapshot`](Self::snapshot) until it reaches a terminal state.
    ///
    /// `max_concurrent` overrides the store-wide fetch concurrency cap
    /// for this session.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_crawl(
        &self,
        seed_input: &str,
        max_concurrent: Option<usize>,
    ) -> Result<SessionId> {
        let seed = complete_seed_url(seed_input)?;
        let id = SessionId::new();
        let shared = Arc::new(SessionShared::new(id, &seed));
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let entry = Arc::new(SessionEntry {
            shared: Arc::clone(&shared),
            events: Mutex::new(Some(events_rx)),
        });
        self.sessions.write().unwrap().insert(id, entry);

        let orchestrator = Orchestrator::new(
            self.client.clone(),
            seed,
            shared,
            events_tx,
            max_concurrent.unwrap_or(self.config.max_concurrent),
            self.config.fetch_timeout(),
        );
        tokio::spawn(orchestrator.run());

        tracing::info!("Session {} started for {}", id, seed_input.trim());
        Ok(id)
    }

    /// Returns the current snapshot of a session
    pub fn snapshot(&self, id: SessionId) -> Result<SessionSnapshot> {
        let sessions = self.sessions.read().unwrap();
        let entry = sessions
            .get(&id)
            .ok_or(SiteboundError::SessionNotFound(id))?;
        Ok(entry.shared.snapshot())
    }

    /// Requests a stop and returns immediately
    ///
    /// No new fetches are dispatched after the orchestrator observes the
    /// request; in-flight fetches finish and their results are discarded.
    /// Stopping an already-stopping session is a no-op; stopping a
    /// terminal session fails with `AlreadyTerminal`.
    pub fn stop(&self, id: SessionId) -> Result<()> {
        let entry = {
            let sessions = self.sessions.read().unwrap();
            sessions
                .get(&id)
                .cloned()
                .ok_or(SiteboundError::SessionNotFound(id))?
        };

        if entry.shared.transition(SessionStatus::Stopping) {
            tracing::info!("Session {} stop requested", id);
            return Ok(());
        }

        let status = entry.shared.status();
        if status == SessionStatus::Stopping {
            return Ok(());
        }
        Err(SiteboundError::AlreadyTerminal { id, status })
    }

    /// Takes the session's append-only event stream
    ///
    /// The stream is lazy and single-consumer: events buffer until taken,
    /// and a second take fails with `EventsTaken`. The channel closes
    /// after `SessionEnd`.
    pub fn events(&self, id: SessionId) -> Result<mpsc::UnboundedReceiver<CrawlEvent>> {
        let sessions = self.sessions.read().unwrap();
        let entry = sessions
            .get(&id)
            .ok_or(SiteboundError::SessionNotFound(id))?;
        let receiver = entry
            .events
            .lock()
            .unwrap()
            .take()
            .ok_or(SiteboundError::EventsTaken(id));
        receiver
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(EngineConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_seed_creates_no_session() {
        let store = store();
        let result = store.start_crawl("", None);
        assert!(matches!(result, Err(SiteboundError::Url(_))));
        assert!(store.sessions.read().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_session_not_found() {
        let store = store();
        let id = SessionId::new();
        assert!(matches!(
            store.snapshot(id),
            Err(SiteboundError::SessionNotFound(_))
        ));
        assert!(matches!(
            store.stop(id),
            Err(SiteboundError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_events_taken_once() {
        let store = store();
        // A closed port: the session fails its only fetch and completes.
        let id = store.start_crawl("http://127.0.0.1:1/", None).unwrap();
        assert!(store.events(id).is_ok());
        assert!(matches!(
            store.events(id),
            Err(SiteboundError::EventsTaken(_))
        ));
    }

    #[tokio::test]
    async fn test_stop_after_terminal_is_rejected() {
        let store = store();
        let id = store.start_crawl("http://127.0.0.1:1/", None).unwrap();
        let mut events = store.events(id).unwrap();
        while events.recv().await.is_some() {}
        let status = store.snapshot(id).unwrap().status;
        assert!(status.is_terminal());
        assert!(matches!(
            store.stop(id),
            Err(SiteboundError::AlreadyTerminal { .. })
        ));
    }
}
