//! Crawl engine: fetching, link extraction, and orchestration

mod extractor;
mod fetcher;
mod orchestrator;

pub use extractor::{extract_links, ParseError};
pub use fetcher::{build_http_client, fetch_page, FetchOutcome};
pub(crate) use orchestrator::Orchestrator;

use crate::config::EngineConfig;
use crate::session::{SessionSnapshot, SessionStore};
use crate::Result;

/// Crawls one site to a terminal state and returns the final snapshot
///
/// Convenience wrapper over [`SessionStore`] for callers that do not need
/// progress polling or cancellation.
///
/// # Example
///
/// ```no_run
/// use sitebound::config::EngineConfig;
/// use sitebound::crawler::crawl;
///
/// # async fn example() -> sitebound::Result<()> {
/// let snapshot = crawl("example.com", EngineConfig::default()).await?;
/// println!("{} pages", snapshot.pages_crawled);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(seed_input: &str, config: EngineConfig) -> Result<SessionSnapshot> {
    let store = SessionStore::new(config)?;
    let id = store.start_crawl(seed_input, None)?;

    // Drain the event stream; the channel closes once the session ends.
    let mut events = store.events(id)?;
    while events.recv().await.is_some() {}

    store.snapshot(id)
}
