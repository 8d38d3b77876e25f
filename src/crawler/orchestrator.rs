//! Crawl orchestration - main crawl loop
//!
//! One orchestrator task drives each session. It owns the frontier and
//! the visited set outright; fetch workers are pure producers that hand
//! their results back for serialized application. Workers never touch
//! the queue, the dedupe record, or the counters, so no crawl state is
//! ever mutated concurrently.

use crate::crawler::extractor::{extract_links, ParseError};
use crate::crawler::fetcher::{fetch_page, FetchOutcome};
use crate::events::{CrawlEvent, CrawlSummary};
use crate::session::{PageErrorKind, PageFailure, SessionShared, SessionStatus};
use crate::url::{resolve_href, same_site};
use reqwest::Client;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// What a fetch worker hands back to the orchestrator
struct PageOutcome {
    url: Url,
    result: PageResult,
}

enum PageResult {
    /// 2xx page; `links` holds the extracted hrefs or a parse failure
    Fetched {
        status: u16,
        links: Result<Vec<String>, ParseError>,
    },
    Http {
        status: u16,
    },
    Network {
        message: String,
    },
}

/// Drives one crawl session from `Pending` to a terminal state
pub struct Orchestrator {
    client: Client,
    seed: Url,
    shared: Arc<SessionShared>,
    events: UnboundedSender<CrawlEvent>,
    limiter: Arc<Semaphore>,
    fetch_timeout: Duration,

    /// FIFO queue of normalized, unvisited, on-site URLs
    frontier: VecDeque<Url>,

    /// Everything ever enqueued: the union of `visited` and `frontier`
    seen: HashSet<Url>,

    /// URLs already dispatched for fetching
    visited: HashSet<Url>,
}

impl Orchestrator {
    pub(crate) fn new(
        client: Client,
        seed: Url,
        shared: Arc<SessionShared>,
        events: UnboundedSender<CrawlEvent>,
        max_concurrent: usize,
        fetch_timeout: Duration,
    ) -> Self {
        let mut frontier = VecDeque::new();
        let mut seen = HashSet::new();
        frontier.push_back(seed.clone());
        seen.insert(seed.clone());

        Self {
            client,
            seed,
            shared,
            events,
            limiter: Arc::new(Semaphore::new(max_concurrent.max(1))),
            fetch_timeout,
            frontier,
            seen,
            visited: HashSet::new(),
        }
    }

    /// Runs the session to a terminal state
    pub(crate) async fn run(mut self) {
        if !self.shared.transition(SessionStatus::Running) {
            // A stop request landed before the first dispatch.
            self.finish(SessionStatus::Stopped);
            return;
        }

        self.emit(CrawlEvent::SessionStart {
            id: self.shared.id(),
            seed: self.seed.to_string(),
        });
        tracing::info!("Session {}: crawling {}", self.shared.id(), self.seed);

        let terminal = self.crawl_loop().await;
        self.finish(terminal);
    }

    async fn crawl_loop(&mut self) -> SessionStatus {
        let mut in_flight: JoinSet<PageOutcome> = JoinSet::new();

        loop {
            // Dispatch until the frontier drains. The stop signal is
            // observed before every individual dispatch.
            while self.shared.status() == SessionStatus::Running {
                let Some(url) = self.frontier.pop_front() else {
                    break;
                };
                if !self.visited.insert(url.clone()) {
                    self.fault(format!("frontier URL {url} was already visited"));
                    in_flight.abort_all();
                    return SessionStatus::Failed;
                }
                tracing::debug!("Dispatching {url}");
                in_flight.spawn(fetch_worker(
                    self.client.clone(),
                    Arc::clone(&self.limiter),
                    url,
                    self.fetch_timeout,
                ));
            }

            if self.shared.status() == SessionStatus::Stopping {
                // Let in-flight fetches finish; their results are
                // discarded without enqueuing further work.
                while in_flight.join_next().await.is_some() {}
                return SessionStatus::Stopped;
            }

            match in_flight.join_next().await {
                None => return SessionStatus::Completed,
                Some(Ok(page)) => {
                    if self.shared.status() == SessionStatus::Stopping {
                        // A stop arrived while this fetch was in flight;
                        // its result is discarded, the rest drain above.
                        continue;
                    }
                    if let Err(fault) = self.apply(page) {
                        self.fault(fault);
                        in_flight.abort_all();
                        return SessionStatus::Failed;
                    }
                }
                Some(Err(join_error)) => {
                    self.fault(format!("fetch worker died: {join_error}"));
                    in_flight.abort_all();
                    return SessionStatus::Failed;
                }
            }
        }
    }

    /// Applies one worker result
    ///
    /// The only place counters, the frontier, and the error list change.
    /// Returns Err on a bookkeeping invariant violation, the one fault
    /// class that fails the session.
    fn apply(&mut self, page: PageOutcome) -> Result<(), String> {
        if !self.visited.contains(&page.url) {
            return Err(format!(
                "completed fetch for {} which was never dispatched",
                page.url
            ));
        }

        match page.result {
            PageResult::Fetched { status, links } => match links {
                Ok(hrefs) => {
                    let discovered = self.resolve_links(&page.url, hrefs);
                    self.shared.add_page_crawled();
                    self.shared.add_links_found(discovered.len() as u64);
                    tracing::info!(
                        "Crawled {} (HTTP {}, {} links)",
                        page.url,
                        status,
                        discovered.len()
                    );
                    self.emit(CrawlEvent::PageFetched {
                        url: page.url.to_string(),
                        links: discovered.iter().map(|u| u.to_string()).collect(),
                    });
                    self.enqueue(discovered);
                }
                Err(parse_error) => {
                    // The page was fetched; it counts as crawled even
                    // though it contributed no links.
                    self.shared.add_page_crawled();
                    self.record_failure(&page.url, PageErrorKind::Parse, parse_error.to_string());
                }
            },
            PageResult::Http { status } => {
                self.record_failure(&page.url, PageErrorKind::Http, format!("HTTP {status}"));
            }
            PageResult::Network { message } => {
                self.record_failure(&page.url, PageErrorKind::Network, message);
            }
        }

        Ok(())
    }

    /// Resolves raw hrefs against the page they appeared on
    ///
    /// Unresolvable hrefs are logged and dropped; they are not errors.
    fn resolve_links(&self, base: &Url, hrefs: Vec<String>) -> Vec<Url> {
        hrefs
            .into_iter()
            .filter_map(|href| match resolve_href(&href, base) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::debug!("Dropping href {:?} on {}: {}", href, base, e);
                    None
                }
            })
            .collect()
    }

    /// Appends on-site, never-seen URLs to the frontier in discovery order
    fn enqueue(&mut self, discovered: Vec<Url>) {
        for url in discovered {
            if !same_site(&url, &self.seed) {
                tracing::trace!("Off-site link {url} skipped");
                continue;
            }
            if self.seen.insert(url.clone()) {
                self.frontier.push_back(url);
            }
        }
    }

    fn record_failure(&self, url: &Url, kind: PageErrorKind, message: String) {
        tracing::warn!("{} for {}: {}", kind, url, message);
        self.shared.record_failure(PageFailure {
            url: url.to_string(),
            kind,
            message: message.clone(),
        });
        self.emit(CrawlEvent::PageError {
            url: url.to_string(),
            kind,
            message,
        });
    }

    fn fault(&self, message: String) {
        tracing::error!("Session {} internal fault: {}", self.shared.id(), message);
    }

    fn finish(&self, terminal: SessionStatus) {
        if !self.shared.transition(terminal) {
            tracing::error!(
                "Session {}: could not enter {} from {}",
                self.shared.id(),
                terminal,
                self.shared.status()
            );
        }
        self.emit(CrawlEvent::SessionEnd {
            summary: self.summary(),
        });
        tracing::info!(
            "Session {} finished: {} ({} pages, {} links, {} errors)",
            self.shared.id(),
            self.shared.status(),
            self.shared.pages_crawled(),
            self.shared.links_found(),
            self.shared.error_count()
        );
    }

    fn summary(&self) -> CrawlSummary {
        CrawlSummary {
            status: self.shared.status(),
            pages_crawled: self.shared.pages_crawled(),
            links_found: self.shared.links_found(),
            error_count: self.shared.error_count(),
            elapsed_secs: self.shared.elapsed().as_secs_f64(),
        }
    }

    fn emit(&self, event: CrawlEvent) {
        // The receiver may already be gone; event delivery is best-effort.
        let _ = self.events.send(event);
    }
}

/// Fetch+extract pipeline for one URL
///
/// Pure producer: acquires a limiter permit, performs the bounded fetch,
/// extracts links from a successful body, and returns the outcome without
/// touching session state. The permit covers the whole fetch+parse and is
/// released on every path when it drops.
async fn fetch_worker(
    client: Client,
    limiter: Arc<Semaphore>,
    url: Url,
    timeout: Duration,
) -> PageOutcome {
    let _permit = match limiter.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            // The limiter is never closed while workers run; report a
            // transport-level failure instead of panicking if it is.
            return PageOutcome {
                url,
                result: PageResult::Network {
                    message: "concurrency limiter closed".to_string(),
                },
            };
        }
    };

    let result = match fetch_page(&client, &url, timeout).await {
        FetchOutcome::Success {
            status,
            content_type,
            body,
        } => PageResult::Fetched {
            status,
            links: extract_links(&body, content_type.as_deref()),
        },
        FetchOutcome::Http { status } => PageResult::Http { status },
        FetchOutcome::Network { message } => PageResult::Network { message },
    };

    PageOutcome { url, result }
}
