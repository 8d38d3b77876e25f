//! HTTP fetcher implementation
//!
//! Builds the shared HTTP client and performs single page retrievals,
//! classifying failures so the orchestrator can apply them without
//! inspecting transport details.

use crate::config::EngineConfig;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Outcome of fetching one page
#[derive(Debug)]
pub enum FetchOutcome {
    /// 2xx response and its body
    Success {
        status: u16,
        content_type: Option<String>,
        body: String,
    },

    /// Non-2xx response status
    Http { status: u16 },

    /// Connection, DNS, timeout, or body-read failure
    Network { message: String },
}

/// Builds the HTTP client shared by every session of a store
///
/// Gzip and brotli are negotiated; redirects follow reqwest's default
/// policy so the crawler lands on the page a server actually serves.
pub fn build_http_client(config: &EngineConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.fetch_timeout())
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a single page
///
/// Never mutates session state; the classified outcome goes back to the
/// orchestrator, which applies it serially. The per-request `timeout`
/// covers the whole exchange including body download.
pub async fn fetch_page(client: &Client, url: &Url, timeout: Duration) -> FetchOutcome {
    let response = match client.get(url.clone()).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchOutcome::Network {
                message: describe_error(&e),
            }
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchOutcome::Http {
            status: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    match response.text().await {
        Ok(body) => FetchOutcome::Success {
            status: status.as_u16(),
            content_type,
            body,
        },
        Err(e) => FetchOutcome::Network {
            message: describe_error(&e),
        },
    }
}

fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_build_http_client() {
        let config = EngineConfig::default();
        assert!(build_http_client(&config).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_success_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html></html>", "text/html"),
            )
            .mount(&server)
            .await;

        let client = build_http_client(&EngineConfig::default()).unwrap();
        let url = Url::parse(&server.uri()).unwrap();
        let outcome = fetch_page(&client, &url, Duration::from_secs(5)).await;

        match outcome {
            FetchOutcome::Success {
                status,
                content_type,
                body,
            } => {
                assert_eq!(status, 200);
                assert_eq!(content_type.as_deref(), Some("text/html"));
                assert_eq!(body, "<html></html>");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_non_2xx_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = build_http_client(&EngineConfig::default()).unwrap();
        let url = Url::parse(&server.uri()).unwrap();
        let outcome = fetch_page(&client, &url, Duration::from_secs(5)).await;

        assert!(matches!(outcome, FetchOutcome::Http { status: 404 }));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_network_error() {
        let client = build_http_client(&EngineConfig::default()).unwrap();
        let url = Url::parse("http://127.0.0.1:1/").unwrap();
        let outcome = fetch_page(&client, &url, Duration::from_secs(5)).await;

        assert!(matches!(outcome, FetchOutcome::Network { .. }));
    }
}
