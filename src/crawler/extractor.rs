//! Link extraction from fetched page bodies

use scraper::{Html, Selector};
use std::collections::HashSet;
use thiserror::Error;

/// The body could not be interpreted as a link-bearing HTML document
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ParseError(String);

/// Extracts candidate hrefs from a page body
///
/// Returns the deduplicated hrefs in document order. A response whose
/// content type says the body is not HTML fails with [`ParseError`];
/// anchor-free or badly nested markup still parses (the parser is
/// lenient) and simply yields no links.
///
/// Hrefs that can never address a crawlable page (`javascript:`,
/// `mailto:`, `tel:`, `data:`, empty, and fragment-only) are skipped.
///
/// # Example
///
/// ```
/// use sitebound::crawler::extract_links;
///
/// let body = r#"<a href="/docs">Docs</a><a href="mailto:x@y.z">Mail</a>"#;
/// let links = extract_links(body, Some("text/html")).unwrap();
/// assert_eq!(links, vec!["/docs".to_string()]);
/// ```
pub fn extract_links(body: &str, content_type: Option<&str>) -> Result<Vec<String>, ParseError> {
    if let Some(content_type) = content_type {
        if !is_html(content_type) {
            return Err(ParseError(format!(
                "content type {} is not HTML",
                content_type
            )));
        }
    }

    let document = Html::parse_document(body);
    let selector =
        Selector::parse("a[href]").map_err(|e| ParseError(format!("invalid selector: {e}")))?;

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if should_skip(href) {
            continue;
        }
        if seen.insert(href.to_string()) {
            links.push(href.to_string());
        }
    }

    Ok(links)
}

fn is_html(content_type: &str) -> bool {
    content_type.contains("text/html") || content_type.contains("application/xhtml")
}

fn should_skip(href: &str) -> bool {
    href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_relative_and_absolute() {
        let body = r#"<html><body>
            <a href="/page1">One</a>
            <a href="https://other.com/page2">Two</a>
        </body></html>"#;
        let links = extract_links(body, Some("text/html")).unwrap();
        assert_eq!(links, vec!["/page1", "https://other.com/page2"]);
    }

    #[test]
    fn test_dedup_preserves_document_order() {
        let body = r#"
            <a href="/b">B</a>
            <a href="/a">A</a>
            <a href="/b">B again</a>
        "#;
        let links = extract_links(body, Some("text/html")).unwrap();
        assert_eq!(links, vec!["/b", "/a"]);
    }

    #[test]
    fn test_skip_non_page_schemes() {
        let body = r#"
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:test@example.com">Mail</a>
            <a href="tel:+123456789">Call</a>
            <a href="data:text/html,hi">Data</a>
            <a href="/real">Real</a>
        "#;
        let links = extract_links(body, Some("text/html")).unwrap();
        assert_eq!(links, vec!["/real"]);
    }

    #[test]
    fn test_skip_fragment_only_and_empty() {
        let body = r##"
            <a href="#section">Jump</a>
            <a href="">Empty</a>
            <a href="  ">Blank</a>
        "##;
        let links = extract_links(body, Some("text/html")).unwrap();
        assert!(links.is_empty());
    }

    #[test]
    fn test_missing_content_type_is_parsed() {
        let body = r#"<a href="/page">Link</a>"#;
        let links = extract_links(body, None).unwrap();
        assert_eq!(links, vec!["/page"]);
    }

    #[test]
    fn test_non_html_content_type_fails() {
        let result = extract_links("{\"not\": \"html\"}", Some("application/json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_charset_suffix_still_html() {
        let body = r#"<a href="/page">Link</a>"#;
        let links = extract_links(body, Some("text/html; charset=utf-8")).unwrap();
        assert_eq!(links, vec!["/page"]);
    }

    #[test]
    fn test_anchor_free_body_yields_nothing() {
        let links = extract_links("<html><body><p>plain</p></body></html>", Some("text/html"))
            .unwrap();
        assert!(links.is_empty());
    }

    #[test]
    fn test_malformed_markup_still_parses() {
        let body = r#"<html><body><a href="/ok">unclosed"#;
        let links = extract_links(body, Some("text/html")).unwrap();
        assert_eq!(links, vec!["/ok"]);
    }
}
