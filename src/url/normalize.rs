use crate::{UrlError, UrlResult};
use url::Url;

/// Completes and canonicalizes a user-supplied seed string
///
/// Accepts a bare hostname (`example.com`), a hostname with a path
/// (`example.com/docs`), or a full URL. Input without a scheme gets
/// `https://` prepended; input that already carries a scheme and host is
/// used unchanged apart from normalization. A doubled `www.www.` label is
/// a common paste artifact and collapses to a single `www.`.
///
/// # Errors
///
/// * `UrlError::Empty` - the input is empty or whitespace
/// * `UrlError::UnsupportedScheme` - a scheme other than http/https
/// * `UrlError::MissingHost` - no resolvable host after completion
/// * `UrlError::Parse` - structurally malformed input
///
/// # Examples
///
/// ```
/// use sitebound::url::complete_seed_url;
///
/// let url = complete_seed_url("example.com").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/");
///
/// let url = complete_seed_url("http://example.com/docs/").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/docs");
/// ```
pub fn complete_seed_url(input: &str) -> UrlResult<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else if let Some(rest) = trimmed.strip_prefix("www.www.") {
        format!("https://www.{}", rest)
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;
    ensure_http(&url)?;
    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(normalize(url))
}

/// Canonicalizes an already-parsed URL
///
/// Strips the fragment (fragments do not address distinct resources for
/// the crawler) and trims the path's trailing slash (the root `/` is
/// kept). The `url` crate lowercases the host during parsing. Idempotent:
/// normalizing a normalized URL returns it unchanged.
pub fn normalize(mut url: Url) -> Url {
    url.set_fragment(None);

    if url.path().len() > 1 && url.path().ends_with('/') {
        let trimmed = url.path().trim_end_matches('/').to_string();
        if trimmed.is_empty() {
            url.set_path("/");
        } else {
            url.set_path(&trimmed);
        }
    }

    url
}

/// Resolves a raw href against the page it appeared on
///
/// Relative hrefs are joined onto `base`; absolute hrefs stand alone. The
/// result must be an http(s) URL with a host, and comes back normalized.
pub fn resolve_href(href: &str, base: &Url) -> UrlResult<Url> {
    let joined = base
        .join(href.trim())
        .map_err(|e| UrlError::Parse(e.to_string()))?;
    ensure_http(&joined)?;
    if joined.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(normalize(joined))
}

fn ensure_http(url: &Url) -> UrlResult<()> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(UrlError::UnsupportedScheme(other.to_string())),
    }
}
