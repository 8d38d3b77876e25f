use url::Url;

/// Extracts the lowercase host of a URL
///
/// Returns None when the URL has no host, which cannot happen for the
/// http(s) URLs the crawler works with.
pub fn host_of(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_ascii_lowercase())
}

/// Strict same-site check between a candidate URL and the seed
///
/// True iff the host strings are equal (case-insensitive) and the
/// effective ports match. A host differing only by a subdomain label
/// (`blog.example.com` vs `example.com`) does not match: this is an exact
/// comparison, not a suffix check.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitebound::url::same_site;
///
/// let seed = Url::parse("https://example.com/").unwrap();
/// assert!(same_site(&Url::parse("https://example.com/path").unwrap(), &seed));
/// assert!(!same_site(&Url::parse("https://blog.example.com/").unwrap(), &seed));
/// ```
pub fn same_site(candidate: &Url, seed: &Url) -> bool {
    match (candidate.host_str(), seed.host_str()) {
        (Some(a), Some(b)) => {
            a.eq_ignore_ascii_case(b)
                && candidate.port_or_known_default() == seed.port_or_known_default()
        }
        _ => false,
    }
}
