use crate::{UrlError, UrlResult};
use std::net::IpAddr;
use url::Url;

/// Second-level labels that sit under a two-letter country code and belong to the
/// public suffix (`ac.in`, `co.uk`, `gov.au`, ...)
const SECOND_LEVEL_SUFFIXES: &[&str] = &["ac", "co", "com", "edu", "gov", "net", "org"];

/// Derives the site domain of a host
///
/// The site domain is what link filtering compares against: the registrable part of
/// the host, without `www.` or other subdomains. IP literals are returned unchanged.
///
/// # Examples
///
/// ```
/// use frontier_spider::url::site_domain;
///
/// assert_eq!(site_domain("www.example.com"), "example.com");
/// assert_eq!(site_domain("erp.iitkgp.ac.in"), "iitkgp.ac.in");
/// assert_eq!(site_domain("blog.example.co.uk"), "example.co.uk");
/// assert_eq!(site_domain("127.0.0.1"), "127.0.0.1");
/// ```
pub fn site_domain(host: &str) -> String {
    let host = host.trim_end_matches('.').to_lowercase();

    if host.parse::<IpAddr>().is_ok() {
        return host;
    }

    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() <= 2 {
        return labels.join(".");
    }

    let tld = labels[labels.len() - 1];
    let second = labels[labels.len() - 2];
    let keep = if tld.len() == 2 && SECOND_LEVEL_SUFFIXES.contains(&second) {
        3
    } else {
        2
    };

    labels[labels.len() - keep..].join(".")
}

/// Checks if a host belongs to a site domain
///
/// Matches the site domain itself and any of its subdomains, at label boundaries
/// only: `notexample.com` is not part of `example.com`.
pub fn is_same_site(host: &str, site: &str) -> bool {
    let host = host.to_lowercase();
    host == site || host.ends_with(&format!(".{}", site))
}

/// Derives the site domain of an absolute http(s) URL
///
/// # Returns
///
/// * `Ok(String)` - The site domain of the URL's host
/// * `Err(UrlError)` - The URL does not parse, is not http(s), or has no host
pub fn site_of_url(url: &str) -> UrlResult<String> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse(format!("{}: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::InvalidScheme(other.to_string())),
    }

    let host = parsed.host_str().ok_or(UrlError::MissingHost)?;
    Ok(site_domain(host))
}
