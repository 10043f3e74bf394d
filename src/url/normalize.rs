use regex::Regex;
use std::sync::OnceLock;

/// Absolute http(s) URL with a dotted host ending in an alphabetic TLD, an optional
/// port, and an optional path.
const VALID_URL_PATTERN: &str = r"(?i)^(https?://)([a-z0-9.-]+\.[a-z]{2,})(:[0-9]+)?(/.*)?$";

fn valid_url_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(VALID_URL_PATTERN).expect("valid URL pattern compiles"))
}

/// Normalizes a URL into its frontier dedup key
///
/// The key is the URL with every trailing slash removed, so `https://a.test/b/` and
/// `https://a.test/b` are the same frontier entry. Nothing else about the URL changes:
/// scheme, host case, query and fragment are kept as discovered.
///
/// # Examples
///
/// ```
/// use frontier_spider::url::normalize_url;
///
/// assert_eq!(normalize_url("http://a.test/"), "http://a.test");
/// assert_eq!(normalize_url("http://a.test/b//"), "http://a.test/b");
/// assert_eq!(normalize_url("http://a.test/b"), "http://a.test/b");
/// ```
pub fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Checks whether a discovered link is a syntactically valid absolute URL
///
/// Only `http`/`https` URLs whose host contains a dot and ends in an alphabetic
/// top-level label qualify. Bare hosts (`localhost`) and IP literals are rejected.
///
/// # Examples
///
/// ```
/// use frontier_spider::url::is_valid_url;
///
/// assert!(is_valid_url("https://www.example.ac.in/dept/cse"));
/// assert!(is_valid_url("http://a.test:8080/"));
/// assert!(!is_valid_url("ftp://example.com/file"));
/// assert!(!is_valid_url("/relative/path"));
/// ```
pub fn is_valid_url(url: &str) -> bool {
    valid_url_regex().is_match(url)
}
