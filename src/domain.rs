/// Domain resolution for Site Time Guard
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Characters the popup accepts in a typed domain
static DOMAIN_INPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9.-]+$").expect("valid domain pattern"));

/// Resolve the domain key for a URL
///
/// Algorithm:
/// 1. Parse the URL and take its hostname
/// 2. Return None when there is no hostname (about:blank, data:, file:///...)
/// 3. Collapse the hostname with `normalize_host`
///
/// Examples:
/// - https://m.youtube.com/watch → youtube.com
/// - https://a.b.youtube.com → youtube.com
/// - https://news.bbc.co.uk → co.uk (multi-part suffixes are not special-cased)
pub fn domain_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;

    if host.is_empty() {
        return None;
    }

    Some(normalize_host(host))
}

/// Keep the last two labels of a hostname with three or more labels
///
/// Hosts with one or two labels are returned unchanged, so applying this
/// twice gives the same key as applying it once.
pub fn normalize_host(host: &str) -> String {
    let parts: Vec<&str> = host.split('.').collect();

    if parts.len() >= 3 {
        parts[parts.len() - 2..].join(".")
    } else {
        host.to_string()
    }
}

/// Clean up a domain typed into the popup, or None if it is not acceptable
pub fn clean_domain_input(input: &str) -> Option<String> {
    let domain = input.trim().to_lowercase();

    if is_valid_domain_input(&domain) {
        Some(domain)
    } else {
        None
    }
}

/// Check a (trimmed, lower-cased) domain against the allowed character set
pub fn is_valid_domain_input(domain: &str) -> bool {
    DOMAIN_INPUT.is_match(domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_from_url_basic() {
        assert_eq!(domain_from_url("https://youtube.com"), Some("youtube.com".to_string()));
        assert_eq!(domain_from_url("http://youtube.com/watch?v=1"), Some("youtube.com".to_string()));
        assert_eq!(domain_from_url("https://www.google.com/search?q=rust"), Some("google.com".to_string()));
    }

    #[test]
    fn test_domain_from_url_subdomains() {
        assert_eq!(domain_from_url("https://m.youtube.com"), Some("youtube.com".to_string()));
        assert_eq!(domain_from_url("https://a.b.youtube.com/feed"), Some("youtube.com".to_string()));
        assert_eq!(domain_from_url("https://old.reddit.com:8443/r/rust"), Some("reddit.com".to_string()));
    }

    #[test]
    fn test_domain_from_url_keeps_two_labels_for_multi_part_suffix() {
        assert_eq!(domain_from_url("https://news.bbc.co.uk"), Some("co.uk".to_string()));
    }

    #[test]
    fn test_domain_from_url_unresolvable() {
        assert_eq!(domain_from_url(""), None);
        assert_eq!(domain_from_url("not a url"), None);
        assert_eq!(domain_from_url("about:blank"), None);
        assert_eq!(domain_from_url("file:///home/user/notes.txt"), None);
    }

    #[test]
    fn test_domain_from_url_single_label_host() {
        assert_eq!(domain_from_url("http://localhost:3000/"), Some("localhost".to_string()));
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("a.b.youtube.com"), "youtube.com");
        assert_eq!(normalize_host("youtube.com"), "youtube.com");
        assert_eq!(normalize_host("localhost"), "localhost");
    }

    #[test]
    fn test_normalize_host_is_idempotent() {
        for host in ["a.b.youtube.com", "m.youtube.com", "youtube.com", "localhost", ""] {
            let once = normalize_host(host);
            assert_eq!(normalize_host(&once), once);
        }
    }

    #[test]
    fn test_clean_domain_input() {
        assert_eq!(clean_domain_input("  YouTube.com "), Some("youtube.com".to_string()));
        assert_eq!(clean_domain_input("my-site.io"), Some("my-site.io".to_string()));
        assert_eq!(clean_domain_input(""), None);
        assert_eq!(clean_domain_input("https://youtube.com"), None);
        assert_eq!(clean_domain_input("you tube.com"), None);
    }
}
