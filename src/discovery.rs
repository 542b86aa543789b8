// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Same-Site Page Discovery
 * Bounded breadth-first crawl with domain scoping and URL canonicalization
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::config::CrawlSettings;
use crate::errors::ScanError;
use crate::http_client::HttpClient;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};
use url::Url;

/// Permissive anchor-href harvesting. Link extraction only needs the href
/// values, and adversarial markup must never take the crawl down, so this is
/// a pattern match rather than a strict parse.
static HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']+)["']"#).unwrap());

/// Binary and asset extensions that are never pages worth scanning.
const SKIP_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".avif", ".ico", ".css", ".js", ".mjs",
    ".json", ".xml", ".pdf", ".zip", ".gz", ".tar", ".rar", ".7z", ".mp3", ".mp4", ".webm",
    ".avi", ".mov", ".woff", ".woff2", ".ttf", ".eot", ".otf", ".map", ".wasm", ".exe", ".dmg",
    ".apk",
];

/// Path segments that mark framework plumbing or feeds, not content pages.
const SKIP_SEGMENTS: &[&str] = &[
    "/_next/", "/_nuxt/", "/static/", "/assets/", "/api/", "/cdn-cgi/", "/wp-json/", "/favicon",
    "/feed", "/rss", "/.well-known/",
];

/// Href values that can never resolve to a same-site page, plus encoded
/// angle brackets that mark injection attempts rather than navigation.
const SKIP_PREFIXES: &[&str] = &["#", "data:", "mailto:", "tel:", "javascript:"];
const INJECTION_MARKERS: &[&str] = &["%3c", "%3e", "&lt;", "&gt;", "<", ">"];

/// Discovers same-site pages around a seed URL.
///
/// Breadth-first, so shallow pages surface before deep ones; bounded by the
/// configured page cap; scoped to the seed's registrable domain. The link
/// graph is adversarial input - cyclic, unbounded, possibly hostile - so
/// dedup and scope filtering are applied before a URL is ever enqueued.
pub struct CrawlDiscoverer {
    http_client: HttpClient,
    settings: CrawlSettings,
}

impl CrawlDiscoverer {
    pub fn new(settings: CrawlSettings) -> Result<Self> {
        let http_client = HttpClient::new(settings.probe_timeout(), settings.max_body_bytes)?;
        Ok(Self {
            http_client,
            settings,
        })
    }

    /// Walk the site starting at `seed` and return up to `max_pages` URLs in
    /// discovery order. The seed is always first. A page that fails to fetch
    /// is dropped silently; only an invalid seed is an error.
    pub async fn discover(&self, seed: &str) -> Result<Vec<String>, ScanError> {
        let seed_url = parse_page_url(seed)?;
        let seed_domain = registrable_domain(&seed_url).ok_or_else(|| ScanError::InvalidTarget {
            url: seed.to_string(),
            reason: "URL has no usable hostname".to_string(),
        })?;

        info!("[Discovery] Starting crawl of {}", seed);

        let mut visited: HashSet<String> = HashSet::new();
        let mut found: Vec<String> = Vec::new();
        let mut queue: VecDeque<String> = VecDeque::new();

        visited.insert(normalize(&seed_url));
        found.push(seed.to_string());
        queue.push_back(seed.to_string());

        while found.len() < self.settings.max_pages {
            let current = match queue.pop_front() {
                Some(url) => url,
                None => break,
            };

            let response = match self.http_client.get(&current).await {
                Ok(response) => response,
                Err(e) => {
                    debug!("[Discovery] Probe of {} failed, dropping node: {}", current, e);
                    continue;
                }
            };

            // Redirects may have moved us; scope decisions use where we landed.
            let final_url = match Url::parse(&response.final_url) {
                Ok(url) => url,
                Err(e) => {
                    warn!("[Discovery] Unparseable final URL for {}: {}", current, e);
                    continue;
                }
            };

            match registrable_domain(&final_url) {
                Some(domain) if domain == seed_domain => {}
                _ => {
                    debug!(
                        "[Discovery] {} redirected off-domain to {}, discarding",
                        current, response.final_url
                    );
                    continue;
                }
            }

            // A redirect target is a discovery of its own
            let final_normalized = normalize(&final_url);
            if visited.insert(final_normalized.clone()) && found.len() < self.settings.max_pages {
                found.push(final_normalized);
            }

            if !response.is_html() {
                continue;
            }

            for captures in HREF_RE.captures_iter(&response.body) {
                if found.len() >= self.settings.max_pages {
                    break;
                }

                let href = match captures.get(1) {
                    Some(m) => m.as_str().trim(),
                    None => continue,
                };
                if should_skip_href(href) {
                    continue;
                }

                let resolved = match final_url.join(href) {
                    Ok(url) => url,
                    Err(_) => continue,
                };
                if !matches!(resolved.scheme(), "http" | "https") {
                    continue;
                }
                match registrable_domain(&resolved) {
                    Some(domain) if domain == seed_domain => {}
                    _ => continue,
                }

                let normalized = normalize(&resolved);
                if visited.insert(normalized.clone()) {
                    found.push(normalized.clone());
                    queue.push_back(normalized);
                }
            }
        }

        found.truncate(self.settings.max_pages);
        info!("[Discovery] Crawl complete: {} pages", found.len());
        Ok(found)
    }
}

/// Validate a caller-supplied URL as a scannable http/https page address.
pub fn parse_page_url(raw: &str) -> Result<Url, ScanError> {
    let url = Url::parse(raw).map_err(|e| ScanError::InvalidTarget {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScanError::InvalidTarget {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    if url.host_str().is_none() {
        return Err(ScanError::InvalidTarget {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}

/// The crawl's same-site boundary: the last two dot-separated labels of the
/// hostname, lowercased. IP addresses are their own boundary.
pub fn registrable_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();

    if host.parse::<std::net::IpAddr>().is_ok() {
        return Some(host);
    }

    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.is_empty() {
        return None;
    }
    if labels.len() <= 2 {
        return Some(labels.join("."));
    }
    Some(labels[labels.len() - 2..].join("."))
}

/// Canonical form used for dedup: origin + path + query. Fragments and
/// credentials never distinguish pages.
pub fn normalize(url: &Url) -> String {
    let origin = url.origin().ascii_serialization();
    match url.query() {
        Some(query) if !query.is_empty() => format!("{}{}?{}", origin, url.path(), query),
        _ => format!("{}{}", origin, url.path()),
    }
}

fn should_skip_href(href: &str) -> bool {
    if href.is_empty() {
        return true;
    }

    let lower = href.to_lowercase();

    if SKIP_PREFIXES.iter().any(|prefix| lower.starts_with(prefix)) {
        return true;
    }
    if INJECTION_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return true;
    }

    // Extension check on the path alone, not the query string
    let path = lower.split(['?', '#']).next().unwrap_or(&lower);
    if SKIP_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return true;
    }
    if SKIP_SEGMENTS.iter().any(|segment| lower.contains(segment)) {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registrable_domain_collapses_subdomains() {
        let url = Url::parse("https://shop.eu.example.com/cart").unwrap();
        assert_eq!(registrable_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_registrable_domain_bare_host() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(registrable_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_registrable_domain_ip_host() {
        let url = Url::parse("http://192.0.2.7:8080/").unwrap();
        assert_eq!(registrable_domain(&url), Some("192.0.2.7".to_string()));
    }

    #[test]
    fn test_normalize_strips_fragment_keeps_query() {
        let url = Url::parse("https://example.com/path?a=1#section").unwrap();
        assert_eq!(normalize(&url), "https://example.com/path?a=1");
    }

    #[test]
    fn test_normalize_without_query() {
        let url = Url::parse("https://example.com/path#top").unwrap();
        assert_eq!(normalize(&url), "https://example.com/path");
    }

    #[test]
    fn test_skip_fragments_and_pseudo_schemes() {
        assert!(should_skip_href(""));
        assert!(should_skip_href("#top"));
        assert!(should_skip_href("mailto:team@example.com"));
        assert!(should_skip_href("tel:+358401234567"));
        assert!(should_skip_href("javascript:void(0)"));
        assert!(should_skip_href("data:text/html;base64,xyz"));
    }

    #[test]
    fn test_skip_injection_markers() {
        assert!(should_skip_href("/search?q=%3Cscript%3E"));
        assert!(should_skip_href("/page?x=&lt;img&gt;"));
    }

    #[test]
    fn test_skip_asset_extensions() {
        assert!(should_skip_href("/logo.png"));
        assert!(should_skip_href("/bundle.js?v=3"));
        assert!(should_skip_href("/style.css"));
        assert!(!should_skip_href("/pricing"));
        assert!(!should_skip_href("/docs/getting-started"));
    }

    #[test]
    fn test_skip_non_content_segments() {
        assert!(should_skip_href("/_next/data/build/page.json"));
        assert!(should_skip_href("/api/v1/users"));
        assert!(should_skip_href("/favicon.ico"));
        assert!(!should_skip_href("/apidocs"));
    }

    #[test]
    fn test_href_regex_tolerates_messy_markup() {
        let html = r#"
            <a class="x" href="/one">one</a>
            <A HREF='/two'>two</A>
            <a href="/three" broken
            <a href=>empty</a>
            <a>no href</a>
        "#;
        let hrefs: Vec<&str> = HREF_RE
            .captures_iter(html)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
        assert!(hrefs.contains(&"/one"));
        assert!(hrefs.contains(&"/two"));
    }

    #[test]
    fn test_parse_page_url_rejects_non_http() {
        assert!(parse_page_url("ftp://example.com/").is_err());
        assert!(parse_page_url("not a url").is_err());
        assert!(parse_page_url("https://example.com/").is_ok());
    }
}
