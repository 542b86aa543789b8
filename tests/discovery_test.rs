// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Page Discovery Tests
 * Tests for BFS ordering, dedup, domain scoping, caps, and redirect handling
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use luotain_scanner::config::CrawlSettings;
use luotain_scanner::discovery::CrawlDiscoverer;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string().into_bytes(), "text/html")
}

fn discoverer(max_pages: usize) -> CrawlDiscoverer {
    CrawlDiscoverer::new(CrawlSettings {
        max_pages,
        probe_timeout_secs: 5,
        max_body_bytes: 512 * 1024,
    })
    .unwrap()
}

#[tokio::test]
async fn test_seed_is_always_first() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html><a href=\"/about\">about</a></html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html("<html>about</html>"))
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());
    let found = discoverer(5).discover(&seed).await.unwrap();

    assert_eq!(found[0], seed);
    assert!(found.len() >= 2);
}

#[tokio::test]
async fn test_breadth_first_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            "<html><a href=\"/a\">a</a><a href=\"/b\">b</a></html>",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html("<html><a href=\"/a/deep\">deep</a></html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html("<html>b</html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a/deep"))
        .respond_with(html("<html>deep</html>"))
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());
    let found = discoverer(10).discover(&seed).await.unwrap();

    let pos = |suffix: &str| {
        found
            .iter()
            .position(|u| u.ends_with(suffix))
            .unwrap_or(usize::MAX)
    };

    // Both shallow siblings surface before the deep page
    assert!(pos("/a") < pos("/a/deep"));
    assert!(pos("/b") < pos("/a/deep"));
}

#[tokio::test]
async fn test_page_cap_is_respected() {
    let server = MockServer::start().await;

    let mut links = String::new();
    for i in 0..20 {
        links.push_str(&format!("<a href=\"/page{}\">p{}</a>", i, i));
    }
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!("<html>{}</html>", links)))
        .mount(&server)
        .await;
    for i in 0..20 {
        Mock::given(method("GET"))
            .and(path(format!("/page{}", i)))
            .respond_with(html("<html>leaf</html>"))
            .mount(&server)
            .await;
    }

    let seed = format!("{}/", server.uri());
    let found = discoverer(5).discover(&seed).await.unwrap();

    assert_eq!(found.len(), 5);
}

#[tokio::test]
async fn test_no_duplicate_normalized_urls() {
    let server = MockServer::start().await;

    // Same page under a fragment, a repeat, and a self-link
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            "<html>\
             <a href=\"/pricing\">one</a>\
             <a href=\"/pricing#plans\">two</a>\
             <a href=\"/pricing\">three</a>\
             <a href=\"/\">self</a>\
             </html>",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pricing"))
        .respond_with(html("<html><a href=\"/\">home</a></html>"))
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());
    let found = discoverer(10).discover(&seed).await.unwrap();

    let mut deduped = found.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), found.len());

    let pricing_count = found.iter().filter(|u| u.contains("/pricing")).count();
    assert_eq!(pricing_count, 1);
}

#[tokio::test]
async fn test_offsite_links_never_enter_the_frontier() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            "<html>\
             <a href=\"https://evil.example/attack\">bad</a>\
             <a href=\"/safe\">good</a>\
             </html>",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/safe"))
        .respond_with(html("<html>safe</html>"))
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());
    let found = discoverer(10).discover(&seed).await.unwrap();

    assert!(found.iter().all(|u| !u.contains("evil.example")));
    assert!(found.iter().any(|u| u.ends_with("/safe")));
}

#[tokio::test]
async fn test_redirect_off_domain_is_discarded() {
    // Seed host is 127.0.0.1; localhost is a different registrable domain
    // even though both resolve to the same loopback.
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let other_port = other.address().port();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html><a href=\"/away\">away</a></html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/away"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("http://localhost:{}/landed", other_port)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/landed"))
        .respond_with(html("<html><a href=\"/more\">more</a></html>"))
        .mount(&other)
        .await;

    let seed = format!("{}/", server.uri());
    let found = discoverer(10).discover(&seed).await.unwrap();

    assert!(found.iter().all(|u| !u.contains("localhost")));
    assert!(found.iter().all(|u| !u.contains("/landed")));
    assert!(found.iter().all(|u| !u.contains("/more")));
}

#[tokio::test]
async fn test_same_domain_redirect_records_final_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html><a href=\"/old\">old</a></html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html("<html>moved here</html>"))
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());
    let found = discoverer(10).discover(&seed).await.unwrap();

    assert!(found.iter().any(|u| u.ends_with("/new")));
}

#[tokio::test]
async fn test_failed_probe_drops_only_that_node() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            "<html><a href=\"/broken\">broken</a><a href=\"/fine\">fine</a></html>",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(30)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fine"))
        .respond_with(html("<html>fine</html>"))
        .mount(&server)
        .await;

    let settings = CrawlSettings {
        max_pages: 10,
        probe_timeout_secs: 1,
        max_body_bytes: 512 * 1024,
    };
    let seed = format!("{}/", server.uri());
    let found = CrawlDiscoverer::new(settings)
        .unwrap()
        .discover(&seed)
        .await
        .unwrap();

    // Both links were discovered from the seed; the hung probe only stops
    // /broken from contributing further links.
    assert!(found.iter().any(|u| u.ends_with("/fine")));
    assert!(found.iter().any(|u| u.ends_with("/broken")));
}

#[tokio::test]
async fn test_non_html_page_counts_but_is_not_parsed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html><a href=\"/notes\">notes</a></html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/notes"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain")
                .set_body_string("see /secret-page for details <a href=\"/secret-page\">x</a>"),
        )
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());
    let found = discoverer(10).discover(&seed).await.unwrap();

    assert!(found.iter().any(|u| u.ends_with("/notes")));
    assert!(found.iter().all(|u| !u.contains("/secret-page")));
}

#[tokio::test]
async fn test_asset_and_pseudo_links_are_filtered() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            "<html>\
             <a href=\"/logo.png\">logo</a>\
             <a href=\"/api/v1/status\">api</a>\
             <a href=\"mailto:sales@example.com\">mail</a>\
             <a href=\"javascript:alert(1)\">js</a>\
             <a href=\"#footer\">frag</a>\
             <a href=\"/docs\">docs</a>\
             </html>",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(html("<html>docs</html>"))
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());
    let found = discoverer(10).discover(&seed).await.unwrap();

    assert_eq!(found.len(), 2);
    assert!(found[1].ends_with("/docs"));
}

#[tokio::test]
async fn test_invalid_seed_is_an_error() {
    let result = discoverer(5).discover("not a url").await;
    assert!(result.is_err());

    let result = discoverer(5).discover("ftp://example.com/").await;
    assert!(result.is_err());
}
