//! End-to-end tests for the map endpoint

mod common;

use common::spawn_app;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::json;
use std::io::Write;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{base}/p1</loc></url>
  <url><loc>{base}/p2</loc></url>
</urlset>"#;

fn sitemap_for(base: &str) -> String {
    SITEMAP.replace("{base}", base)
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Mounts a homepage with a single anchor to /p3
async fn serve_home(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<html><body><a href="/p3">three</a></body></html>"#)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn post_map(app: &common::TestApp, body: serde_json::Value) -> serde_json::Value {
    let response = app
        .client
        .post(app.url("/v1/map"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    response.json().await.unwrap()
}

fn links_of(body: &serde_json::Value) -> Vec<String> {
    body["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_map_sitemap_plus_harvest_ordering() {
    let app = spawn_app().await;
    let site = MockServer::start().await;
    let base = site.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap_for(&base)))
        .mount(&site)
        .await;
    serve_home(&site).await;

    let body = post_map(&app, json!({"url": format!("{}/", base), "limit": 10})).await;

    assert_eq!(body["success"], true);
    assert_eq!(
        links_of(&body),
        vec![
            format!("{}/", base),
            format!("{}/p1", base),
            format!("{}/p2", base),
            format!("{}/p3", base),
        ]
    );
}

#[tokio::test]
async fn test_map_gzip_sitemap_equivalent() {
    let app = spawn_app().await;
    let site = MockServer::start().await;
    let base = site.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(gzip(sitemap_for(&base).as_bytes()))
                .insert_header("content-encoding", "gzip"),
        )
        .mount(&site)
        .await;
    serve_home(&site).await;

    let body = post_map(&app, json!({"url": format!("{}/", base), "limit": 10})).await;

    assert_eq!(
        links_of(&body),
        vec![
            format!("{}/", base),
            format!("{}/p1", base),
            format!("{}/p2", base),
            format!("{}/p3", base),
        ]
    );
}

#[tokio::test]
async fn test_map_gz_suffix_sitemap_via_robots_hint() {
    let app = spawn_app().await;
    let site = MockServer::start().await;
    let base = site.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("User-agent: *\nSitemap: {}/pages.xml.gz\n", base)),
        )
        .mount(&site)
        .await;
    // The .gz payload is served without a content-encoding header
    Mock::given(method("GET"))
        .and(path("/pages.xml.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(sitemap_for(&base).as_bytes())))
        .mount(&site)
        .await;
    serve_home(&site).await;

    let body = post_map(&app, json!({"url": format!("{}/", base)})).await;
    let links = links_of(&body);
    assert!(links.contains(&format!("{}/p1", base)));
    assert!(links.contains(&format!("{}/p2", base)));
}

#[tokio::test]
async fn test_map_sitemap_index_recursion() {
    let app = spawn_app().await;
    let site = MockServer::start().await;
    let base = site.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<sitemapindex><sitemap><loc>{}/sub.xml</loc></sitemap></sitemapindex>",
            base
        )))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/sub.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap_for(&base)))
        .mount(&site)
        .await;
    serve_home(&site).await;

    let body = post_map(&app, json!({"url": format!("{}/", base)})).await;
    let links = links_of(&body);
    assert!(links.contains(&format!("{}/p1", base)));
    assert!(links.contains(&format!("{}/p2", base)));
}

#[tokio::test]
async fn test_map_plain_text_sitemap_fallback() {
    let app = spawn_app().await;
    let site = MockServer::start().await;
    let base = site.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "# list\n{}/t1\n\nnot-a-url\n{}/t2\n",
            base, base
        )))
        .mount(&site)
        .await;
    serve_home(&site).await;

    let body = post_map(&app, json!({"url": format!("{}/", base)})).await;
    let links = links_of(&body);
    assert!(links.contains(&format!("{}/t1", base)));
    assert!(links.contains(&format!("{}/t2", base)));
    assert!(!links.iter().any(|l| l.contains("not-a-url")));
}

#[tokio::test]
async fn test_map_sitemap_only_skips_harvest() {
    let app = spawn_app().await;
    let site = MockServer::start().await;
    let base = site.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap_for(&base)))
        .mount(&site)
        .await;
    serve_home(&site).await;

    let body = post_map(&app, json!({"url": format!("{}/", base), "sitemapOnly": true})).await;
    let links = links_of(&body);
    assert!(links.contains(&format!("{}/p1", base)));
    assert!(!links.contains(&format!("{}/p3", base)));
}

#[tokio::test]
async fn test_map_ignore_sitemap_harvests_only() {
    let app = spawn_app().await;
    let site = MockServer::start().await;
    let base = site.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap_for(&base)))
        .mount(&site)
        .await;
    serve_home(&site).await;

    let body = post_map(&app, json!({"url": format!("{}/", base), "ignoreSitemap": true})).await;
    let links = links_of(&body);
    assert!(!links.contains(&format!("{}/p1", base)));
    assert!(links.contains(&format!("{}/p3", base)));
}

#[tokio::test]
async fn test_map_limit_one_returns_seed_only() {
    let app = spawn_app().await;
    let site = MockServer::start().await;
    let base = site.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            (0..200)
                .map(|i| format!(r#"<a href="/page-{}">p</a>"#, i))
                .collect::<String>(),
        ))
        .mount(&site)
        .await;

    let body = post_map(&app, json!({"url": format!("{}/", base), "limit": 1})).await;
    assert_eq!(links_of(&body), vec![format!("{}/", base)]);
}

#[tokio::test]
async fn test_map_no_duplicates() {
    let app = spawn_app().await;
    let site = MockServer::start().await;
    let base = site.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<urlset><url><loc>{base}/p1</loc></url><url><loc>{base}/p1</loc></url></urlset>",
            base = base
        )))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="/p1">again</a><a href="/p1#frag-less">same</a>"#),
        )
        .mount(&site)
        .await;

    let body = post_map(&app, json!({"url": format!("{}/", base)})).await;
    let links = links_of(&body);
    let p1 = format!("{}/p1", base);
    assert_eq!(links.iter().filter(|l| **l == p1).count(), 1);
}

#[tokio::test]
async fn test_map_search_filter_case_insensitive() {
    let app = spawn_app().await;
    let site = MockServer::start().await;
    let base = site.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<urlset><url><loc>{base}/Guide-One</loc></url><url><loc>{base}/blog</loc></url></urlset>",
            base = base
        )))
        .mount(&site)
        .await;
    serve_home(&site).await;

    let body = post_map(
        &app,
        json!({"url": format!("{}/", base), "search": "guide", "sitemapOnly": true}),
    )
    .await;
    let links = links_of(&body);
    assert!(links.contains(&format!("{}/Guide-One", base)));
    assert!(!links.contains(&format!("{}/blog", base)));
}

#[tokio::test]
async fn test_map_exclude_paths() {
    let app = spawn_app().await;
    let site = MockServer::start().await;
    let base = site.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<urlset><url><loc>{base}/docs/a</loc></url><url><loc>{base}/private/b</loc></url></urlset>",
            base = base
        )))
        .mount(&site)
        .await;
    serve_home(&site).await;

    let body = post_map(
        &app,
        json!({"url": format!("{}/", base), "excludePaths": ["/private"]}),
    )
    .await;
    let links = links_of(&body);
    assert!(links.contains(&format!("{}/docs/a", base)));
    assert!(!links.iter().any(|l| l.contains("/private")));
}

#[tokio::test]
async fn test_map_external_hosts_skipped_in_harvest() {
    let app = spawn_app().await;
    let site = MockServer::start().await;
    let base = site.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a href="http://elsewhere.test/x">ext</a><a href="/local">in</a>"#,
        ))
        .mount(&site)
        .await;

    let body = post_map(&app, json!({"url": format!("{}/", base)})).await;
    let links = links_of(&body);
    assert!(links.contains(&format!("{}/local", base)));
    assert!(!links.iter().any(|l| l.contains("elsewhere.test")));
}

#[tokio::test]
async fn test_map_missing_url_is_400() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/v1/map"))
        .json(&json!({"limit": 5}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}
