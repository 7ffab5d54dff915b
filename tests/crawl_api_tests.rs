//! End-to-end tests for crawl jobs

mod common;

use common::{spawn_app, wait_for_status};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves a homepage with `count` links and a page behind each of them
async fn serve_site(server: &MockServer, count: usize) {
    let anchors: String = (1..=count)
        .map(|i| format!(r#"<a href="/page-{}">page {}</a>"#, i, i))
        .collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<html><head><title>Home</title></head><body>{}</body></html>",
            anchors
        )))
        .mount(server)
        .await;

    for i in 1..=count {
        Mock::given(method("GET"))
            .and(path(format!("/page-{}", i)))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<html><head><title>Page {}</title></head><body>body {}</body></html>",
                i, i
            )))
            .mount(server)
            .await;
    }
}

async fn start_crawl(app: &common::TestApp, body: serde_json::Value) -> String {
    let response = app
        .client
        .post(app.url("/v1/crawl"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_crawl_scrapes_discovered_pages() {
    let app = spawn_app().await;
    let site = MockServer::start().await;
    serve_site(&site, 3).await;

    let id = start_crawl(
        &app,
        json!({"url": format!("{}/", site.uri()), "scrapeOptions": {"formats": ["markdown"]}}),
    )
    .await;

    let status = wait_for_status(&app, &format!("/v1/crawl/{}", id), "completed").await;
    // Seed plus the three linked pages
    assert_eq!(status["total"], 4);
    assert_eq!(status["completed"], 4);

    let data = status["data"].as_array().unwrap();
    assert_eq!(data.len(), 4);
    assert_eq!(data[0]["metadata"]["title"], "Home");
    assert!(data[0]["markdown"].is_string());
}

#[tokio::test]
async fn test_crawl_respects_limit() {
    let app = spawn_app().await;
    let site = MockServer::start().await;
    serve_site(&site, 10).await;

    let id = start_crawl(
        &app,
        json!({
            "url": format!("{}/", site.uri()),
            "limit": 3,
            "scrapeOptions": {"formats": ["markdown"]}
        }),
    )
    .await;

    let status = wait_for_status(&app, &format!("/v1/crawl/{}", id), "completed").await;
    assert_eq!(status["total"], 3);

    let results = status["data"].as_array().unwrap().len();
    let errors: serde_json::Value = app
        .client
        .get(app.url(&format!("/v1/crawl/{}/errors", id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let errored = errors["errors"].as_array().unwrap().len();
    let blocked = errors["robotsBlocked"].as_array().unwrap().len();
    assert_eq!(results + errored + blocked, 3);
}

#[tokio::test]
async fn test_crawl_exclude_paths_absent_from_results() {
    let app = spawn_app().await;
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a href="/keep/a">a</a><a href="/secret/b">b</a>"#,
        ))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/keep/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<title>Keep</title>"))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/secret/b"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<title>Secret</title>"))
        .mount(&site)
        .await;

    let id = start_crawl(
        &app,
        json!({
            "url": format!("{}/", site.uri()),
            "excludePaths": ["/secret"],
            "scrapeOptions": {"formats": ["markdown"]}
        }),
    )
    .await;

    let status = wait_for_status(&app, &format!("/v1/crawl/{}", id), "completed").await;
    for artifact in status["data"].as_array().unwrap() {
        let url = artifact["metadata"]["sourceURL"].as_str().unwrap();
        assert!(!url.contains("/secret"), "excluded URL was crawled: {}", url);
    }
}

#[tokio::test]
async fn test_crawl_cancel_stops_progress() {
    let app = spawn_app().await;
    let site = MockServer::start().await;

    // Slow pages keep the job busy long enough to cancel it
    let anchors: String = (1..=6)
        .map(|i| format!(r#"<a href="/slow-{}">s</a>"#, i))
        .collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("<html><body>{}</body></html>", anchors))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&site)
        .await;
    for i in 1..=6 {
        Mock::given(method("GET"))
            .and(path(format!("/slow-{}", i)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<title>slow</title>")
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&site)
            .await;
    }

    let id = start_crawl(
        &app,
        json!({"url": format!("{}/", site.uri()), "scrapeOptions": {"formats": ["markdown"]}}),
    )
    .await;

    let response = app
        .client
        .delete(app.url(&format!("/v1/crawl/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "cancelled");

    let status = wait_for_status(&app, &format!("/v1/crawl/{}", id), "cancelled").await;
    let completed_at_cancel = status["completed"].as_u64().unwrap();

    // Progress must not advance after cancellation
    tokio::time::sleep(Duration::from_millis(800)).await;
    let later: serde_json::Value = app
        .client
        .get(app.url(&format!("/v1/crawl/{}", id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(later["status"], "cancelled");
    assert_eq!(later["completed"].as_u64().unwrap(), completed_at_cancel);
}

#[tokio::test]
async fn test_crawl_status_unknown_job_is_404() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/v1/crawl/00000000-0000-0000-0000-000000000000"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn test_crawl_errors_empty_for_clean_job() {
    let app = spawn_app().await;
    let site = MockServer::start().await;
    serve_site(&site, 1).await;

    let id = start_crawl(
        &app,
        json!({"url": format!("{}/", site.uri()), "scrapeOptions": {"formats": ["markdown"]}}),
    )
    .await;
    wait_for_status(&app, &format!("/v1/crawl/{}", id), "completed").await;

    let errors: serde_json::Value = app
        .client
        .get(app.url(&format!("/v1/crawl/{}/errors", id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(errors["errors"].as_array().unwrap().is_empty());
    assert!(errors["robotsBlocked"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_crawl_invalid_seed_is_400() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/v1/crawl"))
        .json(&json!({"url": "not-a-url"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn test_crawl_sitemap_feeds_discovery() {
    let app = spawn_app().await;
    let site = MockServer::start().await;
    let base = site.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<urlset><url><loc>{}/from-sitemap</loc></url></urlset>",
            base
        )))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>home</body></html>"))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/from-sitemap"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<title>From Sitemap</title>"),
        )
        .mount(&site)
        .await;

    let id = start_crawl(
        &app,
        json!({"url": format!("{}/", base), "scrapeOptions": {"formats": ["markdown"]}}),
    )
    .await;

    let status = wait_for_status(&app, &format!("/v1/crawl/{}", id), "completed").await;
    let urls: Vec<&str> = status["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["metadata"]["sourceURL"].as_str().unwrap())
        .collect();
    assert!(urls.contains(&format!("{}/from-sitemap", base).as_str()));
}
