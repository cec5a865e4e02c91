//! Integration tests for `GoogleNews` using wiremock HTTP mocks.

use chrono::NaiveDate;
use tickersent_sentiment::{GoogleNews, NewsConfig};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config() -> NewsConfig {
    NewsConfig {
        lang: "en".to_string(),
        country: "US".to_string(),
        timeout_secs: 5,
        user_agent: "tickersent-test".to_string(),
        max_articles: 10,
        max_concurrent_articles: 2,
    }
}

fn feed(base: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel>
  <item>
    <title>Microsoft beats estimates - Wire</title>
    <link>{base}/articles/one</link>
    <pubDate>Tue, 30 Jan 2024 21:10:00 GMT</pubDate>
  </item>
  <item>
    <title>Microsoft outage frustrates users - Wire</title>
    <link>{base}/articles/missing</link>
    <pubDate>Mon, 29 Jan 2024 08:00:00 GMT</pubDate>
  </item>
</channel></rss>"#
    )
}

#[tokio::test]
async fn collect_documents_fetches_and_filters_articles() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "MSFT after:2024-01-01 before:2024-02-01"))
        .and(query_param("ceid", "US:en"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed(&base)))
        .mount(&server)
        .await;

    let landing = format!(
        r#"<html><head><link rel="canonical" href="{base}/publisher/one"></head><body></body></html>"#
    );
    Mock::given(method("GET"))
        .and(path("/articles/one"))
        .respond_with(ResponseTemplate::new(200).set_body_string(landing))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/publisher/one"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><head></head><body>\
             <p>Microsoft reported record cloud revenue.</p>\
             <p>Markets were mixed elsewhere.</p>\
             <p>MSFT shares rose 4% after hours.</p>\
             </body></html>",
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/articles/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let news = GoogleNews::with_base_url(config(), &base).expect("client should build");
    let terms = vec!["MSFT".to_string(), "Microsoft".to_string()];
    let documents = news
        .collect_documents(
            "MSFT",
            &terms,
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 2, 1),
        )
        .await
        .expect("search should succeed");

    assert_eq!(documents.len(), 2);

    let missing = &documents[0];
    assert_eq!(missing.date, NaiveDate::from_ymd_opt(2024, 1, 29).unwrap());
    assert!(missing.paragraphs.is_empty());
    assert_eq!(missing.canonical_url, None);

    let found = &documents[1];
    assert_eq!(found.title, "Microsoft beats estimates - Wire");
    assert_eq!(
        found.canonical_url.as_deref(),
        Some(format!("{base}/publisher/one").as_str())
    );
    assert_eq!(
        found.paragraphs,
        vec![
            "Microsoft reported record cloud revenue.".to_string(),
            "MSFT shares rose 4% after hours.".to_string(),
        ]
    );
}

#[tokio::test]
async fn search_truncates_to_max_articles() {
    let server = MockServer::start().await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed(&base)))
        .mount(&server)
        .await;

    let mut cfg = config();
    cfg.max_articles = 1;
    let news = GoogleNews::with_base_url(cfg, &base).unwrap();
    let items = news.search("MSFT", None, None).await.unwrap();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn failed_search_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let news = GoogleNews::with_base_url(config(), &server.uri()).unwrap();
    assert!(news.collect_documents("MSFT", &[], None, None).await.is_err());
}
