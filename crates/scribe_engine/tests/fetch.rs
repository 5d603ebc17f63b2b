use std::time::Duration;

use chrono::{TimeZone, Utc};
use scribe_engine::{
    FailureKind, FetchSettings, Fetcher, PageExtractor, ReqwestFetcher, ScrapeError, Scraper,
    SourceLocator,
};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetcher_returns_html_with_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc"))
        .and(header_exists("user-agent"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>ok</html>", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/doc", server.uri());

    let output = fetcher.fetch(&url).await.expect("fetch ok");
    assert_eq!(output.metadata.original_url, url);
    assert_eq!(output.metadata.final_url, output.metadata.original_url);
    assert_eq!(output.metadata.redirect_count, 0);
    assert_eq!(output.metadata.byte_len, 15);
    assert!(output
        .metadata
        .content_type
        .unwrap()
        .starts_with("text/html"));
    assert_eq!(output.bytes, b"<html>ok</html>");
}

#[tokio::test]
async fn fetcher_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/missing", server.uri());

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings);
    let url = format!("{}/slow", server.uri());

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn fetcher_rejects_non_html_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF", "application/pdf"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::default();
    let err = fetcher
        .fetch(&format!("{}/doc.pdf", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::UnsupportedContentType {
            content_type: "application/pdf".to_string()
        }
    );
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html")
                .set_body_string("01234567890"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings);
    let url = format!("{}/large", server.uri());

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn fetcher_rejects_non_http_scheme() {
    let err = ReqwestFetcher::default()
        .fetch("file:///etc/hosts")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

const GUIDE: &str = r##"<html><head><title>Guide</title></head><body>
<nav><ul><li><a href="/intro">Intro</a></li></ul></nav>
<main>
  <h2 id="intro">Intro<a class="headerlink" href="#intro">¶</a></h2>
  <p>See <a href="setup.html">setup</a>.</p>
  <h2 id="next">Next</h2>
  <p>Later.</p>
</main>
</body></html>"##;

#[tokio::test]
async fn scraper_fetches_without_fragment_and_scopes_anchor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/guide.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(GUIDE, "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let input = format!("{}/docs/guide.html#intro", server.uri());
    let locator = SourceLocator::parse(&input).unwrap();
    let scraper = Scraper::new(ReqwestFetcher::default(), PageExtractor::default());
    let at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();

    let record = scraper.scrape(&locator, at).await.expect("scrape ok");
    assert_eq!(record.title, "Guide (Section: Intro)");
    assert_eq!(record.source_locator, input);
    assert_eq!(record.scraped_at, "2024-05-06T07:08:09Z");
    assert_eq!(
        record.body,
        format!("## Intro\n\nSee [setup]({}/docs/setup.html).\n", server.uri())
    );
    assert_eq!(record.navigation_links.len(), 1);
    assert_eq!(
        record.navigation_links[0].href,
        format!("{}/intro", server.uri())
    );
}

#[tokio::test]
async fn scraper_surfaces_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let locator = SourceLocator::parse(&format!("{}/down", server.uri())).unwrap();
    let scraper = Scraper::new(ReqwestFetcher::default(), PageExtractor::default());
    let err = scraper.scrape(&locator, Utc::now()).await.unwrap_err();
    match err {
        ScrapeError::Fetch(fetch) => assert_eq!(fetch.kind, FailureKind::HttpStatus(503)),
        other => panic!("unexpected error: {other}"),
    }
}
