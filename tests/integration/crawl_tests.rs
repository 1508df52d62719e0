//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run both crawl
//! phases end-to-end: listing pages, link consolidation, detail pages and the
//! record sink.

use listing_harvester::config::Config;
use listing_harvester::crawler::Coordinator;
use listing_harvester::output::{
    CrawlStats, CsvSink, FailureClass, Field, MemorySink, RecordSink, COLUMNS,
};
use listing_harvester::state::{CancelFlag, CrawlPhase};
use listing_harvester::AppPageExtractor;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration rooted at the mock server's first listing page
fn create_test_config(base_url: &str, depth: u32) -> Config {
    let mut config = Config::default();
    config.crawl.root = format!("{}/soft/applist/page/1", base_url);
    config.crawl.depth_limit = depth;
    config.fetch.timeout_secs = 5;
    config.fetch.connect_timeout_secs = 5;
    config.fetch.max_retries = 0;
    config.fetch.retry_base_delay_ms = 10;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.crawler_version = "1.0.0".to_string();
    config
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

/// A listing page with one marker per href
fn listing_page<I, S>(hrefs: I) -> ResponseTemplate
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let markers: String = hrefs
        .into_iter()
        .map(|href| {
            format!(
                r#"<li><div class="app-icon"><a href="{}"><img src="/icon.png"></a></div></li>"#,
                href.as_ref()
            )
        })
        .collect();
    html(format!(
        "<html><body><ul class=\"app-list\">{}</ul></body></html>",
        markers
    ))
}

/// A listing page with markers for /app/1 ..= /app/count
fn numbered_listing(count: usize) -> ResponseTemplate {
    listing_page((1..=count).map(|i| format!("/app/{}", i)))
}

fn detail_page(title: &str) -> ResponseTemplate {
    html(format!(
        r#"<html><body>
        <div class="content-categoryCtn-title"><h1>{title}</h1></div>
        <ul class="sideBar-appDetail">
          <li><span>Category</span><div>Tools</div></li>
          <li><span>Version</span><div>1.2.3</div></li>
          <li><span>Size</span><div>4.5MB</div></li>
          <li><span>Updated</span><div>2016-03-01</div></li>
          <li><span>Developer</span><div>Example Studio</div></li>
        </ul>
        <div class="content-detailCtn-icon">
          <a href="http://dl.example.com/{title}.apk">Download</a>
          <p><img src="http://img.example.com/{title}.png"></p>
        </div>
        <div class="content-detailCtn-text"><div>About {title}</div></div>
        <div class="slide-content"><div><img src="http://img.example.com/{title}-1.png"></div></div>
        </body></html>"#
    ))
}

async fn mount_detail_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/app/\d+$"))
        .respond_with(detail_page("App"))
        .mount(server)
        .await;
}

async fn run_with_memory_sink(config: Config) -> (CrawlStats, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let mut coordinator = Coordinator::new(
        config,
        Arc::new(AppPageExtractor::new().unwrap()),
        sink.clone(),
    )
    .expect("Failed to create coordinator");

    let stats = coordinator.run().await.expect("Crawl failed");
    (stats, sink)
}

#[tokio::test]
async fn test_full_crawl_forty_markers() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/soft/applist/page/1"))
        .and(header("user-agent", "TestBot/1.0.0"))
        .respond_with(numbered_listing(40))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/app/\d+$"))
        .respond_with(detail_page("App"))
        .expect(5)
        .mount(&mock_server)
        .await;

    let (stats, sink) = run_with_memory_sink(create_test_config(&base_url, 1)).await;

    assert_eq!(stats.phase, CrawlPhase::Done);
    assert_eq!(stats.listing_pages_fetched, 1);
    assert_eq!(stats.links_harvested, 40);
    assert_eq!(stats.candidates, 40);
    assert_eq!(stats.detail_pages_fetched, 5);
    assert_eq!(stats.records_written, 5);
    assert_eq!(stats.total_failures(), 0);

    let records = sink.records();
    assert_eq!(records.len(), 5);
    for record in &records {
        for (column, value) in record.iter() {
            assert!(!value.is_empty(), "column {} is empty", column);
        }
        assert_eq!(record.get(Field::Title), "App");
        assert_eq!(record.get(Field::Developer), "Example Studio");
    }

    // The first five candidates, in whatever order the fetches finished
    let mut links: Vec<_> = records
        .iter()
        .map(|r| r.get(Field::AppLink).to_string())
        .collect();
    links.sort();
    let mut expected: Vec<_> = (1..=5).map(|i| format!("{}/app/{}", base_url, i)).collect();
    expected.sort();
    assert_eq!(links, expected);
}

#[tokio::test]
async fn test_sequential_crawl_keeps_discovery_order() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/soft/applist/page/1"))
        .respond_with(listing_page(["/app/3", "/app/1"]))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/soft/applist/page/2"))
        .respond_with(listing_page(["/app/2"]))
        .mount(&mock_server)
        .await;
    mount_detail_pages(&mock_server).await;

    let mut config = create_test_config(&base_url, 2);
    config.fetch.concurrency = 1;
    let (_, sink) = run_with_memory_sink(config).await;

    let links: Vec<_> = sink
        .records()
        .iter()
        .map(|r| r.get(Field::AppLink).to_string())
        .collect();
    assert_eq!(
        links,
        vec![
            format!("{}/app/3", base_url),
            format!("{}/app/1", base_url),
            format!("{}/app/2", base_url),
        ]
    );
}

#[tokio::test]
async fn test_listing_404_continues() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/soft/applist/page/1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/soft/applist/page/2"))
        .respond_with(numbered_listing(3))
        .mount(&mock_server)
        .await;
    mount_detail_pages(&mock_server).await;

    let (stats, sink) = run_with_memory_sink(create_test_config(&base_url, 2)).await;

    assert_eq!(stats.failure_count(FailureClass::TransportFailure), 1);
    assert_eq!(stats.listing_pages_fetched, 1);
    assert_eq!(stats.records_written, 3);
    assert_eq!(sink.len(), 3);
}

#[tokio::test]
async fn test_non_html_listing_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/soft/applist/page/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"apps": []}"#, "application/json"),
        )
        .mount(&mock_server)
        .await;

    let (stats, sink) = run_with_memory_sink(create_test_config(&base_url, 1)).await;

    assert_eq!(stats.failure_count(FailureClass::WrongContentType), 1);
    assert_eq!(stats.links_harvested, 0);
    assert_eq!(stats.records_written, 0);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_detail_page_missing_element_writes_no_record() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/soft/applist/page/1"))
        .respond_with(numbered_listing(2))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/app/1"))
        .respond_with(detail_page("Complete"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/app/2"))
        .respond_with(html(
            "<html><body><h1>Not an app page</h1></body></html>".to_string(),
        ))
        .mount(&mock_server)
        .await;

    let (stats, sink) = run_with_memory_sink(create_test_config(&base_url, 1)).await;

    assert_eq!(stats.detail_pages_fetched, 2);
    assert_eq!(stats.records_written, 1);
    assert_eq!(stats.failure_count(FailureClass::ExtractionMismatch), 1);
    assert_eq!(sink.records()[0].get(Field::Title), "Complete");
}

#[tokio::test]
async fn test_duplicate_links_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    for page in 1..=2 {
        Mock::given(method("GET"))
            .and(path(format!("/soft/applist/page/{}", page)))
            .respond_with(listing_page([
                "/app/1".to_string(),
                "/app/1#comments".to_string(),
                format!("{}/app/2", base_url),
            ]))
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/app/1"))
        .respond_with(detail_page("One"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/app/2"))
        .respond_with(detail_page("Two"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (stats, _) = run_with_memory_sink(create_test_config(&base_url, 2)).await;

    assert_eq!(stats.links_harvested, 6);
    assert_eq!(stats.candidates, 2);
    assert_eq!(stats.records_written, 2);
}

#[tokio::test]
async fn test_depth_one_fetches_single_listing_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/soft/applist/page/1"))
        .respond_with(numbered_listing(0))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/soft/applist/page/2"))
        .respond_with(numbered_listing(0))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (stats, _) = run_with_memory_sink(create_test_config(&base_url, 1)).await;

    assert_eq!(stats.listing_pages_seeded, 1);
    assert_eq!(stats.listing_pages_fetched, 1);
    assert_eq!(stats.candidates, 0);
}

#[tokio::test]
async fn test_excluded_listing_page_not_fetched() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/soft/applist/page/1"))
        .respond_with(numbered_listing(0))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/soft/applist/page/2"))
        .respond_with(numbered_listing(0))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url, 2);
    config.crawl.exclude_prefixes = vec![format!("{}/soft/applist/page/2", base_url)];
    let (stats, _) = run_with_memory_sink(config).await;

    assert_eq!(stats.rejections.get("exclude"), Some(&1));
    assert_eq!(stats.listing_pages_fetched, 1);
}

#[tokio::test]
async fn test_other_host_detail_links_rejected() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/soft/applist/page/1"))
        .respond_with(listing_page(["http://other.example/app/9", "/app/1"]))
        .mount(&mock_server)
        .await;
    mount_detail_pages(&mock_server).await;

    let (stats, sink) = run_with_memory_sink(create_test_config(&base_url, 1)).await;

    assert_eq!(stats.candidates, 2);
    assert_eq!(stats.rejections.get("same_host"), Some(&1));
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn test_no_detail_cap_visits_every_candidate() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/soft/applist/page/1"))
        .respond_with(numbered_listing(7))
        .mount(&mock_server)
        .await;
    mount_detail_pages(&mock_server).await;

    let mut config = create_test_config(&base_url, 1);
    config.crawl.detail_cap = None;
    let (stats, sink) = run_with_memory_sink(config).await;

    assert_eq!(stats.records_written, 7);
    assert_eq!(sink.len(), 7);
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/soft/applist/page/1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/soft/applist/page/1"))
        .respond_with(numbered_listing(1))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_detail_pages(&mock_server).await;

    let mut config = create_test_config(&base_url, 1);
    config.fetch.max_retries = 2;
    let (stats, sink) = run_with_memory_sink(config).await;

    assert_eq!(stats.total_failures(), 0);
    assert_eq!(stats.listing_pages_fetched, 1);
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/soft/applist/page/1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url, 1);
    config.fetch.max_retries = 3;
    let (stats, _) = run_with_memory_sink(config).await;

    assert_eq!(stats.failure_count(FailureClass::TransportFailure), 1);
}

#[tokio::test]
async fn test_cancelled_crawl_fetches_nothing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(numbered_listing(5))
        .expect(0)
        .mount(&mock_server)
        .await;

    let cancel = CancelFlag::new();
    cancel.cancel();

    let mut coordinator = Coordinator::new(
        create_test_config(&base_url, 3),
        Arc::new(AppPageExtractor::new().unwrap()),
        Arc::new(MemorySink::new()),
    )
    .unwrap()
    .with_cancel_flag(cancel);

    let stats = coordinator.run().await.unwrap();
    assert!(stats.cancelled);
    assert_eq!(stats.phase, CrawlPhase::Done);
    assert_eq!(stats.records_written, 0);
}

#[tokio::test]
async fn test_csv_header_written_once_across_runs() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/soft/applist/page/1"))
        .respond_with(numbered_listing(2))
        .mount(&mock_server)
        .await;
    mount_detail_pages(&mock_server).await;

    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("app_results.csv");

    for _ in 0..2 {
        let sink: Arc<dyn RecordSink> = Arc::new(CsvSink::open(&csv_path).unwrap());
        let mut coordinator = Coordinator::new(
            create_test_config(&base_url, 1),
            Arc::new(AppPageExtractor::new().unwrap()),
            sink,
        )
        .unwrap();
        let stats = coordinator.run().await.unwrap();
        assert_eq!(stats.records_written, 2);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(&csv_path)
        .unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].iter().collect::<Vec<_>>(), COLUMNS.to_vec());
    for row in &rows[1..] {
        assert_eq!(row.len(), COLUMNS.len());
        assert_eq!(&row[0], "App");
        assert!(!row[11].is_empty());
    }
}
