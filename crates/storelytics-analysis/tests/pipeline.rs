//! End-to-end tests for `ReviewPipeline` against a mocked catalog.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storelytics_analysis::{
    AnalyzeRequest, CollectRequest, InsightMapper, PipelineSettings, ReviewPipeline,
    SentimentScorer,
};
use storelytics_appstore::AppStoreClient;

const APP: &str = "1566419183";

fn pipeline(base: &str, data_dir: &Path) -> ReviewPipeline {
    pipeline_with(base, data_dir, true)
}

fn pipeline_with(base: &str, data_dir: &Path, detach_snapshots: bool) -> ReviewPipeline {
    let client = AppStoreClient::new(base, 5, "storelytics-test/0.1", 0, 0)
        .expect("failed to build test AppStoreClient");
    ReviewPipeline::new(
        client,
        SentimentScorer::new(),
        InsightMapper::new(),
        PipelineSettings {
            inter_page_delay_ms: 0,
            data_dir: data_dir.to_path_buf(),
            detach_snapshots,
        },
    )
}

fn entry(id: &str, rating: u8, title: &str, content: &str) -> serde_json::Value {
    json!({
        "author": {"name": {"label": "reviewer"}},
        "updated": {"label": "2024-05-01T10:00:00-07:00"},
        "im:rating": {"label": rating.to_string()},
        "im:version": {"label": "2.1"},
        "id": {"label": id},
        "title": {"label": title},
        "content": {"label": content}
    })
}

async fn mount_lookup(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "resultCount": 1,
            "results": [{"trackId": 1_566_419_183_u64, "trackName": "Daylio", "price": 0.0}]
        })))
        .mount(server)
        .await;
}

async fn mount_single_page(server: &MockServer, entries: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/us/rss/customerreviews/id={APP}/sortBy=mostRecent/page=1/json"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "feed": {"entry": entries, "link": []}
        })))
        .mount(server)
        .await;
}

fn complaint_entries() -> Vec<serde_json::Value> {
    vec![
        entry("r1", 1, "Crashes constantly", "The app crashes every time I open it. Terrible."),
        entry("r2", 2, "Crash after update", "Since the update it crashes on launch, awful."),
        entry("r3", 5, "Love it", "Great app for tracking my mood every day!"),
    ]
}

async fn wait_for_snapshot(dir: &Path) -> Option<PathBuf> {
    for _ in 0..50 {
        if let Ok(entries) = std::fs::read_dir(dir) {
            let found = entries
                .filter_map(Result::ok)
                .map(|e| e.path())
                .find(|p| p.extension().is_some_and(|ext| ext == "jsonl"));
            if found.is_some() {
                return found;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    None
}

// ---------------------------------------------------------------------------
// collect-and-preprocess
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collect_reports_summary_and_samples() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_lookup(&server).await;
    mount_single_page(&server, complaint_entries()).await;

    let mut req = CollectRequest::for_app(format!("id{APP}"));
    req.min_tokens = 0;
    let report = pipeline(&server.uri(), dir.path())
        .collect_and_preprocess(&req)
        .await
        .unwrap();

    assert_eq!(report.status, "ok");
    assert_eq!(report.meta.app_id, APP);
    assert_eq!(report.meta.country, "us");
    assert_eq!(report.meta.collected_reviews, 3);
    assert_eq!(report.meta.pages_fetched, 1);
    assert_eq!(report.app_info.name.as_deref(), Some("Daylio"));
    assert_eq!(report.summary.mean_star, Some(2.67));
    assert_eq!(report.summary.by_star.get("5"), Some(&1));
    assert!((report.summary.lang_distribution.en - 1.0).abs() < 1e-9);
    assert_eq!(report.data.raw_reviews.len(), 3);
    assert_eq!(report.data.clean_reviews.len(), 3);

    let body = serde_json::to_value(&report).unwrap();
    assert!(body["analysis_stub"]["sentiment"].is_null());
    assert_eq!(body["data"]["raw_reviews"][0]["reviewId"], "r1");
}

#[tokio::test]
async fn collect_unknown_app_is_not_found() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(&json!({"resultCount": 0, "results": []})),
        )
        .mount(&server)
        .await;

    let err = pipeline(&server.uri(), dir.path())
        .collect_and_preprocess(&CollectRequest::for_app(APP))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "not_found");
    assert_eq!(
        err.to_string(),
        format!("App with ID '{APP}' not found in US App Store")
    );
}

#[tokio::test]
async fn collect_without_reviews_is_not_found() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_lookup(&server).await;
    mount_single_page(&server, vec![]).await;

    let err = pipeline(&server.uri(), dir.path())
        .collect_and_preprocess(&CollectRequest::for_app(APP))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "not_found");
    assert!(err.to_string().starts_with("No reviews found"));
}

#[tokio::test]
async fn collect_rejects_bad_input_before_any_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let mut req = CollectRequest::for_app(APP);
    req.country = "usa".to_string();
    let err = pipeline(&server.uri(), dir.path())
        .collect_and_preprocess(&req)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "validation_error");
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn collect_with_save_raw_appends_snapshot() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_lookup(&server).await;
    mount_single_page(&server, complaint_entries()).await;

    let mut req = CollectRequest::for_app(APP);
    req.save_raw = true;
    pipeline(&server.uri(), dir.path())
        .collect_and_preprocess(&req)
        .await
        .unwrap();

    let snapshot = wait_for_snapshot(dir.path())
        .await
        .expect("snapshot file was not written");
    let name = snapshot.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with(&format!("{APP}_us_")));
}

#[tokio::test]
async fn attached_snapshot_is_written_before_return() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_lookup(&server).await;
    mount_single_page(&server, complaint_entries()).await;

    let mut req = CollectRequest::for_app(APP);
    req.save_raw = true;
    pipeline_with(&server.uri(), dir.path(), false)
        .collect_and_preprocess(&req)
        .await
        .unwrap();

    let files: Vec<PathBuf> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.path())
        .collect();
    assert_eq!(files.len(), 1);
    let content = std::fs::read_to_string(&files[0]).unwrap();
    assert_eq!(content.lines().count(), 3);
    assert!(content.lines().next().unwrap().contains("\"reviewId\":\"r1\""));
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analyze_collected_reviews() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_single_page(&server, complaint_entries()).await;

    let report = pipeline(&server.uri(), dir.path())
        .analyze(&AnalyzeRequest::for_app(APP))
        .await
        .unwrap();

    assert_eq!(report.meta.analyzed, 3);
    assert_eq!(report.meta.app_id, APP);
    assert!(report.sentiment_overview.neg > report.sentiment_overview.pos);
    assert!((report.sentiment_overview.mean_star - 2.67).abs() < 1e-9);
    assert!(report.debug.low_sample);
    assert!(!report.debug.no_negative_signal);
    assert_eq!(report.debug.model, "vader");
    assert!(!report.top_negative_phrases.is_empty());
    assert!(report
        .top_negative_phrases
        .iter()
        .any(|p| p.phrase.contains("crash")));
    assert!(report.insights.iter().any(|i| i.area == "Quality"));
    assert!(report.insights.len() <= 5);
    for (i, insight) in report.insights.iter().enumerate() {
        assert_eq!(insight.priority, i + 1);
    }
}

#[tokio::test]
async fn analyze_override_makes_no_requests() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let req: AnalyzeRequest = serde_json::from_value(json!({
        "app_id": "my-batch",
        "reviews_override": [
            {"reviewId": "a", "rating": 5, "title": "Wonderful", "content": "Best journal app, love it"},
            {"reviewId": "b", "rating": 4, "content": "Nice and simple"}
        ]
    }))
    .unwrap();
    let report = pipeline(&server.uri(), dir.path())
        .analyze(&req)
        .await
        .unwrap();

    assert_eq!(report.meta.app_id, "my-batch");
    assert_eq!(report.meta.analyzed, 2);
    assert!(report.debug.no_negative_signal);
    assert!(report.top_negative_phrases.is_empty());
    assert!(report.insights.is_empty());
    assert!((report.sentiment_overview.pos - 1.0).abs() < 1e-9);

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn analyze_upstream_failure() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = pipeline(&server.uri(), dir.path())
        .analyze(&AnalyzeRequest::for_app(APP))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "upstream_error");
}
