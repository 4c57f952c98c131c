use super::*;
use crate::downloader::test_helpers::{
    FetchScript, ScriptedFetcher, create_test_downloader, create_test_downloader_with_fetcher,
    wait_for_drain,
};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::time::Duration;
use tower::ServiceExt;

/// Build a router (and keep the downloader handle for draining)
async fn test_app(
    urls: &[&str],
    scripts: Vec<FetchScript>,
) -> (Router, Arc<PlaylistDownloader>, tempfile::TempDir) {
    let (downloader, _fetcher, temp_dir) = create_test_downloader(urls, scripts).await;
    let downloader = Arc::new(downloader);
    let app = create_router(downloader.clone(), downloader.get_config());
    (app, downloader, temp_dir)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok_and_version() {
    let (app, _downloader, _temp) = test_app(&[], vec![]).await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn start_batch_returns_202_with_job_count() {
    let urls = ["https://example.com/v0", "https://example.com/v1"];
    let (app, downloader, _temp) = test_app(
        &urls,
        vec![
            FetchScript::complete("/dl/a.mp4"),
            FetchScript::complete("/dl/b.mp4"),
        ],
    )
    .await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/batch",
            serde_json::json!({
                "playlist_url": "https://example.com/playlist",
                "format": "best"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["total_jobs"], 2);

    wait_for_drain(&downloader).await;

    // The polling endpoint reflects the drained batch
    let response = app.clone().oneshot(get("/batch/progress")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_json(response).await;
    assert_eq!(summary["average_progress"], 100.0);
    assert_eq!(summary["active_count"], 0);
    assert_eq!(summary["completed"], 2);

    // And the job list shows two completed jobs in order
    let response = app.oneshot(get("/batch/jobs")).await.unwrap();
    let jobs = body_json(response).await;
    let jobs = jobs.as_array().unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0]["id"], 0);
    assert_eq!(jobs[0]["status"], "completed");
    assert_eq!(jobs[1]["source_url"], "https://example.com/v1");
}

#[tokio::test]
async fn start_batch_rejects_missing_fields() {
    let (app, _downloader, _temp) = test_app(&[], vec![]).await;

    let response = app
        .oneshot(post_json(
            "/batch",
            serde_json::json!({"playlist_url": "", "format": "best"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn start_batch_rejects_malformed_playlist_url() {
    let (app, _downloader, _temp) = test_app(&[], vec![]).await;

    let response = app
        .oneshot(post_json(
            "/batch",
            serde_json::json!({"playlist_url": "not a url", "format": "best"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn start_batch_with_empty_playlist_is_422() {
    let (app, _downloader, _temp) = test_app(&[], vec![]).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/batch",
            serde_json::json!({
                "playlist_url": "https://example.com/playlist",
                "format": "best"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "empty_batch");

    // No job records were created
    let response = app.oneshot(get("/batch/jobs")).await.unwrap();
    let jobs = body_json(response).await;
    assert_eq!(jobs.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn second_start_while_running_is_409() {
    let urls = ["https://example.com/v0"];
    let fetcher = ScriptedFetcher::with_delay(
        vec![FetchScript::complete("/dl/a.mp4")],
        Duration::from_millis(300),
    );
    let (downloader, _fetcher, _temp) =
        create_test_downloader_with_fetcher(&urls, fetcher).await;
    let downloader = Arc::new(downloader);
    let app = create_router(downloader.clone(), downloader.get_config());

    let start = post_json(
        "/batch",
        serde_json::json!({
            "playlist_url": "https://example.com/playlist",
            "format": "best"
        }),
    );
    let response = app.clone().oneshot(start).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let again = post_json(
        "/batch",
        serde_json::json!({
            "playlist_url": "https://example.com/playlist",
            "format": "best"
        }),
    );
    let response = app.oneshot(again).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "batch_already_running");

    wait_for_drain(&downloader).await;
}

#[tokio::test]
async fn get_job_detail_and_404() {
    let urls = ["https://example.com/v0"];
    let (app, downloader, _temp) =
        test_app(&urls, vec![FetchScript::complete("/dl/a.mp4")]).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/batch",
            serde_json::json!({
                "playlist_url": "https://example.com/playlist",
                "format": "best"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    wait_for_drain(&downloader).await;

    let response = app.clone().oneshot(get("/batch/jobs/0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let job = body_json(response).await;
    assert_eq!(job["source_url"], "https://example.com/v0");
    assert_eq!(job["status"], "completed");

    let response = app.oneshot(get("/batch/jobs/99")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "job_not_found");
    assert_eq!(body["error"]["details"]["job_id"], 99);
}

#[tokio::test]
async fn get_job_before_any_batch_is_404_no_batch() {
    let (app, _downloader, _temp) = test_app(&[], vec![]).await;

    let response = app.oneshot(get("/batch/jobs/0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "no_batch");
}

#[tokio::test]
async fn progress_before_any_batch_is_all_zero() {
    let (app, _downloader, _temp) = test_app(&[], vec![]).await;

    let response = app.oneshot(get("/batch/progress")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_json(response).await;
    assert_eq!(summary["average_progress"], 0.0);
    assert_eq!(summary["current_title"], "");
    assert_eq!(summary["active_count"], 0);
    assert_eq!(summary["total_jobs"], 0);
}

#[tokio::test]
async fn cancel_without_batch_is_404() {
    let (app, _downloader, _temp) = test_app(&[], vec![]).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/batch/cancel")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancel_running_batch_is_204() {
    let urls = ["https://example.com/v0"];
    let fetcher = ScriptedFetcher::with_delay(
        vec![FetchScript::complete("/dl/a.mp4")],
        Duration::from_secs(30),
    );
    let (downloader, _fetcher, _temp) =
        create_test_downloader_with_fetcher(&urls, fetcher).await;
    let downloader = Arc::new(downloader);
    let app = create_router(downloader.clone(), downloader.get_config());

    let response = app
        .clone()
        .oneshot(post_json(
            "/batch",
            serde_json::json!({
                "playlist_url": "https://example.com/playlist",
                "format": "best"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/batch/cancel")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    wait_for_drain(&downloader).await;
    let jobs = downloader.list_jobs().await;
    assert!(jobs.iter().all(|j| j.status == crate::types::Status::Error));
}

#[tokio::test]
async fn formats_endpoint_lists_first_item_formats() {
    let urls = ["https://example.com/v0", "https://example.com/v1"];
    let (app, _downloader, _temp) = test_app(&urls, vec![]).await;

    let response = app
        .oneshot(get("/formats?playlist_url=https%3A%2F%2Fexample.com%2Fplaylist"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let formats = body_json(response).await;
    let formats = formats.as_array().unwrap();
    assert_eq!(formats.len(), 2);
    assert_eq!(formats[0]["format_id"], "137");
    assert!(formats[0]["description"].as_str().unwrap().contains("1080"));
}

#[tokio::test]
async fn formats_endpoint_requires_playlist_url() {
    let (app, _downloader, _temp) = test_app(&[], vec![]).await;

    let response = app.oneshot(get("/formats")).await.unwrap();
    assert_eq!(
        response.status(),
        StatusCode::BAD_REQUEST,
        "missing query parameter must be a client error"
    );
}

#[tokio::test]
async fn files_route_serves_completed_downloads() {
    let (app, downloader, _temp) = test_app(&[], vec![]).await;

    let download_dir = &downloader.get_config().download.download_dir;
    std::fs::write(download_dir.join("clip.mp4"), b"media bytes").unwrap();

    let response = app.oneshot(get("/files/clip.mp4")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"media bytes");
}

#[tokio::test]
async fn cors_headers_are_present_when_enabled() {
    let (app, _downloader, _temp) = test_app(&[], vec![]).await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn openapi_json_is_served() {
    let (app, _downloader, _temp) = test_app(&[], vec![]).await;

    let response = app.oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let spec = body_json(response).await;
    assert_eq!(spec["info"]["title"], "playlist-dl REST API");
}
