//! Health and metrics endpoint integration tests.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use meet_service::observability::init_metrics_recorder;
use meet_test_utils::TestMeetServer;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::OnceLock;

/// Global metrics handle for test servers
static TEST_METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_test_metrics_handle() -> PrometheusHandle {
    TEST_METRICS_HANDLE
        .get_or_init(|| {
            init_metrics_recorder().unwrap_or_else(|_| {
                metrics_exporter_prometheus::PrometheusBuilder::new()
                    .build_recorder()
                    .handle()
            })
        })
        .clone()
}

#[tokio::test]
async fn test_liveness_and_readiness() -> Result<()> {
    let server = TestMeetServer::spawn().await?;

    let response = reqwest::get(format!("{}/health", server.url())).await?;
    assert_eq!(response.status(), 200);

    let response = reqwest::get(format!("{}/ready", server.url())).await?;
    assert_eq!(response.status(), 200);

    server.health().set_not_ready();

    let response = reqwest::get(format!("{}/ready", server.url())).await?;
    assert_eq!(response.status(), 503);

    let response = reqwest::get(format!("{}/health", server.url())).await?;
    assert_eq!(response.status(), 200);

    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_reports_room_activity() -> Result<()> {
    let server = TestMeetServer::spawn_with_metrics(get_test_metrics_handle()).await?;
    let id = server.create_meeting().await?;

    reqwest::Client::new()
        .post(format!("{}/api/rooms/{}/join", server.url(), id))
        .json(&serde_json::json!({"clientId": "a"}))
        .send()
        .await?;

    let response = reqwest::get(format!("{}/metrics", server.url())).await?;
    assert_eq!(response.status(), 200);

    let body = response.text().await?;
    assert!(body.contains("meet_meetings_created_total"), "{body}");
    assert!(body.contains("meet_room_join_total"), "{body}");
    assert!(body.contains("outcome=\"admitted\""), "{body}");
    assert!(body.contains("meet_http_requests_total"), "{body}");
    assert!(body.contains("endpoint=\"/api/rooms/{id}/join\""), "{body}");

    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_absent_by_default() -> Result<()> {
    let server = TestMeetServer::spawn().await?;

    let response = reqwest::get(format!("{}/metrics", server.url())).await?;
    assert_eq!(response.status(), 404);

    Ok(())
}
