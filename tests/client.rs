mod common;

use std::time::Duration;
use common::{write_swing, TestApp};
use fairway::client::FairwayClient;
use fairway::errors::{FairwayError, RetryConfig};
use fairway::pipeline::{CaptureStage, SubmitRequest};

async fn serve(app: &TestApp) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_client_submit_wait_and_read() {
    let app = TestApp::new();
    let base = serve(&app).await;
    let client = FairwayClient::new(&base, None).unwrap().with_retry_config(RetryConfig::no_retry());

    let health = client.health().await.unwrap();
    assert_eq!(health["service"], "fairway");

    let req = SubmitRequest {
        user_id: "golfer-2".to_string(),
        video_uri: write_swing(app.src.path(), "drive.mp4", Some(0.0)),
        duration_hint: None,
        club: "Driver".to_string(),
        generate_overlays: false,
    };
    let id = client.submit(&req).await.unwrap();

    let mut updates = Vec::new();
    let status = client.wait(id, Duration::from_millis(10), |s| updates.push(s.percent)).await.unwrap();
    assert_eq!(status.stage, CaptureStage::Done);
    assert!(updates.windows(2).all(|w| w[1] >= w[0]));

    let record = client.analysis(id).await.unwrap();
    assert_eq!(record.analysis.capture_id, id);
    assert_eq!(record.capture.club_type, "Driver");
    assert!(record.analysis.overlay_url.is_none());

    let view = client.analysis_view(id).await.unwrap();
    assert_eq!(view.capture_id, id);

    let page = client.history("golfer-2", 10, 0).await.unwrap();
    assert_eq!(page.analyses.len(), 1);

    let drills = client.drills_for_error("sway").await.unwrap();
    assert!(!drills.is_empty());
    let taxonomy = client.taxonomy().await.unwrap();
    assert!(!taxonomy.version.is_empty());
}

#[tokio::test]
async fn test_client_maps_error_kinds() {
    let app = TestApp::new();
    let base = serve(&app).await;
    let client = FairwayClient::new(&base, None).unwrap().with_retry_config(RetryConfig::no_retry());

    assert!(matches!(client.status(404).await, Err(FairwayError::NotFound(_))));
    assert!(matches!(client.cues_for_error("shank").await, Err(FairwayError::NotFound(_))));

    let bad = SubmitRequest {
        user_id: String::new(),
        video_uri: "swing.mp4".to_string(),
        duration_hint: None,
        club: "7 Iron".to_string(),
        generate_overlays: false,
    };
    assert!(matches!(client.submit(&bad).await, Err(FairwayError::Validation(_))));
}
