#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use axum::body::Body;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use fairway::api::{build_router, AppState};
use fairway::config::FairwayConfig;
use fairway::db::Database;
use fairway::models::pose::*;
use fairway::models::{Handedness, PoseFrame, PoseSequence};
use fairway::taxonomy::{load_taxonomy, TaxonomyStore};

pub struct TestApp {
    pub state: AppState,
    pub data: tempfile::TempDir,
    pub src: tempfile::TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let data = tempfile::tempdir().unwrap();
        let mut config = FairwayConfig::default();
        config.storage.data_dir = data.path().to_string_lossy().into_owned();
        let db = Database::in_memory().unwrap();
        let taxonomy = TaxonomyStore::new(load_taxonomy(None).unwrap());
        let state = AppState::new(&config, db, taxonomy).unwrap();
        Self { state, data, src: tempfile::tempdir().unwrap() }
    }

    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    pub async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (u16, Value) {
        let response = self.router().oneshot(request(method, uri, body)).await.unwrap();
        let status = response.status().as_u16();
        (status, body_json(response).await)
    }

    /// Poll the status endpoint until `done` or `error`, returning every status seen.
    pub async fn wait_terminal(&self, capture_id: i64) -> Vec<Value> {
        let mut seen = Vec::new();
        for _ in 0..500 {
            let (code, status) = self.call("GET", &format!("/api/captures/{}/status", capture_id), None).await;
            assert_eq!(code, 200, "{}", status);
            let stage = status["stage"].as_str().unwrap().to_string();
            seen.push(status);
            if stage == "done" || stage == "error" {
                return seen;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("capture {} never finished", capture_id);
    }
}

pub fn request(method: &str, uri: &str, body: Option<Value>) -> axum::http::Request<Body> {
    let builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    match body {
        Some(b) => builder.body(Body::from(serde_json::to_string(&b).unwrap())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("JSON parse error: {}. Body: {:?}", e, String::from_utf8_lossy(&bytes)))
}

/// Minimal `ftyp` + `moov/mvhd` container with the given duration.
pub fn mp4_bytes(duration_secs: f64) -> Vec<u8> {
    let timescale: u32 = 600;
    let mut mvhd = vec![0u8; 12];
    mvhd.extend_from_slice(&timescale.to_be_bytes());
    mvhd.extend_from_slice(&((duration_secs * timescale as f64) as u32).to_be_bytes());
    mvhd.extend_from_slice(&[0u8; 80]);

    let mut out = Vec::new();
    out.extend_from_slice(&16u32.to_be_bytes());
    out.extend_from_slice(b"ftypisom");
    out.extend_from_slice(&[0, 0, 2, 0]);
    let mvhd_len = 8 + mvhd.len() as u32;
    out.extend_from_slice(&(8 + mvhd_len).to_be_bytes());
    out.extend_from_slice(b"moov");
    out.extend_from_slice(&mvhd_len.to_be_bytes());
    out.extend_from_slice(b"mvhd");
    out.extend_from_slice(&mvhd);
    out
}

fn lerp(a: (f64, f64), b: (f64, f64), k: usize, n: usize) -> (f64, f64) {
    let f = (k as f64 / n as f64).min(1.0);
    (a.0 + (b.0 - a.0) * f, a.1 + (b.1 - a.1) * f)
}

/// Face-on right-handed swing at 30 fps: address, backswing, downswing, follow-through, finish.
pub fn swing(head_drift: f64) -> PoseSequence {
    let (address, back, down, follow, finish) = (10, 24, 8, 12, 6);
    let hands_at = [(0.5, 0.65), (0.35, 0.2), (0.5, 0.66), (0.65, 0.18)];
    let fps = 30.0;

    let frames = (0..address + back + down + follow + finish).map(|i| {
        let hands = if i < address {
            hands_at[0]
        } else if i < address + back {
            lerp(hands_at[0], hands_at[1], i + 1 - address, back)
        } else if i < address + back + down {
            lerp(hands_at[1], hands_at[2], i + 1 - address - back, down)
        } else if i < address + back + down + follow {
            lerp(hands_at[2], hands_at[3], i + 1 - address - back - down, follow)
        } else {
            hands_at[3]
        };
        let drift = if i < address { 0.0 } else { ((i - address + 1) as f64 / back as f64).min(1.0) };

        let mut kp = HashMap::new();
        let mut put = |name: &str, x: f64, y: f64| {
            kp.insert(name.to_string(), [x, y, 0.9]);
        };
        put(NOSE, 0.5 + head_drift * drift, 0.2);
        put(LEFT_SHOULDER, 0.42, 0.35);
        put(RIGHT_SHOULDER, 0.58, 0.35);
        put(LEFT_ELBOW, (0.42 + hands.0 - 0.01) / 2.0, (0.35 + hands.1) / 2.0);
        put(RIGHT_ELBOW, (0.58 + hands.0 + 0.01) / 2.0, (0.35 + hands.1) / 2.0);
        put(LEFT_WRIST, hands.0 - 0.01, hands.1);
        put(RIGHT_WRIST, hands.0 + 0.01, hands.1);
        put(LEFT_HIP, 0.45, 0.6);
        put(RIGHT_HIP, 0.55, 0.6);
        put(LEFT_ANKLE, 0.44, 0.9);
        put(RIGHT_ANKLE, 0.56, 0.9);
        PoseFrame { t: i as f64 / fps, keypoints: kp }
    }).collect();

    PoseSequence { fps, handedness: Handedness::Right, frames }
}

/// Write `<name>` plus, optionally, its `.pose.json` sidecar. Returns the video path.
pub fn write_swing(dir: &Path, name: &str, head_drift: Option<f64>) -> String {
    let video = dir.join(name);
    std::fs::write(&video, mp4_bytes(2.0)).unwrap();
    if let Some(drift) = head_drift {
        let pose = serde_json::to_vec(&swing(drift)).unwrap();
        std::fs::write(dir.join(format!("{}.pose.json", name)), pose).unwrap();
    }
    video.to_string_lossy().into_owned()
}
