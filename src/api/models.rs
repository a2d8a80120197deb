use serde::{Deserialize, Serialize};
use crate::pipeline::SubmitRequest;

#[derive(Debug, Deserialize, Serialize)]
pub struct SubmitCaptureRequest {
    pub user_id: String,
    pub video_uri: String,
    /// Duration hint in seconds, used when the container has no usable header.
    pub duration: Option<f64>,
    pub club: String,
    #[serde(default)]
    pub generate_overlays: bool,
}

impl From<SubmitCaptureRequest> for SubmitRequest {
    fn from(r: SubmitCaptureRequest) -> Self {
        SubmitRequest {
            user_id: r.user_id,
            video_uri: r.video_uri,
            duration_hint: r.duration,
            club: r.club,
            generate_overlays: r.generate_overlays,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub const DEFAULT_PAGE: usize = 20;
pub const MAX_PAGE: usize = 100;

impl PageQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE)
    }

    /// Capped at what SQLite accepts for OFFSET.
    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0).min(i64::MAX as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds() {
        let q = PageQuery { limit: Some(1000), offset: None };
        assert_eq!(q.limit(), MAX_PAGE);
        assert_eq!(q.offset(), 0);
        let q = PageQuery { limit: Some(0), offset: Some(5) };
        assert_eq!(q.limit(), 1);
        let q = PageQuery { limit: Some(1), offset: Some(usize::MAX) };
        assert_eq!(q.offset(), i64::MAX as usize);
    }

    #[test]
    fn test_submit_request_defaults() {
        let req: SubmitCaptureRequest = serde_json::from_str(
            r#"{"user_id": "u", "video_uri": "/a.mp4", "club": "Driver"}"#
        ).unwrap();
        let req: SubmitRequest = req.into();
        assert!(!req.generate_overlays);
        assert!(req.duration_hint.is_none());
    }
}
