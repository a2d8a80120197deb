use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use crate::errors::FairwayError;

impl FairwayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FairwayError::Validation(_) | FairwayError::Config(_) => StatusCode::BAD_REQUEST,
            FairwayError::Authentication(_) => StatusCode::UNAUTHORIZED,
            FairwayError::NotFound(_) => StatusCode::NOT_FOUND,
            FairwayError::Conflict(_) | FairwayError::Cancelled(_) => StatusCode::CONFLICT,
            FairwayError::Upload(_) => StatusCode::BAD_GATEWAY,
            FairwayError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body shared by every endpoint: `{error, kind, retryable}`.
pub fn api_error(e: FairwayError) -> (StatusCode, Json<Value>) {
    let class = e.classify();
    (
        e.status_code(),
        Json(json!({
            "error": e.to_string(),
            "kind": class.error_type,
            "retryable": class.retryable,
        })),
    )
}

impl IntoResponse for FairwayError {
    fn into_response(self) -> axum::response::Response {
        api_error(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(FairwayError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(FairwayError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(FairwayError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(FairwayError::Upload("x".into()).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(FairwayError::Timeout("x".into()).status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(FairwayError::Database("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_body() {
        let (status, Json(body)) = api_error(FairwayError::NotFound("Capture 3".into()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "not_found_error");
        assert_eq!(body["retryable"], false);
        assert_eq!(body["error"], "Not found: Capture 3");
    }
}
