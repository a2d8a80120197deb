use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use crate::errors::FairwayError;
use super::errors::api_error;

pub const API_TOKEN_ENV: &str = "FAIRWAY_API_TOKEN";

/// Bearer check, active only when `FAIRWAY_API_TOKEN` is set and non-empty.
pub async fn api_auth_middleware(
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<serde_json::Value>)> {
    if let Ok(expected_token) = std::env::var(API_TOKEN_ENV) {
        if !expected_token.is_empty() {
            let auth_header = request.headers()
                .get("Authorization")
                .and_then(|v| v.to_str().ok());

            match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
                Some(token) if token == expected_token => {}
                Some(_) => {
                    return Err(api_error(FairwayError::Authentication("Invalid API token".to_string())));
                }
                None => {
                    return Err(api_error(FairwayError::Authentication("Missing Authorization header".to_string())));
                }
            }
        }
    }

    Ok(next.run(request).await)
}
