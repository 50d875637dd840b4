//! Tests for `AppError` -> HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server or
//! database is involved.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use candor_api::error::AppError;
use candor_core::error::CoreError;
use candor_core::media::MediaStoreError;
use candor_inference::scoring::ScoringError;
use http_body_util::BodyExt;

async fn error_to_response(err: AppError) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = err.into_response();
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, bytes.to_vec())
}

async fn error_to_json(err: AppError) -> (StatusCode, serde_json::Value) {
    let (status, _, bytes) = error_to_response(err).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ---------------------------------------------------------------------------
// Domain errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Interview",
        id: 42,
    });

    let (status, json) = error_to_json(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Interview with id 42 not found");
}

#[tokio::test]
async fn validation_returns_400() {
    let (status, json) =
        error_to_json(AppError::Core(CoreError::Validation("bad label".into()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "bad label");
}

#[tokio::test]
async fn forbidden_is_distinct_from_not_found() {
    let (status, json) = error_to_json(AppError::Core(CoreError::Forbidden(
        "Not authorized to access this interview".into(),
    )))
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn unauthorized_returns_401() {
    let (status, json) =
        error_to_json(AppError::Core(CoreError::Unauthorized("no token".into()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn conflict_returns_409() {
    let (status, json) =
        error_to_json(AppError::Core(CoreError::Conflict("session closed".into()))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn internal_errors_are_sanitized() {
    let (status, json) = error_to_json(AppError::Core(CoreError::Internal(
        "connection string postgres://secret".into(),
    )))
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");

    let (status, json) = error_to_json(AppError::Database(sqlx::Error::PoolTimedOut)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn bad_request_returns_400() {
    let (status, json) = error_to_json(AppError::BadRequest("missing field".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Scoring errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upstream_timeout_and_unreachable_are_distinguishable() {
    let (status, timeout) =
        error_to_json(AppError::Scoring(ScoringError::UpstreamTimeout(Duration::from_secs(10))))
            .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(timeout["code"], "UPSTREAM_TIMEOUT");

    let (status, unreachable) = error_to_json(AppError::Scoring(
        ScoringError::UpstreamUnreachable("connection refused".into()),
    ))
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(unreachable["code"], "UPSTREAM_UNREACHABLE");
    // Transport details stay in the logs.
    assert!(!unreachable["error"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}

#[tokio::test]
async fn upstream_rejection_is_forwarded_verbatim() {
    let body = r#"{"detail":"no face detected"}"#;
    let (status, content_type, bytes) = error_to_response(AppError::Scoring(
        ScoringError::UpstreamRejected {
            status: 422,
            body: body.to_string(),
        },
    ))
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(bytes, body.as_bytes());
}

#[tokio::test]
async fn invalid_frame_returns_400() {
    let (status, json) =
        error_to_json(AppError::Scoring(ScoringError::InvalidInput("not an image".into()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn staging_failure_is_internal() {
    let err = ScoringError::Staging(MediaStoreError::InvalidKey("../x".into()));
    let (status, json) = error_to_json(AppError::Scoring(err)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}
