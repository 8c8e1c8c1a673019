//! In-process router tests.
//!
//! These exercise the paths that never leave the process: the auth gate's
//! missing-token rejection, the health endpoint, request validation, and
//! the not-found fallback. Everything that needs a live identity/kv/storage
//! service is covered by unit tests over the pure logic instead.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{FromRequest, Multipart, Path, State};
use axum::http::{header, Method, Request, StatusCode};
use axum::{Extension, Json};
use http_body_util::BodyExt;
use tower::ServiceExt;

use dermascan::models::AuthUser;
use dermascan::routes::{analyze, scans, upload, users};
use dermascan::{build_router, ServerConfig, ServerError, ServerState};

fn test_state() -> Arc<ServerState> {
    Arc::new(ServerState::new(ServerConfig::default()).expect("state"))
}

fn test_router() -> axum::Router {
    build_router(test_state())
}

fn caller_u1() -> AuthUser {
    AuthUser {
        id: "u1".to_string(),
        email: "u1@example.com".to_string(),
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/dermascan/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn root_reports_service_info() {
    let response = test_router()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "DermaScan Server");
}

#[tokio::test]
async fn unknown_route_returns_error_envelope() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/dermascan/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn protected_routes_reject_missing_token() {
    for (method, uri) in [
        (Method::GET, "/dermascan/user/u1"),
        (Method::PUT, "/dermascan/user/u1"),
        (Method::POST, "/dermascan/upload-image"),
        (Method::POST, "/dermascan/analyze"),
        (Method::GET, "/dermascan/scans/u1"),
        (Method::DELETE, "/dermascan/scans/scan_u1_1"),
    ] {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method(method.clone())
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{method} {uri}"
        );
        let body = body_json(response).await;
        assert!(
            body["error"].as_str().unwrap().contains("No token"),
            "{method} {uri}"
        );
    }
}

#[tokio::test]
async fn signup_requires_all_fields() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/dermascan/signup")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email": "a@b.c"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Email, password, and name are required");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/dermascan/health")
                .header("x-request-id", "test-id-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "test-id-123"
    );
}

#[tokio::test]
async fn state_initialization() {
    let state = ServerState::new(ServerConfig::default()).unwrap();
    assert_eq!(state.config.port, 8080);
    assert_eq!(state.config.storage.bucket, "skin-scans");
}

// Ownership checks run before any upstream call, so these handlers can be
// invoked directly with a mismatched caller and must fail closed.

#[tokio::test]
async fn get_profile_rejects_other_users() {
    let err = users::get_profile(
        State(test_state()),
        Extension(caller_u1()),
        Path("someone-else".to_string()),
    )
    .await
    .err()
    .expect("cross-user profile read must be rejected");
    assert!(matches!(err, ServerError::Forbidden(_)));
}

#[tokio::test]
async fn update_profile_rejects_other_users() {
    let err = users::update_profile(
        State(test_state()),
        Extension(caller_u1()),
        Path("someone-else".to_string()),
        Json(users::UpdateProfileRequest {
            name: Some("Mallory".to_string()),
        }),
    )
    .await
    .err()
    .expect("cross-user profile update must be rejected");
    assert!(matches!(err, ServerError::Forbidden(_)));
}

#[tokio::test]
async fn list_scans_rejects_other_users() {
    let err = scans::list_scans(
        State(test_state()),
        Extension(caller_u1()),
        Path("someone-else".to_string()),
    )
    .await
    .err()
    .expect("cross-user scan listing must be rejected");
    assert!(matches!(err, ServerError::Forbidden(_)));
}

#[tokio::test]
async fn analyze_rejects_other_users() {
    let err = analyze::analyze(
        State(test_state()),
        Extension(caller_u1()),
        Json(analyze::AnalyzeRequest {
            user_id: "someone-else".to_string(),
            image_url: "https://storage.example/signed".to_string(),
        }),
    )
    .await
    .err()
    .expect("cross-user analysis must be rejected");
    assert!(matches!(err, ServerError::Forbidden(_)));
}

#[tokio::test]
async fn upload_rejects_mismatched_user_field() {
    let body = concat!(
        "--XBOUNDARY\r\n",
        "Content-Disposition: form-data; name=\"file\"; filename=\"lesion.jpg\"\r\n",
        "Content-Type: image/jpeg\r\n",
        "\r\n",
        "not-really-a-jpeg\r\n",
        "--XBOUNDARY\r\n",
        "Content-Disposition: form-data; name=\"userId\"\r\n",
        "\r\n",
        "someone-else\r\n",
        "--XBOUNDARY--\r\n",
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/dermascan/upload-image")
        .header(
            header::CONTENT_TYPE,
            "multipart/form-data; boundary=XBOUNDARY",
        )
        .body(Body::from(body))
        .unwrap();
    let multipart = Multipart::from_request(request, &()).await.unwrap();

    let err = upload::upload_image(State(test_state()), Extension(caller_u1()), multipart)
        .await
        .err()
        .expect("cross-user upload must be rejected");
    assert!(matches!(err, ServerError::Forbidden(_)));
}
