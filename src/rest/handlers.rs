use std::sync::Arc;

use axum::{
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tracing::debug;

use crate::common::{ApiError, ResolveError};
use crate::rest::models::*;
use crate::server::AppState;

/// GET /api/resolve?url=...
pub async fn resolve_get(
    Query(params): Query<ResolveQuery>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    handle_resolve(state, params.url, &headers).await
}

/// POST /api/resolve with `{"url": "..."}`
pub async fn resolve_post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<ResolveRequest>, JsonRejection>,
) -> Response {
    // a rejected body must still answer with the JSON error shape
    let Json(body) = match body {
        Ok(json) => json,
        Err(rejection) => return invalid_json_response(&rejection),
    };
    handle_resolve(state, body.url, &headers).await
}

fn invalid_json_response(rejection: &JsonRejection) -> Response {
    debug!("rejected request body: {}", rejection.body_text());
    error_response(400, "Invalid JSON body")
}

async fn handle_resolve(
    state: Arc<AppState>,
    url: Option<String>,
    headers: &HeaderMap,
) -> Response {
    let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
        return error_response(400, "URL is required");
    };

    let client = client_ip(headers);
    debug!("resolve '{}' for {}", url, client);

    match state.resolver.resolve(&url, &client).await {
        Ok(descriptor) => (StatusCode::OK, Json(descriptor)).into_response(),
        Err(err) => resolve_error_response(&err),
    }
}

/// GET /api/check?url=... — upstream availability probe.
pub async fn check(
    Query(params): Query<CheckQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(url) = params.url.filter(|u| !u.trim().is_empty()) else {
        return error_response(400, "URL is required");
    };

    match state.probe.head(&url).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            // 5xx is how these providers report "offline"
            Json(CheckResponse {
                status,
                ok: status < 500,
                error: None,
            })
            .into_response()
        }
        Err(e) => {
            debug!("probe of {} failed: {}", url, e);
            Json(CheckResponse {
                status: 500,
                ok: false,
                error: Some("Network error".to_string()),
            })
            .into_response()
        }
    }
}

/// GET /version
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

fn resolve_error_response(err: &ResolveError) -> Response {
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiError::from(err))).into_response()
}

fn error_response(status: u16, message: &str) -> Response {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST),
        Json(ApiError::new(status, message)),
    )
        .into_response()
}

/// Requesting client for rate-limit bookkeeping: proxy headers first,
/// loopback otherwise.
fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        return real_ip.to_string();
    }
    "127.0.0.1".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    #[tokio::test]
    async fn malformed_json_body_still_answers_with_the_json_error_shape() {
        let request = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let rejection = Json::<ResolveRequest>::from_request(request, &())
            .await
            .unwrap_err();

        let response = invalid_json_response(&rejection);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], 400);
        assert_eq!(body["error"], "Invalid JSON body");
    }

    #[test]
    fn client_ip_prefers_forwarded_chain_head() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        assert_eq!(client_ip(&headers), "203.0.113.7");
    }

    #[test]
    fn client_ip_falls_back_to_real_ip_then_loopback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        assert_eq!(client_ip(&headers), "10.0.0.2");
        assert_eq!(client_ip(&HeaderMap::new()), "127.0.0.1");
    }
}
