pub mod handlers;
pub mod models;

use crate::server::AppState;
use axum::{Router, routing::get};
use std::sync::Arc;

/// Resolution API surface:
/// 1. Resolve an identifier/link into a playable source via /api/resolve
///    (GET query parameter or POST JSON body)
/// 2. Probe provider availability via /api/check
/// 3. Report the node version via /version
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/resolve",
            get(handlers::resolve_get).post(handlers::resolve_post),
        )
        .route("/api/check", get(handlers::check))
        .route("/version", get(handlers::version))
}
