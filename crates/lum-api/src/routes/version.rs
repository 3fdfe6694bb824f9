//! Service version route and the root redirect.

use axum::response::Redirect;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Assemble the version router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/api/version", get(version))
}

/// Version response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VersionResponse {
    /// Semantic version of the running service.
    pub version: String,
}

/// Report the running service version.
#[utoipa::path(
    get,
    path = "/api/version",
    responses(
        (status = 200, description = "Service version", body = VersionResponse),
    ),
    tag = "version"
)]
pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// The original service redirected the bare root to the version route.
async fn root() -> Redirect {
    Redirect::temporary("/api/version")
}
