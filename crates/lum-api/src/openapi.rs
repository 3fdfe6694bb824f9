//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single spec served at
//! `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the whole API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Luminous API — HWID Gate",
        version = "1.0.0",
        description = "Tracks hardware identifiers submitted by clients and classifies each as pending, whitelisted, or blacklisted to gate access to the protected application.\n\nSubmitted HWIDs start pending and auto-promote to the whitelist after 5 minutes unless staff classify or delete them first. HWIDs absent locally can be reconciled against the external backup authority.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server"),
    ),
    paths(
        crate::routes::version::version,
        crate::routes::hwids::list_hwids,
        crate::routes::hwids::submit_hwid,
        crate::routes::hwids::whitelist_hwid,
        crate::routes::hwids::blacklist_hwid,
        crate::routes::hwids::delete_hwid,
        crate::routes::hwids::check_hwid,
        crate::routes::sync::sync_with_backup,
    ),
    components(schemas(
        crate::routes::version::VersionResponse,
        crate::routes::hwids::HwidRequest,
        crate::routes::hwids::ClassifyRequest,
        crate::routes::hwids::MessageResponse,
        crate::routes::hwids::HwidListResponse,
        crate::routes::hwids::CheckResponse,
        crate::routes::sync::SyncRequest,
        crate::routes::sync::SyncResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "version", description = "Service metadata"),
        (name = "hwids", description = "HWID lifecycle and classification checks"),
        (name = "sync", description = "Backup authority reconciliation"),
    )
)]
pub struct ApiDoc;

/// Serve the assembled spec.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
