//! # Backup Reconciliation Route
//!
//! `POST /api/hwids/sync` — reconcile a HWID against the backup
//! authority. When the authority already holds a record it is the system
//! of record and nothing changes locally; when it does not, the HWID is
//! registered locally (no promotion timer — the caller's classification
//! is immediate) and classified per the supplied status.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use lum_core::Hwid;
use lum_registry::{Reconciler, SyncOutcome};

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Assemble the sync router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/hwids/sync", post(sync_with_backup))
}

/// Sync request: the HWID and the classification the caller vouches for
/// (`true` → whitelist, `false` → blacklist).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SyncRequest {
    pub hwid: String,
    pub status: bool,
}

/// Sync result: either the authority already had a record, or the
/// caller's classification was applied locally.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum SyncResponse {
    /// The backup authority holds a record; no local action taken.
    Found { found: bool },
    /// The HWID was registered (if unknown) and classified locally.
    Applied {
        registered: bool,
        /// `whitelisted` or `blacklisted`.
        classification: String,
    },
}

/// Reconcile a HWID against the backup authority.
#[utoipa::path(
    post,
    path = "/api/hwids/sync",
    request_body = SyncRequest,
    responses(
        (status = 200, description = "Reconciliation outcome", body = SyncResponse),
        (status = 502, description = "Backup authority unreachable or timed out"),
        (status = 503, description = "No backup authority configured"),
    ),
    tag = "sync"
)]
pub async fn sync_with_backup(
    State(state): State<AppState>,
    body: Result<Json<SyncRequest>, JsonRejection>,
) -> Result<Json<SyncResponse>, AppError> {
    let request = extract_json(body)?;
    let hwid = Hwid::new(request.hwid).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let authority = state
        .backup
        .clone()
        .ok_or_else(|| AppError::ServiceUnavailable("no backup authority configured".into()))?;

    let reconciler = Reconciler::new(state.registry.clone(), authority);
    let outcome = reconciler.sync(&hwid, request.status).await?;

    Ok(Json(match outcome {
        SyncOutcome::Found => SyncResponse::Found { found: true },
        SyncOutcome::Applied { classification } => SyncResponse::Applied {
            registered: true,
            classification: classification.to_string(),
        },
    }))
}
