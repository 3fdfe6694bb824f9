//! # HWID Lifecycle Routes
//!
//! - `GET    /api/hwids`             — ordered list of known HWIDs
//! - `POST   /api/hwids`             — submit a HWID (arms auto-promotion)
//! - `PUT    /api/hwids/whitelist`   — explicitly whitelist a HWID
//! - `PUT    /api/hwids/blacklist`   — explicitly blacklist a HWID
//! - `DELETE /api/hwids`             — remove a HWID from all state
//! - `GET    /api/hwids/check/:hwid` — classification check (never errors)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use lum_core::Hwid;
use lum_registry::{promotion, ClassificationMeta, HwidVerdict, RemainingTime};

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Assemble the HWID lifecycle router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/hwids",
            get(list_hwids).post(submit_hwid).delete(delete_hwid),
        )
        .route("/api/hwids/whitelist", put(whitelist_hwid))
        .route("/api/hwids/blacklist", put(blacklist_hwid))
        .route("/api/hwids/check/:hwid", get(check_hwid))
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body for submission and deletion.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HwidRequest {
    /// The hardware identifier to operate on.
    pub hwid: String,
}

/// Body for explicit whitelist/blacklist actions.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyRequest {
    /// The hardware identifier to classify.
    pub hwid: String,
    /// Why the HWID was classified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Operator-defined code surfaced to clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_code: Option<String>,
    /// The acting staff member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_name: Option<String>,
}

impl ClassifyRequest {
    fn into_parts(self) -> (String, ClassificationMeta) {
        (
            self.hwid,
            ClassificationMeta {
                reason: self.reason,
                custom_code: self.custom_code,
                staff_name: self.staff_name,
            },
        )
    }
}

/// Confirmation message, matching the original service's responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Ordered list of known HWIDs.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HwidListResponse {
    pub hwids: Vec<String>,
}

/// Classification check result.
///
/// Optional fields are omitted entirely when absent — never emitted as
/// null. Pending and unknown HWIDs both report `not_found`; only the
/// countdown distinguishes them.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    /// `whitelisted`, `blacklisted`, or `not_found`.
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_name: Option<String>,
    /// `"M minutes S seconds"` for pending HWIDs, `"Unknown"` for ones
    /// never submitted. Absent for classified HWIDs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_time: Option<String>,
}

impl From<HwidVerdict> for CheckResponse {
    fn from(verdict: HwidVerdict) -> Self {
        let classified = |state: &str, meta: ClassificationMeta| Self {
            state: state.to_string(),
            reason: meta.reason,
            custom_code: meta.custom_code,
            staff_name: meta.staff_name,
            remaining_time: None,
        };
        match verdict {
            HwidVerdict::Whitelisted(meta) => classified("whitelisted", meta),
            HwidVerdict::Blacklisted(meta) => classified("blacklisted", meta),
            HwidVerdict::NotFound { remaining } => Self {
                state: "not_found".to_string(),
                reason: None,
                custom_code: None,
                staff_name: None,
                remaining_time: Some(remaining.to_string()),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// List all known HWIDs in first-submission order.
#[utoipa::path(
    get,
    path = "/api/hwids",
    responses(
        (status = 200, description = "Known HWIDs in insertion order", body = HwidListResponse),
    ),
    tag = "hwids"
)]
pub async fn list_hwids(State(state): State<AppState>) -> Json<HwidListResponse> {
    let hwids = state
        .registry
        .list()
        .iter()
        .map(|h| h.to_string())
        .collect();
    Json(HwidListResponse { hwids })
}

/// Submit a new HWID.
///
/// Registers it as pending and arms the auto-promotion timer. Invalid
/// and already-known HWIDs are rejected with the same error class.
#[utoipa::path(
    post,
    path = "/api/hwids",
    request_body = HwidRequest,
    responses(
        (status = 201, description = "HWID registered, pending auto-promotion", body = MessageResponse),
        (status = 409, description = "Invalid or already-known HWID"),
    ),
    tag = "hwids"
)]
pub async fn submit_hwid(
    State(state): State<AppState>,
    body: Result<Json<HwidRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = extract_json(body)?;
    let hwid = Hwid::new(request.hwid)
        .map_err(|e| AppError::DuplicateOrInvalid(e.to_string()))?;
    let ticket = state.registry.submit(hwid)?;
    promotion::schedule(state.registry.clone(), ticket, state.backup.clone());
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "HWID added successfully.".to_string(),
        }),
    ))
}

/// Explicitly whitelist a known HWID.
#[utoipa::path(
    put,
    path = "/api/hwids/whitelist",
    request_body = ClassifyRequest,
    responses(
        (status = 200, description = "HWID whitelisted", body = MessageResponse),
        (status = 404, description = "Unknown HWID"),
    ),
    tag = "hwids"
)]
pub async fn whitelist_hwid(
    State(state): State<AppState>,
    body: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let (raw, meta) = extract_json(body)?.into_parts();
    let hwid = Hwid::new(raw).map_err(|e| AppError::NotFound(e.to_string()))?;
    state.registry.set_whitelisted(&hwid, meta)?;
    Ok(Json(MessageResponse {
        message: "HWID whitelisted successfully.".to_string(),
    }))
}

/// Explicitly blacklist a known HWID. Repeat calls overwrite the stored
/// metadata.
#[utoipa::path(
    put,
    path = "/api/hwids/blacklist",
    request_body = ClassifyRequest,
    responses(
        (status = 200, description = "HWID blacklisted", body = MessageResponse),
        (status = 404, description = "Unknown HWID"),
    ),
    tag = "hwids"
)]
pub async fn blacklist_hwid(
    State(state): State<AppState>,
    body: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let (raw, meta) = extract_json(body)?.into_parts();
    let hwid = Hwid::new(raw).map_err(|e| AppError::NotFound(e.to_string()))?;
    state.registry.set_blacklisted(&hwid, meta)?;
    Ok(Json(MessageResponse {
        message: "HWID blacklisted successfully.".to_string(),
    }))
}

/// Remove a HWID from all state. Any outstanding promotion timer for it
/// becomes a no-op.
#[utoipa::path(
    delete,
    path = "/api/hwids",
    request_body = HwidRequest,
    responses(
        (status = 200, description = "HWID deleted", body = MessageResponse),
        (status = 404, description = "Unknown HWID"),
    ),
    tag = "hwids"
)]
pub async fn delete_hwid(
    State(state): State<AppState>,
    body: Result<Json<HwidRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let request = extract_json(body)?;
    let hwid = Hwid::new(request.hwid).map_err(|e| AppError::NotFound(e.to_string()))?;
    state.registry.delete(&hwid)?;
    Ok(Json(MessageResponse {
        message: "HWID deleted successfully.".to_string(),
    }))
}

/// Check a HWID's classification. Always 200 — absence is a state, not
/// an error.
#[utoipa::path(
    get,
    path = "/api/hwids/check/{hwid}",
    params(
        ("hwid" = String, Path, description = "Hardware identifier to check")
    ),
    responses(
        (status = 200, description = "Current classification", body = CheckResponse),
    ),
    tag = "hwids"
)]
pub async fn check_hwid(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Json<CheckResponse> {
    // A malformed identifier cannot be registered, so it reads exactly
    // like one that was never submitted.
    let verdict = match Hwid::new(raw) {
        Ok(hwid) => state.registry.check(&hwid),
        Err(_) => HwidVerdict::NotFound {
            remaining: RemainingTime::Unknown,
        },
    };
    Json(CheckResponse::from(verdict))
}
