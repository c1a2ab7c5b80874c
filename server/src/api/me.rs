//! Permission inspection for the calling user.
//!
//! These endpoints expose the fine-grained permission statement to
//! clients. They are deliberately separate from the role gate: the gate
//! decides route access by role membership, these answer "can my role do
//! X to Y" for in-page decisions.

use std::collections::BTreeMap;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, AuthUser};
use crate::permissions::{Action, Resource, RoleName};

use super::AppState;

/// Grant map of the caller's role.
#[derive(Debug, Serialize)]
pub struct PermissionsResponse {
    pub role: RoleName,
    pub grants: BTreeMap<Resource, Vec<Action>>,
}

/// Get the full grant map for the current user's role.
///
/// `GET /api/me/permissions`
#[tracing::instrument(skip(state, auth))]
pub async fn my_permissions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Json<PermissionsResponse> {
    let role = state.roles.get(auth.role);
    Json(PermissionsResponse {
        role: auth.role,
        grants: role.grants().clone(),
    })
}

/// Single permission probe.
#[derive(Debug, Deserialize)]
pub struct PermissionCheckRequest {
    pub resource: String,
    pub action: String,
}

/// Probe result.
#[derive(Debug, Serialize)]
pub struct PermissionCheckResponse {
    pub granted: bool,
}

/// Check one (resource, action) pair against the current user's role.
///
/// `POST /api/me/permissions/check`
///
/// Unknown resource or action names are validation errors, not denials.
#[tracing::instrument(skip(state, auth, body))]
pub async fn check_permission(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<PermissionCheckRequest>,
) -> Result<Json<PermissionCheckResponse>, AuthError> {
    let resource: Resource = body
        .resource
        .parse()
        .map_err(|_| AuthError::Validation(format!("Unknown resource: {}", body.resource)))?;
    let action: Action = body
        .action
        .parse()
        .map_err(|_| AuthError::Validation(format!("Unknown action: {}", body.action)))?;

    let granted = state.roles.get(auth.role).has_permission(resource, action);
    Ok(Json(PermissionCheckResponse { granted }))
}
