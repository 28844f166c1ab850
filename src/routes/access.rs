//! Role-gated read endpoints
//!
//! Each handler runs its guard before touching the repository.

use crate::auth::{require, resolve_authorities, AuthContext, Requirement, ROLE_ADMIN, ROLE_MANAGER};
use crate::error::{not_found_error, ApiResult};
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct RoleSummary {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActiveRolesResponse {
    pub success: bool,
    pub roles: Vec<RoleSummary>,
}

#[derive(Debug, Serialize)]
pub struct UserAuthoritiesResponse {
    pub success: bool,
    pub username: String,
    pub authorities: Vec<String>,
}

/// GET /api/roles/active
///
/// Requires ADMIN or MANAGER.
pub async fn active_roles(
    State(state): State<SharedState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<ActiveRolesResponse>> {
    require(&ctx, &Requirement::any_role(&[ROLE_ADMIN, ROLE_MANAGER]))?;

    let roles = state
        .repository
        .find_active_roles()?
        .into_iter()
        .map(|r| RoleSummary {
            id: r.id,
            name: r.name,
            description: r.description,
        })
        .collect();

    Ok(Json(ActiveRolesResponse {
        success: true,
        roles,
    }))
}

/// GET /api/users/{username}/authorities
///
/// Requires ADMIN. Resolves another user's effective authorities.
pub async fn user_authorities(
    State(state): State<SharedState>,
    Extension(ctx): Extension<AuthContext>,
    Path(username): Path<String>,
) -> ApiResult<Json<UserAuthoritiesResponse>> {
    require(&ctx, &Requirement::role(ROLE_ADMIN))?;

    let user = state
        .repository
        .find_user_by_username(&username)?
        .ok_or_else(|| not_found_error(format!("User '{}' not found", username)))?;
    let grants = state
        .repository
        .find_user_grants(user.id)?
        .ok_or_else(|| not_found_error(format!("User '{}' not found", username)))?;

    info!("'{}' inspected authorities of '{}'", ctx.username, username);

    Ok(Json(UserAuthoritiesResponse {
        success: true,
        username: user.username,
        authorities: resolve_authorities(&grants)
            .iter()
            .map(|a| a.to_string())
            .collect(),
    }))
}
