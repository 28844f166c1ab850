//! Authentication route handlers
//!
//! Login, current-principal and current-menu endpoints.

use super::extract::ValidatedJson;
use crate::auth::{self, AuthContext, LoginOutcome, TOKEN_TYPE};
use crate::error::{ApiResult, AppError};
use crate::menu::{build_tree, MenuNode};
use crate::models::Status;
use crate::state::SharedState;
use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// ============================================
// Request/Response Types
// ============================================

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub username: String,
    pub roles: Vec<String>,
    pub menus: Vec<MenuNode>,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            expires_in: outcome.token.claims.exp - outcome.token.claims.iat,
            access_token: outcome.token.token,
            token_type: TOKEN_TYPE.to_string(),
            username: outcome.username,
            roles: outcome.roles,
            menus: outcome.menus,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub status: Status,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub success: bool,
    pub user: CurrentUser,
    pub roles: Vec<String>,
    pub authorities: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MenusResponse {
    pub success: bool,
    pub menus: Vec<MenuNode>,
}

// ============================================
// Route Handlers
// ============================================

/// POST /api/auth/login
///
/// Authenticate with username and password, receive a bearer token and the
/// caller's menu tree. Every failure produces the same 400 response.
pub async fn login(
    State(state): State<SharedState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    // bcrypt is deliberately slow; keep it off the async workers.
    let outcome = tokio::task::spawn_blocking(move || {
        auth::login(
            state.repository.as_ref(),
            &state.tokens,
            &state.decoy,
            &req.username,
            &req.password,
            Utc::now(),
        )
    })
    .await
    .map_err(|e| AppError::Internal(format!("Login task failed: {}", e)))??;

    Ok(Json(LoginResponse::from(outcome)))
}

/// GET /api/auth/me
///
/// Identity and authorities come from the token; id and status from storage.
pub async fn me(
    State(state): State<SharedState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<MeResponse>> {
    let user = state
        .repository
        .find_user_by_username(&ctx.username)?
        .ok_or_else(|| AppError::Unauthenticated("Token subject no longer exists".to_string()))?;

    Ok(Json(MeResponse {
        success: true,
        user: CurrentUser {
            id: user.id,
            username: user.username,
            status: user.status,
        },
        roles: ctx.role_names(),
        authorities: ctx.authorities.iter().map(|a| a.to_string()).collect(),
        expires_at: ctx.expires_at,
    }))
}

/// GET /api/auth/menus
///
/// Re-derive the caller's navigation tree from the current snapshot.
pub async fn menus(
    State(state): State<SharedState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<MenusResponse>> {
    let rows = state.repository.find_menus_authorized_for(&ctx.username)?;

    Ok(Json(MenusResponse {
        success: true,
        menus: build_tree(&rows),
    }))
}
