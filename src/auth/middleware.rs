//! Authentication middleware
//!
//! Extracts the bearer token, authorizes it, and hands the resulting
//! `AuthContext` to the handler through request extensions.

use crate::auth::guard::{authorize, Decision, DenyReason, Requirement};
use crate::error::AppError;
use crate::state::SharedState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use chrono::Utc;

/// Reject requests without a valid token; attach the context otherwise.
///
/// Role checks stay in the handlers, so this only asks for authentication.
pub async fn auth_middleware(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::Unauthenticated("Missing bearer token".to_string()))?;

    let ctx = match authorize(
        &state.tokens,
        bearer.token(),
        &Requirement::Authenticated,
        Utc::now(),
    ) {
        Decision::Allow(ctx) => ctx,
        Decision::Deny(DenyReason::Unauthenticated(e)) => {
            return Err(AppError::Unauthenticated(e.to_string()))
        }
        Decision::Deny(DenyReason::Forbidden) => {
            return Err(AppError::Forbidden("Access denied".to_string()))
        }
    };

    request.extensions_mut().insert(ctx);

    Ok(next.run(request).await)
}
