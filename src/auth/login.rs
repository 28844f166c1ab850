//! Login orchestration
//!
//! credentials -> grants -> authorities -> authorized menus -> tree -> token

use crate::auth::authority::resolve_authorities;
use crate::auth::credentials::{verify_credentials, AuthError, DecoyHash};
use crate::auth::jwt::{IssuedToken, TokenService};
use crate::error::AppError;
use crate::menu::{build_tree, MenuNode};
use crate::repository::AccessRepository;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Everything a successful login hands back to the client
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub username: String,
    pub roles: Vec<String>,
    pub menus: Vec<MenuNode>,
    pub token: IssuedToken,
}

/// Authenticate and assemble the login response for one principal
pub fn login(
    repository: &dyn AccessRepository,
    tokens: &TokenService,
    decoy: &DecoyHash,
    username: &str,
    password: &str,
    now: DateTime<Utc>,
) -> Result<LoginOutcome, AuthError> {
    let user = verify_credentials(repository, decoy, username, password).map_err(|e| {
        warn!("Login rejected for '{}': {}", username, e);
        e
    })?;

    // The user was just read, so a missing grant view means storage moved under us.
    let grants = repository
        .find_user_grants(user.id)?
        .ok_or(AuthError::InvalidCredentials)?;
    if !grants.user.is_active() {
        return Err(AuthError::AccountDisabled);
    }

    let authorities = resolve_authorities(&grants);
    let roles = grants.active_role_names();

    let menus = repository.find_menus_authorized_for(&user.username)?;
    let tree = build_tree(&menus);

    let token = tokens
        .issue(&user.username, &authorities, now)
        .map_err(|e| AppError::Internal(format!("Failed to issue token: {}", e)))?;

    info!(
        "User '{}' logged in with {} roles, {} authorities",
        user.username,
        roles.len(),
        authorities.len()
    );

    Ok(LoginOutcome {
        username: user.username,
        roles,
        menus: tree,
        token,
    })
}
