//! Credential verification
//!
//! Checks a username/password pair against the stored hash and the account
//! status. Internally the failure kinds stay distinct for logging; the
//! conversion into `AppError` collapses them into one response.
//!
//! Every attempt runs exactly one hash verification, so an unknown or disabled
//! account costs the same time as a wrong password.

use crate::auth::password::hash_password;
use crate::error::AppError;
use crate::models::User;
use crate::repository::AccessRepository;
use thiserror::Error;
use tracing::error;

const DECOY_PASSWORD: &str = "decoy-password-never-matches";

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is disabled")]
    AccountDisabled,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::AccountDisabled => {
                AppError::InvalidCredentials
            }
            AuthError::Repository(inner) => inner,
        }
    }
}

/// bcrypt hash verified against when there is no real one to check.
///
/// Built once at startup with the same cost as stored hashes.
#[derive(Debug, Clone)]
pub struct DecoyHash(String);

impl DecoyHash {
    pub fn new(cost: u32) -> Result<Self, AppError> {
        Ok(Self(hash_password(DECOY_PASSWORD, cost)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Verify a username/password pair, returning the stored user on success
pub fn verify_credentials(
    repository: &dyn AccessRepository,
    decoy: &DecoyHash,
    username: &str,
    password: &str,
) -> Result<User, AuthError> {
    let Some(user) = repository.find_user_by_username(username)? else {
        check_password(repository, password, decoy.as_str());
        return Err(AuthError::InvalidCredentials);
    };

    if !user.is_active() {
        check_password(repository, password, decoy.as_str());
        return Err(AuthError::AccountDisabled);
    }

    if !check_password(repository, password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }

    Ok(user)
}

// A corrupt stored hash must look like a wrong password to the caller.
fn check_password(repository: &dyn AccessRepository, password: &str, hash: &str) -> bool {
    repository
        .verify_password(password, hash)
        .unwrap_or_else(|e| {
            error!("Password verification failed: {}", e);
            false
        })
}
