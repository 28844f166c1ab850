//! Application state management
//!
//! Contains shared state accessible across all handlers. Everything in here is
//! read-only after startup, so no locking is involved.

use crate::auth::{DecoyHash, TokenService};
use crate::repository::AccessRepository;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// User/role/menu snapshot
    pub repository: Arc<dyn AccessRepository>,

    /// Token signer/validator holding the process-wide key
    pub tokens: TokenService,

    /// Hash checked on login attempts that have no stored hash to check
    pub decoy: DecoyHash,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn AccessRepository>,
        tokens: TokenService,
        decoy: DecoyHash,
    ) -> Self {
        Self {
            repository,
            tokens,
            decoy,
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
