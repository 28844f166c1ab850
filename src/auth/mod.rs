//! Authentication and authorization module
//!
//! Credential checks, authority resolution, bearer tokens and request guards.

pub mod authority;
pub mod credentials;
pub mod guard;
pub mod jwt;
pub mod login;
mod middleware;
pub mod password;

pub use authority::resolve_authorities;
pub use credentials::DecoyHash;
pub use guard::{require, AuthContext, Requirement};
pub use jwt::{TokenService, TOKEN_TYPE};
pub use login::{login, LoginOutcome};
pub use middleware::auth_middleware;

/// Role names used by the built-in route guards
pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_MANAGER: &str = "MANAGER";
