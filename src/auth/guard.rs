//! Request authorization
//!
//! `AuthContext` is the request-scoped identity rebuilt from a validated token.
//! Protected handlers receive it explicitly and call `require` first thing.

use crate::auth::authority::{Authority, AuthoritySet};
use crate::auth::jwt::{Claims, TokenError, TokenService};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Authenticated identity for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    pub username: String,
    pub authorities: AuthoritySet,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthContext {
    /// Role names (without the `ROLE_` prefix) carried by the token
    pub fn role_names(&self) -> Vec<String> {
        self.authorities
            .iter()
            .filter_map(|a| a.as_str().strip_prefix(crate::auth::authority::ROLE_PREFIX))
            .map(str::to_string)
            .collect()
    }
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
            username: claims.sub,
            authorities: claims.authorities,
        }
    }
}

/// What a protected operation demands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Any valid token
    Authenticated,
    /// Exactly this authority must be present
    Authority(Authority),
    /// At least one of these must be present
    AnyOf(Vec<Authority>),
}

impl Requirement {
    pub fn role(name: &str) -> Self {
        Requirement::Authority(Authority::role(name))
    }

    pub fn any_role(names: &[&str]) -> Self {
        Requirement::AnyOf(names.iter().map(|n| Authority::role(n)).collect())
    }

    pub fn is_satisfied_by(&self, granted: &AuthoritySet) -> bool {
        match self {
            Requirement::Authenticated => true,
            Requirement::Authority(required) => granted.contains(required),
            Requirement::AnyOf(options) => options.iter().any(|a| granted.contains(a)),
        }
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Requirement::Authenticated => write!(f, "an authenticated principal"),
            Requirement::Authority(a) => write!(f, "{}", a),
            Requirement::AnyOf(options) => {
                let names: Vec<&str> = options.iter().map(|a| a.as_str()).collect();
                write!(f, "any of [{}]", names.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated(TokenError),
    Forbidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(AuthContext),
    Deny(DenyReason),
}

/// Validate `token` at `now` and check it against `requirement`
pub fn authorize(
    tokens: &TokenService,
    token: &str,
    requirement: &Requirement,
    now: DateTime<Utc>,
) -> Decision {
    let ctx = match tokens.validate(token, now) {
        Ok(claims) => AuthContext::from(claims),
        Err(e) => return Decision::Deny(DenyReason::Unauthenticated(e)),
    };

    if requirement.is_satisfied_by(&ctx.authorities) {
        Decision::Allow(ctx)
    } else {
        Decision::Deny(DenyReason::Forbidden)
    }
}

/// Guard for handlers that already hold an `AuthContext`
pub fn require(ctx: &AuthContext, requirement: &Requirement) -> Result<(), AppError> {
    if requirement.is_satisfied_by(&ctx.authorities) {
        return Ok(());
    }

    Err(AppError::Forbidden(format!("Requires {}", requirement)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn tokens() -> TokenService {
        TokenService::new(b"guard-test", Duration::minutes(30))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn manager_token(tokens: &TokenService) -> String {
        let authorities: AuthoritySet = [Authority::role("MANAGER")].into_iter().collect();
        tokens.issue("mia", &authorities, now()).unwrap().token
    }

    #[test]
    fn test_single_requirement_denies_other_role() {
        let tokens = tokens();
        let token = manager_token(&tokens);

        let decision = authorize(&tokens, &token, &Requirement::role("ADMIN"), now());

        assert_eq!(decision, Decision::Deny(DenyReason::Forbidden));
    }

    #[test]
    fn test_any_of_requirement_allows() {
        let tokens = tokens();
        let token = manager_token(&tokens);

        let decision = authorize(
            &tokens,
            &token,
            &Requirement::any_role(&["ADMIN", "MANAGER"]),
            now(),
        );

        match decision {
            Decision::Allow(ctx) => {
                assert_eq!(ctx.username, "mia");
                assert_eq!(ctx.role_names(), vec!["MANAGER".to_string()]);
            }
            other => panic!("expected allow, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_token_is_unauthenticated() {
        let tokens = tokens();

        let decision = authorize(&tokens, "garbage", &Requirement::role("ADMIN"), now());

        assert_eq!(
            decision,
            Decision::Deny(DenyReason::Unauthenticated(TokenError::Malformed))
        );
    }

    #[test]
    fn test_expired_token_is_unauthenticated() {
        let tokens = tokens();
        let token = manager_token(&tokens);

        let later = now() + Duration::minutes(31);
        let decision = authorize(&tokens, &token, &Requirement::role("MANAGER"), later);

        assert_eq!(
            decision,
            Decision::Deny(DenyReason::Unauthenticated(TokenError::Expired))
        );
    }

    #[test]
    fn test_decision_is_idempotent() {
        let tokens = tokens();
        let token = manager_token(&tokens);
        let requirement = Requirement::any_role(&["ADMIN", "MANAGER"]);

        let first = authorize(&tokens, &token, &requirement, now());
        let second = authorize(&tokens, &token, &requirement, now());

        assert!(matches!(first, Decision::Allow(_)));
        assert_eq!(first, second);
    }

    #[test]
    fn test_permission_requirement() {
        let tokens = tokens();
        let authorities: AuthoritySet = ["ROLE_USER", "user:list"]
            .into_iter()
            .map(Authority::from)
            .collect();
        let token = tokens.issue("bob", &authorities, now()).unwrap().token;

        let allowed = authorize(
            &tokens,
            &token,
            &Requirement::Authority(Authority::from("user:list")),
            now(),
        );
        let denied = authorize(
            &tokens,
            &token,
            &Requirement::Authority(Authority::from("user:delete")),
            now(),
        );

        assert!(matches!(allowed, Decision::Allow(_)));
        assert_eq!(denied, Decision::Deny(DenyReason::Forbidden));
    }

    #[test]
    fn test_require_guard() {
        let tokens = tokens();
        let claims = tokens.validate(&manager_token(&tokens), now()).unwrap();
        let ctx = AuthContext::from(claims);

        assert!(require(&ctx, &Requirement::any_role(&["ADMIN", "MANAGER"])).is_ok());
        assert!(matches!(
            require(&ctx, &Requirement::role("ADMIN")),
            Err(AppError::Forbidden(msg)) if msg.contains("ROLE_ADMIN")
        ));
    }

    #[test]
    fn test_authenticated_requirement() {
        let tokens = tokens();
        let token = tokens.issue("nobody", &AuthoritySet::new(), now()).unwrap().token;

        let decision = authorize(&tokens, &token, &Requirement::Authenticated, now());

        assert!(matches!(decision, Decision::Allow(ctx) if ctx.authorities.is_empty()));
    }

    #[test]
    fn test_empty_any_of_never_satisfied() {
        let granted: AuthoritySet = [Authority::role("ADMIN")].into_iter().collect();
        assert!(!Requirement::AnyOf(vec![]).is_satisfied_by(&granted));
    }
}
