//! Authority resolution
//!
//! Flattens a user's roles and each role's menus into one set of authority
//! tokens: `ROLE_<name>` markers plus the menus' permission strings.

use crate::models::UserGrants;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Prefix that turns a role name into a role authority
pub const ROLE_PREFIX: &str = "ROLE_";

/// One grantable capability.
///
/// Authorities are opaque strings at this layer; a role marker and a menu
/// permission compare the same way.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authority(String);

impl Authority {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Role marker, e.g. `ROLE_ADMIN` for role `ADMIN`
    pub fn role(name: &str) -> Self {
        Self(format!("{}{}", ROLE_PREFIX, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Authority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Authority {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Authority set; ordered so serialized claims are deterministic
pub type AuthoritySet = BTreeSet<Authority>;

/// Resolve the effective authorities of a user.
///
/// Disabled roles contribute nothing. Within active roles, disabled menus and
/// menus without a permission are skipped.
pub fn resolve_authorities(grants: &UserGrants) -> AuthoritySet {
    let mut authorities = AuthoritySet::new();

    for grant in grants.roles.iter().filter(|g| g.role.is_active()) {
        authorities.insert(Authority::role(&grant.role.name));

        for menu in grant.menus.iter().filter(|m| m.is_active()) {
            if let Some(permission) = menu.granted_permission() {
                authorities.insert(Authority::new(permission));
            }
        }
    }

    authorities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{Menu, MenuType};
    use crate::models::{Role, RoleGrant, Status, User};
    use pretty_assertions::assert_eq;

    fn user() -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            password_hash: String::new(),
            status: Status::Active,
        }
    }

    fn role(id: i64, name: &str, status: Status) -> Role {
        Role {
            id,
            name: name.to_string(),
            description: None,
            status,
        }
    }

    fn menu(id: i64, permission: Option<&str>, status: Status) -> Menu {
        Menu {
            id,
            name: format!("menu-{}", id),
            path: None,
            component: None,
            icon: None,
            parent_id: 0,
            sort_order: 0,
            permission: permission.map(str::to_string),
            menu_type: MenuType::Button,
            status,
        }
    }

    fn set(items: &[&str]) -> AuthoritySet {
        items.iter().map(|s| Authority::from(*s)).collect()
    }

    #[test]
    fn test_roles_and_permissions_flattened() {
        let grants = UserGrants {
            user: user(),
            roles: vec![
                RoleGrant {
                    role: role(1, "ADMIN", Status::Active),
                    menus: vec![
                        menu(1, Some("user:list"), Status::Active),
                        menu(2, Some("user:create"), Status::Active),
                    ],
                },
                RoleGrant {
                    role: role(2, "MANAGER", Status::Active),
                    menus: vec![menu(1, Some("user:list"), Status::Active)],
                },
            ],
        };

        assert_eq!(
            resolve_authorities(&grants),
            set(&["ROLE_ADMIN", "ROLE_MANAGER", "user:create", "user:list"])
        );
    }

    #[test]
    fn test_disabled_role_contributes_nothing() {
        let grants = UserGrants {
            user: user(),
            roles: vec![
                RoleGrant {
                    role: role(1, "ADMIN", Status::Disabled),
                    menus: vec![menu(1, Some("user:delete"), Status::Active)],
                },
                RoleGrant {
                    role: role(2, "USER", Status::Active),
                    menus: vec![],
                },
            ],
        };

        assert_eq!(resolve_authorities(&grants), set(&["ROLE_USER"]));
    }

    #[test]
    fn test_disabled_and_blank_menus_skipped() {
        let grants = UserGrants {
            user: user(),
            roles: vec![RoleGrant {
                role: role(1, "USER", Status::Active),
                menus: vec![
                    menu(1, Some("report:view"), Status::Disabled),
                    menu(2, Some(""), Status::Active),
                    menu(3, None, Status::Active),
                    menu(4, Some("profile:view"), Status::Active),
                ],
            }],
        };

        assert_eq!(
            resolve_authorities(&grants),
            set(&["ROLE_USER", "profile:view"])
        );
    }

    #[test]
    fn test_duplicate_role_assignment_is_idempotent() {
        let once = UserGrants {
            user: user(),
            roles: vec![RoleGrant {
                role: role(1, "ADMIN", Status::Active),
                menus: vec![menu(1, Some("user:list"), Status::Active)],
            }],
        };
        let mut twice = once.clone();
        twice.roles.push(once.roles[0].clone());

        assert_eq!(resolve_authorities(&once), resolve_authorities(&twice));
    }

    #[test]
    fn test_no_roles_no_authorities() {
        let grants = UserGrants {
            user: user(),
            roles: vec![],
        };
        assert!(resolve_authorities(&grants).is_empty());
    }

    #[test]
    fn test_role_authority_format() {
        let authority = Authority::role("ADMIN");
        assert_eq!(authority.as_str(), "ROLE_ADMIN");
        assert_eq!(authority.to_string(), "ROLE_ADMIN");
    }
}
