//! Data models
//!
//! Rows read from the repository gateway and the per-request views built from
//! them. Relations are carried as ids; nothing here holds a live reference to
//! another row.

use crate::menu::Menu;
use serde::{Deserialize, Serialize};

/// Lifecycle status shared by users, roles and menus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Disabled,
}

impl Status {
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Active)
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Active
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Active => write!(f, "active"),
            Status::Disabled => write!(f, "disabled"),
        }
    }
}

/// User model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub status: Status,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Role model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: Status,
}

impl Role {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// A role together with the menus assigned to it
#[derive(Debug, Clone)]
pub struct RoleGrant {
    pub role: Role,
    pub menus: Vec<Menu>,
}

/// Materialized view of one user's role and menu assignments.
///
/// Built by the repository per request; statuses are left untouched so the
/// authority resolver can apply its own filtering.
#[derive(Debug, Clone)]
pub struct UserGrants {
    pub user: User,
    pub roles: Vec<RoleGrant>,
}

impl UserGrants {
    /// Names of the active roles, sorted
    pub fn active_role_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .roles
            .iter()
            .filter(|grant| grant.role.is_active())
            .map(|grant| grant.role.name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
