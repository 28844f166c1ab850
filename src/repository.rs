//! Repository gateway
//!
//! The read contract the authentication core needs from storage, plus an
//! in-memory implementation. Rows live in id-keyed maps and relations in
//! separate tables; views such as "menus reachable by this user" are
//! assembled per call.

use crate::auth::password;
use crate::error::AppError;
use crate::menu::Menu;
use crate::models::{Role, RoleGrant, User, UserGrants};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Read-only access to users, roles and menus
pub trait AccessRepository: Send + Sync {
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// The user's role assignments with each role's menus, statuses untouched
    fn find_user_grants(&self, user_id: i64) -> Result<Option<UserGrants>, AppError>;

    /// Distinct active menus reachable through the user's active roles
    fn find_menus_authorized_for(&self, username: &str) -> Result<Vec<Menu>, AppError>;

    fn find_active_roles(&self) -> Result<Vec<Role>, AppError>;

    fn verify_password(&self, plaintext: &str, stored_hash: &str) -> Result<bool, AppError> {
        password::verify_password(plaintext, stored_hash)
    }
}

/// In-memory snapshot built once at startup and read without locking
#[derive(Debug, Default)]
pub struct MemoryRepository {
    users: HashMap<i64, User>,
    username_index: HashMap<String, i64>,
    roles: HashMap<i64, Role>,
    menus: HashMap<i64, Menu>,
    user_roles: BTreeSet<(i64, i64)>,
    role_menus: BTreeSet<(i64, i64)>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user; fails if the username or id is taken
    pub fn insert_user(&mut self, user: User) -> Result<(), AppError> {
        if self.username_index.contains_key(&user.username) {
            return Err(AppError::BadRequest(format!(
                "Username '{}' already exists",
                user.username
            )));
        }
        if self.users.contains_key(&user.id) {
            return Err(AppError::BadRequest(format!("User id {} already exists", user.id)));
        }

        self.username_index.insert(user.username.clone(), user.id);
        self.users.insert(user.id, user);
        Ok(())
    }

    /// Insert a role; role names are unique
    pub fn insert_role(&mut self, role: Role) -> Result<(), AppError> {
        if self.roles.values().any(|r| r.name == role.name) {
            return Err(AppError::BadRequest(format!(
                "Role '{}' already exists",
                role.name
            )));
        }
        if self.roles.contains_key(&role.id) {
            return Err(AppError::BadRequest(format!("Role id {} already exists", role.id)));
        }

        self.roles.insert(role.id, role);
        Ok(())
    }

    pub fn insert_menu(&mut self, menu: Menu) -> Result<(), AppError> {
        if self.menus.contains_key(&menu.id) {
            return Err(AppError::BadRequest(format!("Menu id {} already exists", menu.id)));
        }

        self.menus.insert(menu.id, menu);
        Ok(())
    }

    /// Assign a role to a user. Assigning twice is a no-op.
    pub fn assign_role(&mut self, user_id: i64, role_id: i64) -> Result<(), AppError> {
        if !self.users.contains_key(&user_id) {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }
        if !self.roles.contains_key(&role_id) {
            return Err(AppError::NotFound(format!("Role {} not found", role_id)));
        }

        self.user_roles.insert((user_id, role_id));
        Ok(())
    }

    /// Assign a menu to a role. Assigning twice is a no-op.
    pub fn assign_menu(&mut self, role_id: i64, menu_id: i64) -> Result<(), AppError> {
        if !self.roles.contains_key(&role_id) {
            return Err(AppError::NotFound(format!("Role {} not found", role_id)));
        }
        if !self.menus.contains_key(&menu_id) {
            return Err(AppError::NotFound(format!("Menu {} not found", menu_id)));
        }

        self.role_menus.insert((role_id, menu_id));
        Ok(())
    }

    pub fn find_role_by_name(&self, name: &str) -> Option<&Role> {
        self.roles.values().find(|r| r.name == name)
    }

    fn role_ids_of(&self, user_id: i64) -> impl Iterator<Item = i64> + '_ {
        self.user_roles
            .range((user_id, i64::MIN)..=(user_id, i64::MAX))
            .map(|(_, role_id)| *role_id)
    }

    fn menus_of(&self, role_id: i64) -> impl Iterator<Item = &Menu> + '_ {
        self.role_menus
            .range((role_id, i64::MIN)..=(role_id, i64::MAX))
            .filter_map(|(_, menu_id)| self.menus.get(menu_id))
    }
}

impl AccessRepository for MemoryRepository {
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .username_index
            .get(username)
            .and_then(|id| self.users.get(id))
            .cloned())
    }

    fn find_user_grants(&self, user_id: i64) -> Result<Option<UserGrants>, AppError> {
        let Some(user) = self.users.get(&user_id) else {
            return Ok(None);
        };

        let roles = self
            .role_ids_of(user_id)
            .filter_map(|role_id| self.roles.get(&role_id))
            .map(|role| RoleGrant {
                role: role.clone(),
                menus: self.menus_of(role.id).cloned().collect(),
            })
            .collect();

        Ok(Some(UserGrants {
            user: user.clone(),
            roles,
        }))
    }

    fn find_menus_authorized_for(&self, username: &str) -> Result<Vec<Menu>, AppError> {
        let Some(&user_id) = self.username_index.get(username) else {
            return Ok(Vec::new());
        };

        let mut menu_ids = BTreeSet::new();
        for role_id in self.role_ids_of(user_id) {
            let active = self.roles.get(&role_id).is_some_and(|r| r.is_active());
            if !active {
                continue;
            }
            menu_ids.extend(
                self.menus_of(role_id)
                    .filter(|m| m.is_active())
                    .map(|m| m.id),
            );
        }

        let mut menus: Vec<Menu> = menu_ids
            .iter()
            .filter_map(|id| self.menus.get(id))
            .cloned()
            .collect();
        menus.sort_by_key(|m| (m.parent_id, m.sort_order, m.id));

        debug!("Resolved {} menus for {}", menus.len(), username);
        Ok(menus)
    }

    fn find_active_roles(&self) -> Result<Vec<Role>, AppError> {
        let mut roles: Vec<Role> = self
            .roles
            .values()
            .filter(|r| r.is_active())
            .cloned()
            .collect();
        roles.sort_by_key(|r| r.id);
        Ok(roles)
    }
}
