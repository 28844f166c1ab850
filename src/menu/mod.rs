//! Menu model and navigation tree
//!
//! A menu row is either a navigation entry or a button-level permission
//! marker. The tree builder turns a flat, already filtered row set into the
//! structure handed to the client at login.

mod tree;

pub use tree::build_tree;

use crate::models::Status;
use serde::{Deserialize, Serialize};

/// Parent id that marks a root menu
pub const ROOT_PARENT_ID: i64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuType {
    Menu,
    Button,
}

impl Default for MenuType {
    fn default() -> Self {
        MenuType::Menu
    }
}

/// Menu model, as stored (snake_case keys in seed files)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub parent_id: i64,
    #[serde(default)]
    pub sort_order: i32,
    /// Capability identifier; `None` for pure navigation entries
    #[serde(default)]
    pub permission: Option<String>,
    #[serde(default)]
    pub menu_type: MenuType,
    #[serde(default)]
    pub status: Status,
}

impl Menu {
    pub fn is_root(&self) -> bool {
        self.parent_id == ROOT_PARENT_ID
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// The permission string, if present and non-empty
    pub fn granted_permission(&self) -> Option<&str> {
        self.permission.as_deref().filter(|p| !p.is_empty())
    }
}

/// One entry in the navigation forest returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    pub id: i64,
    pub name: String,
    pub path: Option<String>,
    pub component: Option<String>,
    pub icon: Option<String>,
    pub parent_id: i64,
    pub sort_order: i32,
    pub permission: Option<String>,
    pub menu_type: MenuType,
    /// Populated on roots only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<MenuNode>>,
}

impl From<&Menu> for MenuNode {
    fn from(menu: &Menu) -> Self {
        Self {
            id: menu.id,
            name: menu.name.clone(),
            path: menu.path.clone(),
            component: menu.component.clone(),
            icon: menu.icon.clone(),
            parent_id: menu.parent_id,
            sort_order: menu.sort_order,
            permission: menu.permission.clone(),
            menu_type: menu.menu_type,
            children: None,
        }
    }
}
