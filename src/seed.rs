//! Access snapshot loading
//!
//! Reads users, roles and menus from a seed file (or the built-in default)
//! and builds the in-memory repository from it.

use crate::auth::password::hash_password;
use crate::error::AppError;
use crate::menu::Menu;
use crate::models::{Role, Status, User};
use crate::repository::MemoryRepository;
use ::config::{Config, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

const DEFAULT_SEED: &str = include_str!("../seed/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub id: i64,
    pub username: String,
    /// Plaintext, hashed at load time
    #[serde(default)]
    pub password: Option<String>,
    /// Pre-computed bcrypt hash; wins over `password`
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub status: Status,
    /// Role names
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedRole {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Status,
    /// Menu ids
    #[serde(default)]
    pub menus: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub roles: Vec<SeedRole>,
    #[serde(default)]
    pub menus: Vec<Menu>,
}

impl SeedData {
    /// The snapshot compiled into the binary
    pub fn builtin() -> Result<Self, AppError> {
        Self::from_config(
            Config::builder()
                .add_source(File::from_str(DEFAULT_SEED, FileFormat::Toml))
                .build(),
        )
    }

    /// Load a seed file; the format follows the file extension
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        Self::from_config(
            Config::builder()
                .add_source(File::from(path).required(true))
                .build(),
        )
    }

    #[cfg(test)]
    pub fn from_toml_str(source: &str) -> Result<Self, AppError> {
        Self::from_config(
            Config::builder()
                .add_source(File::from_str(source, FileFormat::Toml))
                .build(),
        )
    }

    fn from_config(built: Result<Config, ::config::ConfigError>) -> Result<Self, AppError> {
        built
            .and_then(|c| c.try_deserialize::<SeedData>())
            .map_err(|e| AppError::Config(format!("Invalid seed data: {}", e)))
    }

    /// Build the repository, hashing plaintext passwords at `bcrypt_cost`.
    ///
    /// References to unknown roles or menus are configuration errors.
    pub fn into_repository(self, bcrypt_cost: u32) -> Result<MemoryRepository, AppError> {
        let mut repo = MemoryRepository::new();

        for menu in self.menus {
            repo.insert_menu(menu).map_err(as_config)?;
        }

        for seed in &self.roles {
            repo.insert_role(Role {
                id: seed.id,
                name: seed.name.clone(),
                description: seed.description.clone(),
                status: seed.status,
            })
            .map_err(as_config)?;

            for menu_id in &seed.menus {
                repo.assign_menu(seed.id, *menu_id).map_err(as_config)?;
            }
        }

        for seed in self.users {
            let password_hash = match (seed.password_hash, seed.password) {
                (Some(hash), _) => hash,
                (None, Some(plain)) => hash_password(&plain, bcrypt_cost)?,
                (None, None) => {
                    return Err(AppError::Config(format!(
                        "User '{}' has neither password nor password_hash",
                        seed.username
                    )))
                }
            };

            repo.insert_user(User {
                id: seed.id,
                username: seed.username.clone(),
                password_hash,
                status: seed.status,
            })
            .map_err(as_config)?;

            for role_name in &seed.roles {
                let role_id = repo
                    .find_role_by_name(role_name)
                    .map(|r| r.id)
                    .ok_or_else(|| {
                        AppError::Config(format!(
                            "User '{}' references unknown role '{}'",
                            seed.username, role_name
                        ))
                    })?;
                repo.assign_role(seed.id, role_id).map_err(as_config)?;
            }
        }

        info!("Access snapshot loaded");
        Ok(repo)
    }
}

fn as_config(err: AppError) -> AppError {
    AppError::Config(err.to_string())
}
