//! TOML configuration for the gateway binary.
//!
//! Loaded from `--config <path>` when given, otherwise from the platform
//! config directory (`tutorhub/config.toml`); a missing default file just
//! means defaults.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::auth::password::BCRYPT_COST;
use crate::auth::DEFAULT_SESSION_TTL_SECS;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Location of the SQLite auth database. Defaults to `auth.db` in the
    /// platform data directory.
    pub db_path: Option<PathBuf>,
    /// Session lifetime in seconds; also the cookie Max-Age.
    pub session_ttl_secs: u64,
    /// bcrypt cost factor for new password hashes.
    pub bcrypt_cost: u32,
    /// Set the cookie Secure flag. Must be on behind TLS; off only for
    /// plain-HTTP development.
    pub cookie_secure: bool,
    /// Whether new account signup is allowed.
    pub allow_registration: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            bcrypt_cost: BCRYPT_COST,
            cookie_secure: false,
            allow_registration: true,
        }
    }
}

impl Config {
    /// Load configuration. An explicitly named file must exist and parse;
    /// the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_config_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "tutorhub").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Resolve the auth database path, creating its parent directory.
    pub fn resolve_db_path(&self) -> Result<PathBuf> {
        let path = match &self.auth.db_path {
            Some(p) => p.clone(),
            None => {
                let dirs = ProjectDirs::from("", "", "tutorhub")
                    .context("Could not determine a data directory for the auth database")?;
                dirs.data_dir().join("auth.db")
            }
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.gateway.port, 8000);
        assert_eq!(config.auth.session_ttl_secs, 3600);
        assert_eq!(config.auth.bcrypt_cost, BCRYPT_COST);
        assert!(!config.auth.cookie_secure);
        assert!(config.auth.allow_registration);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [gateway]
            port = 9100

            [auth]
            session_ttl_secs = 600
            cookie_secure = true
            "#,
        )
        .unwrap();

        assert_eq!(config.gateway.port, 9100);
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.auth.session_ttl_secs, 600);
        assert!(config.auth.cookie_secure);
        assert!(config.auth.allow_registration);
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.auth.session_ttl_secs, 3600);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn explicit_db_path_is_respected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let db = tmp.path().join("nested").join("auth.db");
        let config = Config {
            auth: AuthConfig {
                db_path: Some(db.clone()),
                ..Default::default()
            },
            ..Default::default()
        };

        let resolved = config.resolve_db_path().unwrap();
        assert_eq!(resolved, db);
        assert!(db.parent().unwrap().exists());
    }
}
