//! Service configuration
//!
//! Layering, lowest to highest priority:
//! 1. built-in defaults
//! 2. YAML file (`--config`, else `config/moviesrv.yaml` when present)
//! 3. `MOVIESRV_` environment variables, `__` separating sections
//!    (e.g. `MOVIESRV_JWT__KEY`, `MOVIESRV_API__PORT`)

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{MovieSrvError, Result};

pub const SERVICE_NAME: &str = "moviesrv";
pub const DEFAULT_PORT: u16 = 6080;
pub const DEFAULT_CONFIG_PATH: &str = "config/moviesrv.yaml";
pub const ENV_PREFIX: &str = "MOVIESRV_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MoviesrvConfig {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub logging: LoggingConfig,
    pub password: PasswordPolicy,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/movies.db".to_string(),
        }
    }
}

/// Token signing settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// HMAC secret. Must be set; startup aborts when empty.
    pub key: String,
    pub issuer: String,
    pub audience: String,
    pub expiration_in_days: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            issuer: "MarqueeApi".to_string(),
            audience: "MarqueeApiUser".to_string(),
            expiration_in_days: 30,
        }
    }
}

// Keep the secret out of debug output
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("key", &if self.key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiration_in_days", &self.expiration_in_days)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: String,
    pub enable_api_log: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
            enable_api_log: true,
        }
    }
}

/// Password rules applied when an identity is created
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    pub required_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
    pub required_unique_chars: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            required_length: 6,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
            required_unique_chars: 1,
        }
    }
}

/// Poster upload limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Lower-case extensions including the dot
    pub allowed_extensions: Vec<String>,
    pub max_poster_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: vec![".jpg".into(), ".png".into(), ".jpeg".into()],
            max_poster_bytes: 2 * 1024 * 1024,
        }
    }
}

impl MoviesrvConfig {
    /// Load from defaults, YAML and environment
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(MovieSrvError::config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                figment = figment.merge(Yaml::file(path));
            },
            None => {
                if Path::new(DEFAULT_CONFIG_PATH).exists() {
                    figment = figment.merge(Yaml::file(DEFAULT_CONFIG_PATH));
                } else {
                    tracing::debug!("{} not found, using defaults", DEFAULT_CONFIG_PATH);
                }
            },
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        Ok(figment.extract()?)
    }

    /// Fail fast on settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.jwt.key.trim().is_empty() {
            return Err(MovieSrvError::missing_config("jwt.key"));
        }
        crate::auth::token::lifetime_seconds(self.jwt.expiration_in_days)?;
        if self.api.port == 0 {
            return Err(MovieSrvError::config("api.port must not be 0"));
        }
        if self.database.path.trim().is_empty() {
            return Err(MovieSrvError::missing_config("database.path"));
        }
        if self.upload.max_poster_bytes == 0 {
            return Err(MovieSrvError::config("upload.max_poster_bytes must not be 0"));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.logging.dir)
    }
}
