use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Top-level service configuration, built once at startup and passed down
/// explicitly. No component reads the process environment on its own.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: HttpConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// HTTP listen address (e.g., "127.0.0.1:3000")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Origin allowed by CORS for browser clients
    #[serde(default = "default_frontend_origin")]
    pub frontend_origin: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Path to the sled data directory
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HS256 signing secret. Required; there is no built-in default.
    pub jwt_secret: Option<String>,

    /// Token lifetime in days
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    /// API key; absent means the AI endpoints answer 503
    pub api_key: Option<String>,

    #[serde(default = "default_gemini_model")]
    pub model: String,

    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_frontend_origin() -> String {
    "http://localhost:5173".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./brainstash-data")
}

fn default_token_ttl_days() -> i64 {
    7
}

fn default_gemini_model() -> String {
    "gemini-pro".to_string()
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            frontend_origin: default_frontend_origin(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            endpoint: default_gemini_endpoint(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: HttpConfig::default(),
            storage: StorageConfig::default(),
            auth: AuthConfig {
                jwt_secret: None,
                token_ttl_days: default_token_ttl_days(),
            },
            gemini: GeminiConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - BRAINSTASH_LISTEN_ADDR: HTTP listen address (default: 127.0.0.1:3000)
    /// - BRAINSTASH_FRONTEND_ORIGIN / FRONTEND_URL: CORS origin
    /// - BRAINSTASH_DATA_DIR: sled data directory (default: ./brainstash-data)
    /// - BRAINSTASH_JWT_SECRET / JWT_SECRET: token signing secret (required)
    /// - BRAINSTASH_TOKEN_TTL_DAYS: token lifetime (default: 7)
    /// - GEMINI_API_KEY: generative-language API key
    /// - BRAINSTASH_GEMINI_MODEL: model name (default: gemini-pro)
    /// - BRAINSTASH_GEMINI_ENDPOINT: API base URL
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("BRAINSTASH_LISTEN_ADDR") {
            config.server.listen_addr = addr;
        }

        if let Ok(origin) = env_var_either("BRAINSTASH_FRONTEND_ORIGIN", "FRONTEND_URL") {
            config.server.frontend_origin = origin;
        }

        if let Ok(data_dir) = std::env::var("BRAINSTASH_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(secret) = env_var_either("BRAINSTASH_JWT_SECRET", "JWT_SECRET") {
            config.auth.jwt_secret = Some(secret);
        }

        if let Ok(ttl) = std::env::var("BRAINSTASH_TOKEN_TTL_DAYS") {
            if let Ok(val) = ttl.parse() {
                config.auth.token_ttl_days = val;
            }
        }

        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.gemini.api_key = Some(key);
        }

        if let Ok(model) = std::env::var("BRAINSTASH_GEMINI_MODEL") {
            config.gemini.model = model;
        }

        if let Ok(endpoint) = std::env::var("BRAINSTASH_GEMINI_ENDPOINT") {
            config.gemini.endpoint = endpoint;
        }

        config
    }

    /// Load configuration with priority: file > env > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = config_file {
            if path.exists() {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            } else {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
        } else {
            Self::default()
        };

        config = Self::merge_with_env(config);

        Ok(config)
    }

    /// Merge config with environment variables (env takes priority)
    fn merge_with_env(mut config: Self) -> Self {
        let env_config = Self::from_env();

        if std::env::var("BRAINSTASH_LISTEN_ADDR").is_ok() {
            config.server.listen_addr = env_config.server.listen_addr;
        }
        if env_var_either("BRAINSTASH_FRONTEND_ORIGIN", "FRONTEND_URL").is_ok() {
            config.server.frontend_origin = env_config.server.frontend_origin;
        }
        if std::env::var("BRAINSTASH_DATA_DIR").is_ok() {
            config.storage.data_dir = env_config.storage.data_dir;
        }
        if env_var_either("BRAINSTASH_JWT_SECRET", "JWT_SECRET").is_ok() {
            config.auth.jwt_secret = env_config.auth.jwt_secret;
        }
        if std::env::var("BRAINSTASH_TOKEN_TTL_DAYS").is_ok() {
            config.auth.token_ttl_days = env_config.auth.token_ttl_days;
        }
        if std::env::var("GEMINI_API_KEY").is_ok() {
            config.gemini.api_key = env_config.gemini.api_key;
        }
        if std::env::var("BRAINSTASH_GEMINI_MODEL").is_ok() {
            config.gemini.model = env_config.gemini.model;
        }
        if std::env::var("BRAINSTASH_GEMINI_ENDPOINT").is_ok() {
            config.gemini.endpoint = env_config.gemini.endpoint;
        }

        config
    }

    /// Parse listen address as SocketAddr
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(self.server.listen_addr.parse()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;

        match &self.auth.jwt_secret {
            None => anyhow::bail!(
                "No JWT secret configured; set BRAINSTASH_JWT_SECRET or auth.jwt_secret"
            ),
            Some(s) if s.is_empty() => anyhow::bail!("JWT secret must not be empty"),
            Some(_) => {}
        }

        if self.auth.token_ttl_days <= 0 {
            anyhow::bail!("Token TTL must be at least one day");
        }

        if self.gemini.api_key.is_none() {
            tracing::warn!("No Gemini API key configured; AI endpoints will answer 503");
        }

        if !self.storage.data_dir.exists() {
            std::fs::create_dir_all(&self.storage.data_dir)?;
        }

        Ok(())
    }
}

fn env_var_either(primary: &str, fallback: &str) -> Result<String, std::env::VarError> {
    std::env::var(primary).or_else(|_| std::env::var(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.listen_addr, "127.0.0.1:3000");
        assert_eq!(config.auth.token_ttl_days, 7);
        assert_eq!(config.gemini.model, "gemini-pro");
        assert!(config.auth.jwt_secret.is_none());
    }

    #[test]
    fn test_validate_requires_secret() {
        let config = AppConfig {
            storage: StorageConfig {
                data_dir: std::env::temp_dir().join("brainstash-config-test"),
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = config;
        config.auth.jwt_secret = Some("test-secret".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
            [server]
            listen_addr = "0.0.0.0:8080"

            [auth]
            jwt_secret = "s3cret"
            token_ttl_days = 1

            [gemini]
            model = "gemini-1.5-pro"
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.auth.jwt_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.auth.token_ttl_days, 1);
        assert_eq!(config.gemini.model, "gemini-1.5-pro");
        assert_eq!(config.storage.data_dir, PathBuf::from("./brainstash-data"));
    }
}
