use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    default_cors_origins, DEFAULT_ADMIN_SECRET, DEFAULT_BIND_ADDR, DEFAULT_CONFIG_PATH,
    DEFAULT_DATABASE_PATH, DEFAULT_LOG_DIR, DEFAULT_LOG_FILE, DEFAULT_METRICS_ADDR, DEFAULT_PORT,
};
use crate::error::{CatalogError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub in_memory: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub file_name: String,
    pub json_file: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Listen address of the Prometheus exporter
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            cors_origins: default_cors_origins(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
            in_memory: false,
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_ADMIN_SECRET.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            file_name: DEFAULT_LOG_FILE.to_string(),
            json_file: true,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            addr: DEFAULT_METRICS_ADDR.to_string(),
        }
    }
}

impl Config {
    /// Load defaults, then the TOML file, then environment overrides.
    ///
    /// An explicit `path` must exist; without one, `catalog.toml` is read only if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CatalogError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides through `lookup`. Empty values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(secret) = get("ADMIN_SECRET") {
            self.admin.secret = secret;
        }
        if let Some(path) = get("CATALOG_DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(addr) = get("CATALOG_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(port) = get("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| CatalogError::Config(format!("Invalid PORT value '{port}'")))?;
        }
        if let Some(origins) = get("CATALOG_CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(dir) = get("CATALOG_LOG_DIR") {
            self.logging.dir = PathBuf::from(dir);
        }
        if let Some(addr) = get("CATALOG_METRICS_ADDR") {
            self.metrics.addr = addr;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.admin.secret, "admin1234");
        assert_eq!(config.server.cors_origins.len(), 5);
        assert!(!config.database.in_memory);
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.addr, "127.0.0.1:9898");
    }

    #[test]
    fn test_metrics_section_and_env() {
        let mut config = Config::from_toml_str("[metrics]\nenabled = false").unwrap();
        assert!(!config.metrics.enabled);
        config
            .apply_env(env(&[("CATALOG_METRICS_ADDR", "0.0.0.0:9100")]))
            .unwrap();
        assert_eq!(config.metrics.addr, "0.0.0.0:9100");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [server]
            port = 9000

            [database]
            path = "data/quiz.db"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.database.path, PathBuf::from("data/quiz.db"));
        assert_eq!(config.admin.secret, "admin1234");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::from_toml_str("[server]\nport = \"high\"").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::from_toml_str("[admin]\nsecret = \"from-file\"").unwrap();
        config
            .apply_env(env(&[
                ("ADMIN_SECRET", "from-env"),
                ("PORT", "3000"),
                ("CATALOG_CORS_ORIGINS", "http://a.test, http://b.test,"),
            ]))
            .unwrap();
        assert_eq!(config.admin.secret, "from-env");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[("ADMIN_SECRET", "")])).unwrap();
        assert_eq!(config.admin.secret, "admin1234");
    }

    #[test]
    fn test_invalid_port_env() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }
}
