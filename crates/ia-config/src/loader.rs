//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError, StoreBackend};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "access-admin.toml",
    "./config/config.toml",
    "/etc/access-admin/config.toml",
];

/// Environment variable naming an explicit config file
const CONFIG_PATH_ENV: &str = "ACCESS_ADMIN_CONFIG";

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable
    /// overrides, then validate it.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, |key| env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `ACCESS_ADMIN_*` overrides using `lookup` to read variables.
/// Unparseable values are ignored with a warning.
pub(crate) fn apply_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    // HTTP
    if let Some(val) = lookup("ACCESS_ADMIN_HTTP_PORT") {
        match val.parse() {
            Ok(port) => config.http.port = port,
            Err(_) => warn!(value = %val, "Ignoring invalid ACCESS_ADMIN_HTTP_PORT"),
        }
    }
    if let Some(val) = lookup("ACCESS_ADMIN_HTTP_HOST") {
        config.http.host = val;
    }
    if let Some(val) = lookup("ACCESS_ADMIN_CORS_ORIGINS") {
        config.http.cors_origins = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    // Store
    if let Some(val) = lookup("ACCESS_ADMIN_STORE_BACKEND") {
        match val.parse::<StoreBackend>() {
            Ok(backend) => config.store.backend = backend,
            Err(e) => warn!(error = %e, "Ignoring ACCESS_ADMIN_STORE_BACKEND"),
        }
    }

    // MongoDB
    if let Some(val) = lookup("ACCESS_ADMIN_MONGODB_URI") {
        config.mongodb.uri = val;
    }
    if let Some(val) = lookup("ACCESS_ADMIN_MONGODB_DATABASE") {
        config.mongodb.database = val;
    }

    // Access
    if let Some(val) = lookup("ACCESS_ADMIN_OPERATION_TIMEOUT_MS") {
        match val.parse() {
            Ok(ms) => config.access.operation_timeout_ms = ms,
            Err(_) => warn!(value = %val, "Ignoring invalid ACCESS_ADMIN_OPERATION_TIMEOUT_MS"),
        }
    }

    // General
    if let Some(val) = lookup("ACCESS_ADMIN_DEV_MODE") {
        config.dev_mode = val == "1" || val.eq_ignore_ascii_case("true");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_overrides_applied() {
        let mut config = AppConfig::default();
        apply_overrides(
            &mut config,
            lookup_from(&[
                ("ACCESS_ADMIN_HTTP_PORT", "9191"),
                ("ACCESS_ADMIN_CORS_ORIGINS", "http://a.local, http://b.local,"),
                ("ACCESS_ADMIN_STORE_BACKEND", "mongodb"),
                ("ACCESS_ADMIN_MONGODB_DATABASE", "iam"),
                ("ACCESS_ADMIN_OPERATION_TIMEOUT_MS", "250"),
                ("ACCESS_ADMIN_DEV_MODE", "true"),
            ]),
        );

        assert_eq!(config.http.port, 9191);
        assert_eq!(config.http.cors_origins, vec!["http://a.local", "http://b.local"]);
        assert_eq!(config.store.backend, StoreBackend::Mongodb);
        assert_eq!(config.mongodb.database, "iam");
        assert_eq!(config.access.operation_timeout_ms, 250);
        assert!(config.dev_mode);
    }

    #[test]
    fn test_invalid_overrides_ignored() {
        let mut config = AppConfig::default();
        apply_overrides(
            &mut config,
            lookup_from(&[
                ("ACCESS_ADMIN_HTTP_PORT", "not-a-port"),
                ("ACCESS_ADMIN_STORE_BACKEND", "cassandra"),
                ("ACCESS_ADMIN_DEV_MODE", "nope"),
            ]),
        );

        assert_eq!(config.http.port, 8080);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(!config.dev_mode);
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dev_mode = true\n\n[access]\noperation_timeout_ms = 0").unwrap();

        let config = ConfigLoader::with_path(file.path()).load().unwrap();
        assert!(config.dev_mode);
        assert_eq!(config.access.operation_timeout_ms, 0);
    }
}
