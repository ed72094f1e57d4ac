//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Store address. The one variable every deployment sets.
pub const ENV_STORE_ADDRESS: &str = "REDIS_URL";
pub const ENV_STORE_PASSWORD: &str = "REDIS_PASSWORD";
pub const ENV_STORE_DB: &str = "REDIS_DB";
pub const ENV_BIND_ADDRESS: &str = "RECORDS_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value in {var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let config = read_config_file(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

impl ServiceConfig {
    /// Build the runtime configuration: defaults, then the optional file,
    /// then process environment overrides. Validated last.
    pub fn from_env_and_file(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => read_config_file(path)?,
            None => ServiceConfig::default(),
        };
        let config = apply_env_overrides(config, |var| std::env::var(var).ok())?;
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

/// Apply environment overrides using `lookup` to resolve variables.
pub fn apply_env_overrides<F>(mut config: ServiceConfig, lookup: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    if let Some(address) = non_empty(ENV_STORE_ADDRESS) {
        config.store.address = address;
    }
    if let Some(password) = non_empty(ENV_STORE_PASSWORD) {
        config.store.password = Some(password);
    }
    if let Some(db) = non_empty(ENV_STORE_DB) {
        config.store.db = db.trim().parse().map_err(|e| ConfigError::Env {
            var: ENV_STORE_DB,
            reason: format!("'{}' is not an integer: {}", db, e),
        })?;
    }
    if let Some(bind) = non_empty(ENV_BIND_ADDRESS) {
        config.listener.bind_address = bind;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_env_overrides_store_address() {
        let config = apply_env_overrides(
            ServiceConfig::default(),
            env(&[(ENV_STORE_ADDRESS, "cache.internal:6380")]),
        )
        .unwrap();
        assert_eq!(config.store.address, "cache.internal:6380");
        assert_eq!(config.store.password, None);
        assert_eq!(config.store.db, 0);
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let config =
            apply_env_overrides(ServiceConfig::default(), env(&[(ENV_STORE_ADDRESS, "  ")])).unwrap();
        assert_eq!(config.store.address, "localhost:6379");
    }

    #[test]
    fn test_bad_db_index_is_rejected() {
        let err = apply_env_overrides(ServiceConfig::default(), env(&[(ENV_STORE_DB, "zero")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: ENV_STORE_DB, .. }));
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[listener]
bind_address = "127.0.0.1:8000"

[store]
key_prefix = "hello:"
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8000");
        assert_eq!(config.store.key_prefix, "hello:");
        assert_eq!(config.store.connect_timeout_secs, 5);
        assert_eq!(config.listener.max_body_bytes, 1024 * 1024);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\nkey_prefix = \"\"").unwrap();

        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "store.key_prefix");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_log_format_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[observability]\nlog_format = \"xml\"").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }
}
