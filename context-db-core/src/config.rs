use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;

/// Prefix for environment overrides, e.g. `CONTEXT_DB__DATABASE__URL`.
pub const ENV_PREFIX: &str = "CONTEXT_DB";

#[derive(Debug, Deserialize, Clone)]
pub struct ContextConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_seconds")]
    pub acquire_timeout_seconds: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_seconds() -> u64 {
    30
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            acquire_timeout_seconds: default_acquire_timeout_seconds(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn env_overlay(vars: Map<String, String>) -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .source(Some(vars))
}

impl ContextConfig {
    /// Load from a TOML file, with `CONTEXT_DB__*` environment variables layered on top.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .add_source(env_overlay(std::env::vars().collect()))
            .build()?;
        s.try_deserialize()
    }

    /// Build from the process environment alone. `DATABASE_URL` is accepted
    /// as a fallback for `CONTEXT_DB__DATABASE__URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_vars(std::env::vars())
    }

    /// Same as [`from_env`](ContextConfig::from_env) over an explicit set of variables.
    pub fn from_env_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Map<String, String> = vars.into_iter().collect();
        let mut builder = Config::builder();
        if let Some(url) = vars.get("DATABASE_URL") {
            builder = builder.set_default("database.url", url.as_str())?;
        }
        let s = builder.add_source(env_overlay(vars)).build()?;
        s.try_deserialize()
    }

    pub fn with_database_url(url: impl Into<String>) -> Self {
        Self {
            database: DatabaseConfig::new(url),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("create temp config");
        file.write_all(contents.as_bytes()).expect("write temp config");
        file
    }

    #[test]
    fn test_load_full_file() {
        let file = write_toml(
            r#"
            [database]
            url = "postgresql://ctx:ctx@db:5432/ctx"
            max_connections = 12
            acquire_timeout_seconds = 3

            [logging]
            level = "debug"
            "#,
        );

        let config = ContextConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.database.url, "postgresql://ctx:ctx@db:5432/ctx");
        assert_eq!(config.database.max_connections, 12);
        assert_eq!(config.database.acquire_timeout_seconds, 3);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_applies_defaults() {
        let file = write_toml(
            r#"
            [database]
            url = "postgresql://localhost/ctx"
            "#,
        );

        let config = ContextConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.acquire_timeout_seconds, 30);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_missing_file_errors() {
        let result = ContextConfig::load("/nonexistent/context-db.toml");
        assert!(result.is_err());
    }

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_env_uses_database_url() {
        let config =
            ContextConfig::from_env_vars(vars(&[("DATABASE_URL", "postgresql://fallback/ctx")]))
                .unwrap();
        assert_eq!(config.database.url, "postgresql://fallback/ctx");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_prefixed_url_beats_database_url() {
        let config = ContextConfig::from_env_vars(vars(&[
            ("DATABASE_URL", "postgresql://fallback/ctx"),
            ("CONTEXT_DB__DATABASE__URL", "postgresql://preferred/ctx"),
        ]))
        .unwrap();
        assert_eq!(config.database.url, "postgresql://preferred/ctx");
    }

    #[test]
    fn test_prefixed_max_connections_parsed() {
        let config = ContextConfig::from_env_vars(vars(&[
            ("DATABASE_URL", "postgresql://fallback/ctx"),
            ("CONTEXT_DB__DATABASE__MAX_CONNECTIONS", "9"),
        ]))
        .unwrap();
        assert_eq!(config.database.max_connections, 9);
    }

    #[test]
    fn test_from_env_without_url_errors() {
        let result = ContextConfig::from_env_vars(vars(&[("UNRELATED", "1")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_with_database_url() {
        let config = ContextConfig::with_database_url("postgresql://localhost/x");
        assert_eq!(config.database.url, "postgresql://localhost/x");
        assert_eq!(config.database.max_connections, 5);
    }
}
