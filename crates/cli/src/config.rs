//! Server configuration and logging setup.
//!
//! Settings are resolved in order: built-in defaults, then an optional TOML
//! file, then environment variables, then explicit command-line flags.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Default listen port.
pub(crate) const DEFAULT_PORT: u16 = 5000;

/// Default rate limit: 60 requests per minute per IP.
pub(crate) const DEFAULT_RATE_LIMIT: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {var}: '{value}'")]
    Env { var: &'static str, value: String },

    #[error("invalid log filter '{filter}': {reason}")]
    LogFilter { filter: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ServerConfig {
    pub(crate) port: u16,
    pub(crate) rate_limit: u64,
    pub(crate) api_key: Option<String>,
    /// `tracing` filter directive. `None` defers to `RUST_LOG`.
    pub(crate) log_level: Option<String>,
    pub(crate) require_terms_acceptance: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            rate_limit: DEFAULT_RATE_LIMIT,
            api_key: None,
            log_level: None,
            require_terms_acceptance: false,
        }
    }
}

/// Flags given on the command line. Anything set here wins.
#[derive(Debug, Default)]
pub(crate) struct ServeOverrides {
    pub(crate) port: Option<u16>,
    pub(crate) rate_limit: Option<u64>,
    pub(crate) api_key: Option<String>,
    pub(crate) log_level: Option<String>,
    pub(crate) require_terms_acceptance: bool,
}

impl ServerConfig {
    pub(crate) fn from_toml_str(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub(crate) fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(path, &text)
    }

    /// Layer environment variables over the current values. `lookup` is
    /// `std::env::var` in production.
    pub(crate) fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // CONTRACTLY_PORT beats the generic PORT.
        for var in ["PORT", "CONTRACTLY_PORT"] {
            if let Some(value) = lookup(var) {
                self.port = value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Env { var, value })?;
            }
        }
        if let Some(value) = lookup("CONTRACTLY_RATE_LIMIT") {
            self.rate_limit = value.trim().parse().map_err(|_| ConfigError::Env {
                var: "CONTRACTLY_RATE_LIMIT",
                value,
            })?;
        }
        if let Some(key) = lookup("CONTRACTLY_API_KEY").filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(level) = lookup("CONTRACTLY_LOG").filter(|l| !l.is_empty()) {
            self.log_level = Some(level);
        }
        Ok(())
    }

    pub(crate) fn apply_overrides(&mut self, flags: ServeOverrides) {
        if let Some(port) = flags.port {
            self.port = port;
        }
        if let Some(rate_limit) = flags.rate_limit {
            self.rate_limit = rate_limit;
        }
        if let Some(key) = flags.api_key.filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(level) = flags.log_level {
            self.log_level = Some(level);
        }
        if flags.require_terms_acceptance {
            self.require_terms_acceptance = true;
        }
    }

    /// Full resolution: defaults, file, environment, flags.
    pub(crate) fn resolve(
        file: Option<&Path>,
        flags: ServeOverrides,
    ) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        config.apply_overrides(flags);
        Ok(config)
    }
}

/// Install the global `tracing` subscriber, writing to stderr.
///
/// An explicit `level` wins; otherwise `RUST_LOG` is used, then `info`.
pub(crate) fn init_logging(level: Option<&str>) -> Result<(), ConfigError> {
    use tracing_subscriber::EnvFilter;

    let filter = match level {
        Some(directive) => {
            EnvFilter::try_new(directive).map_err(|e| ConfigError::LogFilter {
                filter: directive.to_string(),
                reason: e.to_string(),
            })?
        }
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
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
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.rate_limit, 60);
        assert!(config.api_key.is_none());
        assert!(!config.require_terms_acceptance);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ServerConfig::from_toml_str(
            Path::new("c.toml"),
            "port = 8080\nrequire_terms_acceptance = true\n",
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rate_limit, DEFAULT_RATE_LIMIT);
        assert!(config.require_terms_acceptance);
    }

    #[test]
    fn unknown_toml_key_is_rejected() {
        let err = ServerConfig::from_toml_str(Path::new("c.toml"), "prot = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn specific_port_variable_beats_generic() {
        let mut config = ServerConfig::default();
        config
            .apply_env(env(&[("PORT", "7000"), ("CONTRACTLY_PORT", "7001")]))
            .unwrap();
        assert_eq!(config.port, 7001);
    }

    #[test]
    fn bad_env_value_names_the_variable() {
        let mut config = ServerConfig::default();
        let err = config
            .apply_env(env(&[("CONTRACTLY_RATE_LIMIT", "lots")]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for CONTRACTLY_RATE_LIMIT: 'lots'"
        );
    }

    #[test]
    fn flags_override_environment() {
        let mut config = ServerConfig::default();
        config
            .apply_env(env(&[("CONTRACTLY_API_KEY", "from-env"), ("PORT", "7000")]))
            .unwrap();
        config.apply_overrides(ServeOverrides {
            api_key: Some("from-flag".to_string()),
            ..Default::default()
        });
        assert_eq!(config.api_key.as_deref(), Some("from-flag"));
        assert_eq!(config.port, 7000);
    }
}
