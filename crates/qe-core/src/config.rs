//! Configuration types and loading
//!
//! Settings that adapters pass into the pager and SQL renderer. Defaults
//! are layered under `QUERY_ENGINE__<SECTION>__<KEY>` environment variables.

use serde::{Deserialize, Serialize};

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "QUERY_ENGINE";

/// Main engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// In-memory pagination settings
    pub pagination: PaginationConfig,

    /// SQL rendering settings
    pub sql: SqlConfig,
}

/// How the in-memory pager encodes page boundaries
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CursorStrategy {
    /// Order-by field values plus the tiebreaker field
    #[default]
    Keyset,
    /// Synthetic `_index` of the row within the ordered candidate set
    Positional,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Field that breaks ties between rows with equal order-by values
    pub tiebreaker_field: String,
    pub cursor_strategy: CursorStrategy,
    /// Whether `PageInfo::total_count` is filled in
    pub include_total_count: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            tiebreaker_field: "id".to_string(),
            cursor_strategy: CursorStrategy::Keyset,
            include_total_count: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SqlConfig {
    /// Wrap column names in double quotes
    pub quote_identifiers: bool,
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
    #[error("Config source error: {0}")]
    Source(#[from] config::ConfigError),
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(environment())
    }

    /// Load configuration from an arbitrary source layered over the defaults
    pub fn from_source<S>(source: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = config::Config::try_from(&Self::default())?;
        let loaded: Self = config::Config::builder()
            .add_source(defaults)
            .add_source(source)
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        tracing::debug!(
            tiebreaker = %loaded.pagination.tiebreaker_field,
            strategy = ?loaded.pagination.cursor_strategy,
            quote_identifiers = loaded.sql.quote_identifiers,
            "Loaded query engine configuration"
        );
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pagination.tiebreaker_field.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "pagination.tiebreaker_field".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.pagination.tiebreaker_field, "id");
        assert_eq!(config.pagination.cursor_strategy, CursorStrategy::Keyset);
        assert!(config.pagination.include_total_count);
        assert!(!config.sql.quote_identifiers);
    }

    #[test]
    fn test_source_overrides_defaults() {
        let source = config::File::from_str(
            "[pagination]\ntiebreaker_field = \"uuid\"\ncursor_strategy = \"positional\"\n",
            config::FileFormat::Toml,
        );
        let config = EngineConfig::from_source(source).unwrap();
        assert_eq!(config.pagination.tiebreaker_field, "uuid");
        assert_eq!(config.pagination.cursor_strategy, CursorStrategy::Positional);
        // untouched keys keep their defaults
        assert!(config.pagination.include_total_count);
        assert!(!config.sql.quote_identifiers);
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let mut vars = config::Map::new();
        for (key, value) in [
            ("QUERY_ENGINE__PAGINATION__TIEBREAKER_FIELD", "uuid"),
            ("QUERY_ENGINE__PAGINATION__CURSOR_STRATEGY", "positional"),
            ("QUERY_ENGINE__PAGINATION__INCLUDE_TOTAL_COUNT", "false"),
            ("QUERY_ENGINE__SQL__QUOTE_IDENTIFIERS", "true"),
            ("OTHER_APP__SQL__QUOTE_IDENTIFIERS", "false"),
        ] {
            vars.insert(key.to_string(), value.to_string());
        }

        let config = EngineConfig::from_source(environment().source(Some(vars))).unwrap();
        assert_eq!(config.pagination.tiebreaker_field, "uuid");
        assert_eq!(config.pagination.cursor_strategy, CursorStrategy::Positional);
        assert!(!config.pagination.include_total_count);
        assert!(config.sql.quote_identifiers);
    }

    #[test]
    fn test_empty_environment_keeps_defaults() {
        let config = EngineConfig::from_source(environment().source(Some(config::Map::new())))
            .unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_empty_tiebreaker_rejected() {
        let source = config::File::from_str(
            "[pagination]\ntiebreaker_field = \"\"\n",
            config::FileFormat::Toml,
        );
        let err = EngineConfig::from_source(source).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
