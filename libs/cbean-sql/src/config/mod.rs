// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod environment;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{clause_error::SqlClauseError, dialect::DatabaseKind};

pub use environment::{Environment, MapEnvironment, SystemEnvironment};

pub const DIALECT_ENV_KEY: &str = "CBEAN_DIALECT";
pub const SELECT_INDEX_ENV_KEY: &str = "CBEAN_SELECT_INDEX";
pub const CHECK_NULL_OR_EMPTY_ENV_KEY: &str = "CBEAN_CHECK_NULL_OR_EMPTY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Invalid value for {key}: {value}. Expected true, 1, yes, on, enabled, enable OR false, 0, no, off, disabled, disable"
    )]
    InvalidBoolean { key: String, value: String },

    #[error("Unknown dialect '{0}'. Run `cbean dialects` to list the supported ones")]
    UnknownDialect(String),

    #[error("Invalid in-scope limit {0}, it must be positive")]
    InvalidInScopeLimit(usize),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid schema: {0}")]
    Schema(#[from] SqlClauseError),
}

/// Engine-wide settings fixed when a [`SqlClause`](crate::SqlClause) is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseConfig {
    pub dialect: DatabaseKind,
    /// Alias select columns as `c1`, `c2`, ... instead of their natural names
    pub select_index: bool,
    /// Reject null or empty condition values instead of silently ignoring them
    pub null_or_empty_checked: bool,
    /// Overrides the dialect's maximum number of elements in one `in (...)` list
    pub in_scope_limit: Option<usize>,
}

impl Default for ClauseConfig {
    fn default() -> Self {
        Self {
            dialect: DatabaseKind::MySql,
            select_index: true,
            null_or_empty_checked: false,
            in_scope_limit: None,
        }
    }
}

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ClauseConfigSer {
    pub dialect: Option<String>,
    #[serde(rename = "select-index")]
    pub select_index: Option<bool>,
    #[serde(rename = "check-null-or-empty")]
    pub null_or_empty_checked: Option<bool>,
    #[serde(rename = "in-scope-limit")]
    pub in_scope_limit: Option<usize>,
}

impl TryFrom<ClauseConfigSer> for ClauseConfig {
    type Error = ConfigError;

    fn try_from(config: ClauseConfigSer) -> Result<Self, Self::Error> {
        let defaults = ClauseConfig::default();

        let dialect = match config.dialect {
            Some(dialect) => dialect.parse()?,
            None => defaults.dialect,
        };

        if config.in_scope_limit == Some(0) {
            return Err(ConfigError::InvalidInScopeLimit(0));
        }

        Ok(ClauseConfig {
            dialect,
            select_index: config.select_index.unwrap_or(defaults.select_index),
            null_or_empty_checked: config
                .null_or_empty_checked
                .unwrap_or(defaults.null_or_empty_checked),
            in_scope_limit: config.in_scope_limit,
        })
    }
}

impl ClauseConfig {
    pub fn new(dialect: DatabaseKind) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: ClauseConfigSer = toml::from_str(toml_str)?;
        config.try_into()
    }

    /// Override settings from `CBEAN_DIALECT`, `CBEAN_SELECT_INDEX` and
    /// `CBEAN_CHECK_NULL_OR_EMPTY` when they are set.
    pub fn apply_environment(self, env: &dyn Environment) -> Result<Self, ConfigError> {
        let dialect = match env.get(DIALECT_ENV_KEY) {
            Some(dialect) => {
                debug!(dialect, "Dialect overridden from the environment");
                dialect.parse()?
            }
            None => self.dialect,
        };

        Ok(Self {
            dialect,
            select_index: env.enabled(SELECT_INDEX_ENV_KEY, self.select_index)?,
            null_or_empty_checked: env
                .enabled(CHECK_NULL_OR_EMPTY_ENV_KEY, self.null_or_empty_checked)?,
            in_scope_limit: self.in_scope_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(ClauseConfig::from_toml_str("").unwrap(), ClauseConfig::default());
    }

    #[test]
    fn toml_overrides() {
        let config = ClauseConfig::from_toml_str(
            r#"
            dialect = "oracle"
            select-index = false
            in-scope-limit = 500
            "#,
        )
        .unwrap();

        assert_eq!(
            config,
            ClauseConfig {
                dialect: DatabaseKind::Oracle,
                select_index: false,
                null_or_empty_checked: false,
                in_scope_limit: Some(500),
            }
        );
    }

    #[test]
    fn toml_rejects_unknown_keys_and_dialects() {
        assert!(matches!(
            ClauseConfig::from_toml_str("paging = true"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ClauseConfig::from_toml_str(r#"dialect = "informix""#),
            Err(ConfigError::UnknownDialect(_))
        ));
        assert!(matches!(
            ClauseConfig::from_toml_str("in-scope-limit = 0"),
            Err(ConfigError::InvalidInScopeLimit(0))
        ));
    }

    #[test]
    fn environment_overrides() {
        let env = MapEnvironment::from([
            (DIALECT_ENV_KEY, "postgresql"),
            (CHECK_NULL_OR_EMPTY_ENV_KEY, "true"),
        ]);
        let config = ClauseConfig::default().apply_environment(&env).unwrap();

        assert_eq!(config.dialect, DatabaseKind::Postgres);
        assert!(config.select_index);
        assert!(config.null_or_empty_checked);
    }
}
