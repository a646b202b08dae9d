//! Main configuration types.
//!
//! This module provides the top-level [`DynarouteConfig`] struct and its builder.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{ConfigError, LogFormat, LoggingSection, ServerSection};
use dynaroute_telemetry::LogConfig;

/// Complete Dynaroute service configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use dynaroute_config::DynarouteConfig;
///
/// let config = DynarouteConfig::default();
/// assert_eq!(config.server.service_name, "dynaroute");
/// assert!(config.server.schemas.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct DynarouteConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl DynarouteConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> DynarouteConfigBuilder {
        DynarouteConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The service name is empty
    /// - A schema id is empty or listed twice
    /// - The log level is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.service_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "server.service_name",
                "must not be empty",
            ));
        }

        let mut seen = HashSet::new();
        for schema in &self.server.schemas {
            if schema.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    "server.schemas",
                    "schema ids must not be empty",
                ));
            }
            if !seen.insert(schema.as_str()) {
                return Err(ConfigError::invalid_value(
                    "server.schemas",
                    format!("duplicate schema id '{schema}'"),
                ));
            }
        }

        if self.logging.enabled && self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "logging.level",
                "must not be empty when logging is enabled",
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset: pretty debug logs with
    /// source locations.
    ///
    /// ```
    /// use dynaroute_config::{DynarouteConfig, LogFormat};
    ///
    /// let config = DynarouteConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;
        config
    }

    /// Create a production configuration preset: JSON logs at info level.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.include_location = false;
        config
    }

    /// Returns the telemetry logging configuration.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        self.logging.to_log_config(&self.server.service_name)
    }
}

/// Builder for [`DynarouteConfig`].
#[derive(Debug, Default)]
pub struct DynarouteConfigBuilder {
    server: Option<ServerSection>,
    logging: Option<LoggingSection>,
}

impl DynarouteConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server configuration.
    #[must_use]
    pub fn server(mut self, server: ServerSection) -> Self {
        self.server = Some(server);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingSection) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> DynarouteConfig {
        DynarouteConfig {
            server: self.server.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(DynarouteConfig::default().validate().is_ok());
        assert!(DynarouteConfig::development().validate().is_ok());
        assert!(DynarouteConfig::production().validate().is_ok());
    }

    #[test]
    fn test_duplicate_schema_rejected() {
        let config = DynarouteConfig::builder()
            .server(ServerSection {
                schemas: vec!["devices".to_string(), "devices".to_string()],
                ..Default::default()
            })
            .build();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate schema id 'devices'"));
    }

    #[test]
    fn test_empty_service_name_rejected() {
        let config = DynarouteConfig::builder()
            .server(ServerSection {
                service_name: "  ".to_string(),
                ..Default::default()
            })
            .build();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "server.service_name"
        ));
    }

    #[test]
    fn test_empty_level_allowed_when_disabled() {
        let mut config = DynarouteConfig::default();
        config.logging.level = String::new();
        assert!(config.validate().is_err());

        config.logging.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_config_carries_service_name() {
        let mut config = DynarouteConfig::development();
        config.server.service_name = "devices-api".to_string();

        let log = config.log_config();
        assert_eq!(log.service_name, "devices-api");
        assert_eq!(log.level, "debug");
        assert!(log.file_line_info);
        assert!(!log.json_format);
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result: Result<DynarouteConfig, _> = toml::from_str("[metrics]\nenabled = true");
        assert!(result.is_err());
    }
}
