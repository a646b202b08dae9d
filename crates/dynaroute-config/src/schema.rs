//! Configuration sections.

use dynaroute_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

/// Server configuration.
///
/// ```toml
/// [server]
/// service_name = "devices-api"
/// schema_file = "schemas.json"
/// schemas = ["devices", "users"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Service name, attached to log records.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Schema ids to serve. Empty serves every schema of the catalog.
    #[serde(default)]
    pub schemas: Vec<String>,

    /// Catalog document holding the schemas (JSON or TOML).
    #[serde(default)]
    pub schema_file: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            schemas: Vec::new(),
            schema_file: None,
        }
    }
}

impl ServerSection {
    /// Returns true if `schema_id` should be served.
    #[must_use]
    pub fn serves(&self, schema_id: &str) -> bool {
        self.schemas.is_empty() || self.schemas.iter().any(|s| s == schema_id)
    }
}

fn default_service_name() -> String {
    "dynaroute".to_string()
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g. `info` or `info,dynaroute_pipeline=debug`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,

    /// Include thread ids in logs.
    #[serde(default)]
    pub thread_ids: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
            thread_ids: false,
        }
    }
}

impl LoggingSection {
    /// Converts the section into a telemetry logging configuration.
    #[must_use]
    pub fn to_log_config(&self, service_name: &str) -> LogConfig {
        let base = match self.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };

        LogConfig {
            enabled: self.enabled,
            file_line_info: self.include_location,
            thread_ids: self.thread_ids,
            ..base
        }
        .with_level(self.level.clone())
        .with_service_name(service_name)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_defaults() {
        let server = ServerSection::default();
        assert_eq!(server.service_name, "dynaroute");
        assert!(server.schemas.is_empty());
        assert!(server.serves("anything"));
    }

    #[test]
    fn test_server_filters_schemas() {
        let server = ServerSection {
            schemas: vec!["devices".to_string()],
            ..Default::default()
        };
        assert!(server.serves("devices"));
        assert!(!server.serves("users"));
    }

    #[test]
    fn test_logging_to_log_config() {
        let section = LoggingSection {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
            include_location: false,
            ..Default::default()
        };

        let config = section.to_log_config("devices-api");
        assert!(!config.json_format);
        assert!(!config.file_line_info);
        assert_eq!(config.level, "warn");
        assert_eq!(config.service_name, "devices-api");

        let json = LoggingSection::default().to_log_config("x");
        assert!(json.json_format);
        assert_eq!(json.level, "info");
    }

    #[test]
    fn test_unknown_logging_key_rejected() {
        let result: Result<LoggingSection, _> = toml::from_str("colour = true");
        assert!(result.is_err());
    }
}
