//! Layered loading: file, then `.env`, then environment overrides.

use std::io::Write;

use dynaroute_config::{ConfigError, ConfigLoader, LogFormat};

#[test]
fn test_env_overrides_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "[server]\nschemas = [\"devices\"]\n\n[logging]\nlevel = \"warn\"\nformat = \"pretty\""
    )
    .unwrap();

    std::env::set_var("LAYERTEST__SERVER__SCHEMAS", "devices,users");
    std::env::set_var("LAYERTEST__LOGGING__INCLUDE_LOCATION", "yes");

    let config = ConfigLoader::new()
        .with_defaults()
        .with_file(file.path())
        .unwrap()
        .with_env_prefix("layertest")
        .load()
        .unwrap();

    assert_eq!(config.server.schemas, vec!["devices", "users"]);
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(config.logging.include_location);
}

#[test]
fn test_dotenv_feeds_env_overrides() {
    let mut dotenv = tempfile::NamedTempFile::new().unwrap();
    writeln!(dotenv, "DOTENVTEST__SERVER__SERVICE_NAME=from-dotenv").unwrap();

    let config = ConfigLoader::new()
        .with_dotenv_file(dotenv.path())
        .unwrap()
        .with_env_prefix("DOTENVTEST")
        .load()
        .unwrap();

    assert_eq!(config.server.service_name, "from-dotenv");
}

#[test]
fn test_invalid_override_fails_load() {
    std::env::set_var("BADFORMAT__LOGGING__FORMAT", "xml");

    let err = ConfigLoader::new()
        .with_env_prefix("BADFORMAT")
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigError::EnvParseError { ref var, .. } if var == "BADFORMAT__LOGGING__FORMAT"));
}

#[test]
fn test_override_can_break_validation() {
    std::env::set_var("EMPTYNAME__SERVER__SERVICE_NAME", "");

    let err = ConfigLoader::new()
        .with_env_prefix("EMPTYNAME")
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}
