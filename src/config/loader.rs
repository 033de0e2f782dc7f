//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::VersionSpec;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.name, "restapi");
        assert!(!config.handle_upgrades);
        assert!(config.declared_routes.is_empty());
        assert!(config.routes.is_none());
        assert!(!config.is_https());
    }

    #[test]
    fn test_full_config() {
        let config = parse_config(
            r#"
            port = 4000
            name = "inventory"
            version = ["2.0.0", "1.0.0"]
            handle_upgrades = true

            [timeouts]
            request_secs = 5

            [[routes]]
            method = "GET"
            url = "/ping"
            handler = "ping"
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.bind_address(), "0.0.0.0:4000");
        assert_eq!(
            config.version,
            Some(VersionSpec::Many(vec!["2.0.0".into(), "1.0.0".into()]))
        );
        assert_eq!(config.versions()[0], "2.0.0");
        assert_eq!(config.timeouts.request_secs, 5);
        assert_eq!(config.timeouts.shutdown_secs, 10);
        assert_eq!(config.declared_routes.len(), 1);
        assert_eq!(config.declared_routes[0].handler, "ping");
    }

    #[test]
    fn test_single_version_string() {
        let config = parse_config(r#"version = "1.2.3""#).unwrap();
        assert_eq!(config.versions(), vec!["1.2.3".to_string()]);
    }

    #[test]
    fn test_routes_must_be_a_list() {
        let err = parse_config(r#"routes = "GET /ping""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_errors_are_reported() {
        let err = parse_config(
            r#"
            certificate_path = "cert.pem"

            [[routes]]
            method = "GET"
            url = "ping"
            handler = "ping"
            "#,
        )
        .unwrap_err();

        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/route-server.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
