//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ServerConfig;
use crate::config::validation::{join_errors, validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
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
    use crate::config::schema::LogFormat;

    #[test]
    fn empty_document_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.workers.count, 10);
        assert_eq!(config.workers.queue_capacity(), 100);
        assert_eq!(config.limits.read_deadline_secs, 10);
        assert_eq!(config.limits.handler_timeout_secs, None);
        assert_eq!(config.cors.allow_origin, "*");
    }

    #[test]
    fn partial_sections_override_defaults() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [workers]
            count = 4

            [limits]
            handler_timeout_secs = 30

            [cors]
            allow_origin = "https://app.example"

            [observability]
            log_format = "json"
            silent = true
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.workers.count, 4);
        assert_eq!(config.workers.queue_multiplier, 10);
        assert_eq!(config.limits.handler_timeout_secs, Some(30));
        assert_eq!(config.cors.allow_origin, "https://app.example");
        assert_eq!(config.cors.allow_headers, "*");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert!(config.observability.silent);
    }

    #[test]
    fn invalid_values_fail_validation() {
        let err = parse_config("[workers]\ncount = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("workers.count"));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!(parse_config("[workers"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
