//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (worker counts, limits, deadlines > 0)
//! - Check the bind address parses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Render a list of violations as one line.
pub fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check every semantic constraint, collecting all violations.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("`{}` is not a socket address", config.listener.bind_address),
        ));
    }

    if config.workers.count == 0 {
        errors.push(ValidationError::new("workers.count", "must be at least 1"));
    }
    if config.workers.queue_multiplier == 0 {
        errors.push(ValidationError::new(
            "workers.queue_multiplier",
            "must be at least 1",
        ));
    }

    let limits = &config.limits;
    if limits.read_deadline_secs == 0 {
        errors.push(ValidationError::new(
            "limits.read_deadline_secs",
            "must be greater than 0",
        ));
    }
    if limits.read_chunk_size == 0 {
        errors.push(ValidationError::new(
            "limits.read_chunk_size",
            "must be greater than 0",
        ));
    }
    if limits.max_request_bytes < limits.read_chunk_size {
        errors.push(ValidationError::new(
            "limits.max_request_bytes",
            "must be at least limits.read_chunk_size",
        ));
    }
    if limits.handler_timeout_secs == Some(0) {
        errors.push(ValidationError::new(
            "limits.handler_timeout_secs",
            "must be greater than 0 when set",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn reports_every_violation() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.workers.count = 0;
        config.limits.read_chunk_size = 4096;
        config.limits.max_request_bytes = 1024;
        config.limits.handler_timeout_secs = Some(0);

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "workers.count",
                "limits.max_request_bytes",
                "limits.handler_timeout_secs",
            ]
        );
    }
}
