//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::BalancerConfig;
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

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<BalancerConfig, ConfigError> {
    let config: BalancerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BalancerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::AlgorithmKind;

    #[test]
    fn test_empty_document_yields_defaults() {
        assert_eq!(parse_config("").unwrap(), BalancerConfig::default());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = parse_config(
            r#"
            [balancer]
            max_providers = 3
            algorithm = "random"

            [health_check]
            consecutive_checks_required = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.balancer.max_providers, 3);
        assert_eq!(config.balancer.max_node_load, 10);
        assert_eq!(config.balancer.algorithm, AlgorithmKind::Random);
        assert_eq!(config.health_check.consecutive_checks_required, 4);
        assert_eq!(config.health_check.interval_secs, 5);
    }

    #[test]
    fn test_unknown_algorithm_is_parse_error() {
        let err = parse_config("[balancer]\nalgorithm = \"least_latency\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_lists_problems() {
        let err = parse_config("[balancer]\nmax_node_load = 0\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: balancer.max_node_load must be greater than zero"
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
