//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Storage settings are complete for the chosen backend
//! - Seed mappings are non-empty and unique after normalization
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MapperConfig → Result<(), Vec<ValidationError>>

use std::collections::HashMap;
use std::net::SocketAddr;

use crate::config::schema::{MapperConfig, StorageBackend};
use crate::mapping::normalize::normalize_pattern;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingStoragePath,
    EmptyPattern { index: usize },
    EmptyDestination { pattern: String },
    DuplicatePattern { pattern: String, first: usize, second: usize },
    InvalidMetricsAddress(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingStoragePath => {
                write!(f, "storage.path is required for the file backend")
            }
            ValidationError::EmptyPattern { index } => {
                write!(f, "mappings[{}] has an empty pattern", index)
            }
            ValidationError::EmptyDestination { pattern } => {
                write!(f, "mapping {} has an empty destination", pattern)
            }
            ValidationError::DuplicatePattern { pattern, first, second } => write!(
                f,
                "mappings[{}] and mappings[{}] both normalize to {}",
                first, second, pattern
            ),
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(f, "invalid metrics address: {}", addr)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &MapperConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.storage.backend == StorageBackend::File
        && config.storage.path.as_deref().map_or(true, str::is_empty)
    {
        errors.push(ValidationError::MissingStoragePath);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    for (index, mapping) in config.mappings.iter().enumerate() {
        let pattern = normalize_pattern(&mapping.pattern);
        if pattern.is_empty() {
            errors.push(ValidationError::EmptyPattern { index });
            continue;
        }
        if mapping.destination.is_empty() {
            errors.push(ValidationError::EmptyDestination { pattern: pattern.clone() });
        }
        if let Some(&first) = seen.get(&pattern) {
            errors.push(ValidationError::DuplicatePattern { pattern, first, second: index });
        } else {
            seen.insert(pattern, index);
        }
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
    use crate::config::schema::MappingConfig;

    fn seed(pattern: &str, destination: &str) -> MappingConfig {
        MappingConfig {
            pattern: pattern.into(),
            destination: destination.into(),
            is_local: true,
            is_active: true,
        }
    }

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&MapperConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = MapperConfig::default();
        config.storage.backend = StorageBackend::File;
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nope".into();
        config.mappings = vec![
            seed("http://foo.com/a", "x"),
            seed("", "x"),
            seed("https://foo.com/a", ""),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::MissingStoragePath,
                ValidationError::InvalidMetricsAddress("nope".into()),
                ValidationError::EmptyPattern { index: 1 },
                ValidationError::EmptyDestination { pattern: "foo.com/a".into() },
                ValidationError::DuplicatePattern {
                    pattern: "foo.com/a".into(),
                    first: 0,
                    second: 2,
                },
            ]
        );
    }

    #[test]
    fn test_display() {
        let err = ValidationError::EmptyPattern { index: 3 };
        assert_eq!(err.to_string(), "mappings[3] has an empty pattern");
    }
}
