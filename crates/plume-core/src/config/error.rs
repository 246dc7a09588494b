//! Errors raised while reading or writing configuration files.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error during operation '{operation}' on path '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported configuration format: {0}")]
    UnsupportedConfigFormat(String),

    #[error("Deserialization from '{format}' failed: {source}")]
    DeserializationError {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Serialization to '{format}' failed: {source}")]
    SerializationError {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl ConfigError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        ConfigError::Io {
            source,
            operation: operation.into(),
            path,
        }
    }

    pub(crate) fn deserialization(format: &str, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        ConfigError::DeserializationError {
            format: format.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn serialization(format: &str, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        ConfigError::SerializationError {
            format: format.to_string(),
            source: Box::new(source),
        }
    }
}
