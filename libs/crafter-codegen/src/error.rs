//! Error types for type crafting

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Bad spec file: {0}")]
    InvalidSpecFile(String),

    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("No type mapping for '{data_type}'{}", .format.as_deref().map(|f| format!(" (format '{f}')")).unwrap_or_default())]
    TypeMapping {
        data_type: String,
        format: Option<String>,
    },

    #[error("Language {0} not supported")]
    LanguageNotSupported(String),

    #[error("Invalid param {value} for {key}")]
    InvalidParam { key: String, value: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`], used by front ends to pick a
/// message header and an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidSpec,
    Unsupported,
    Runtime,
    Usage,
    Io,
}

impl Error {
    pub fn invalid_spec(message: impl Into<String>) -> Self {
        Self::InvalidSpecFile(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedFeature(message.into())
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }

    pub fn invalid_param(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidParam {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidSpecFile(_) | Error::TypeMapping { .. } | Error::Yaml(_) => {
                ErrorKind::InvalidSpec
            }
            Error::UnsupportedFeature(_) => ErrorKind::Unsupported,
            Error::Runtime(_) | Error::Template(_) => ErrorKind::Runtime,
            Error::LanguageNotSupported(_) | Error::InvalidParam { .. } => ErrorKind::Usage,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mapping_message_includes_format() {
        let err = Error::TypeMapping {
            data_type: "number".into(),
            format: Some("int64".into()),
        };
        assert_eq!(
            err.to_string(),
            "No type mapping for 'number' (format 'int64')"
        );

        let err = Error::TypeMapping {
            data_type: "boolean".into(),
            format: None,
        };
        assert_eq!(err.to_string(), "No type mapping for 'boolean'");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::invalid_spec("x").kind(), ErrorKind::InvalidSpec);
        assert_eq!(Error::unsupported("x").kind(), ErrorKind::Unsupported);
        assert_eq!(Error::runtime("x").kind(), ErrorKind::Runtime);
        assert_eq!(Error::invalid_param("k", "v").kind(), ErrorKind::Usage);
    }
}
