//! Typed errors for the content pipeline and the A/B test manager.

use crate::content::ContentType;
use crate::i18n::Language;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for content pipeline operations
pub type Result<T> = std::result::Result<T, ContentError>;

/// Errors raised while resolving, listing or loading content
#[derive(Error, Debug)]
pub enum ContentError {
    /// A requested slug does not exist for the given content type and language
    #[error("Content not found: {content_type}/{language}/{slug}")]
    NotFound {
        content_type: ContentType,
        language: Language,
        slug: String,
    },

    /// The directory for a (content type, language) pair does not exist
    #[error("Content directory not found: {}", path.display())]
    MissingDirectory { path: PathBuf },

    #[error("Unknown content type: '{0}'")]
    UnknownContentType(String),

    #[error("Unknown language code: '{0}'")]
    UnknownLanguage(String),

    /// The content type to path table is incomplete or malformed
    #[error("Invalid content path table: {0}")]
    InvalidPathTable(String),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid frontmatter in {}: {message}", path.display())]
    Frontmatter { path: PathBuf, message: String },

    #[error("Alert rule not found: '{0}'")]
    RuleNotFound(String),
}

impl ContentError {
    /// True for the "nothing there" cases that callers may treat as empty.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ContentError::NotFound { .. } | ContentError::MissingDirectory { .. }
        )
    }
}

/// Errors raised by the A/B test manager
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbTestError {
    /// Experiment definition cannot produce an assignment (no variants, zero weights)
    #[error("Experiment '{experiment_id}' is misconfigured: {reason}")]
    Configuration {
        experiment_id: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = ContentError::NotFound {
            content_type: ContentType::Blog,
            language: Language::Cs,
            slug: "intro".to_string(),
        };
        assert_eq!(err.to_string(), "Content not found: blog/cs/intro");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_missing_directory_is_not_found() {
        let err = ContentError::MissingDirectory {
            path: PathBuf::from("src/content/blog/en"),
        };
        assert!(err.is_not_found());
        assert!(err.to_string().contains("src/content/blog/en"));
    }

    #[test]
    fn test_io_error_is_not_not_found() {
        let err = ContentError::Io {
            path: PathBuf::from("x"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_configuration_error_display() {
        let err = AbTestError::Configuration {
            experiment_id: "exp".to_string(),
            reason: "all variant weights are zero".to_string(),
        };
        assert!(err.to_string().contains("exp"));
        assert!(err.to_string().contains("zero"));
    }
}
