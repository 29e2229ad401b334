use thiserror::Error;

/// Errors that can occur when building a composite key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("{role} id must not be empty")]
    Empty { role: &'static str },
    #[error("{role} id must not contain '#': {id}")]
    ContainsSeparator { role: &'static str, id: String },
}

/// Errors that can occur during repository operations.
///
/// Backend adapters translate their native failures into this taxonomy; no
/// driver or SDK type ever crosses the repository boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {id}")]
    Conflict {
        entity_type: &'static str,
        id: String,
    },
    #[error("Request throttled: {0}")]
    Throttled(String),
    #[error("Backend unavailable: {0}")]
    Transient(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    /// Whether retrying the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled(_) | Self::Transient(_))
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_error_display() {
        assert_eq!(
            KeyError::Empty { role: "parent" }.to_string(),
            "parent id must not be empty"
        );
        assert_eq!(
            KeyError::ContainsSeparator {
                role: "child",
                id: "a#b".to_string()
            }
            .to_string(),
            "child id must not contain '#': a#b"
        );
    }

    #[test]
    fn test_repository_error_not_found_display() {
        let error = RepositoryError::NotFound {
            entity_type: "Subcategory",
            id: "cat-1#sub-1".to_string(),
        };
        assert_eq!(error.to_string(), "Subcategory not found: cat-1#sub-1");
    }

    #[test]
    fn test_repository_error_conflict_display() {
        let error = RepositoryError::Conflict {
            entity_type: "Category",
            id: "cat-1".to_string(),
        };
        assert_eq!(error.to_string(), "Category already exists: cat-1");
    }

    #[test]
    fn test_repository_error_throttled_display() {
        let error = RepositoryError::Throttled("rate exceeded".to_string());
        assert_eq!(error.to_string(), "Request throttled: rate exceeded");
    }

    #[test]
    fn test_repository_error_transient_display() {
        let error = RepositoryError::Transient("timeout after 30s".to_string());
        assert_eq!(error.to_string(), "Backend unavailable: timeout after 30s");
    }

    #[test]
    fn test_only_throttled_and_transient_are_retryable() {
        assert!(RepositoryError::Throttled(String::new()).is_retryable());
        assert!(RepositoryError::Transient(String::new()).is_retryable());
        assert!(!RepositoryError::InvalidData(String::new()).is_retryable());
        assert!(!RepositoryError::NotFound {
            entity_type: "Post",
            id: "p".to_string()
        }
        .is_retryable());
    }
}
