/// Boxed source error carried across the collaborator boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of an external collaborator (row store or blob backend).
///
/// Adapters box their native error (`sqlx::Error`, S3 SDK errors, I/O
/// errors) into one of these variants so the domain layer never depends on
/// a concrete backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Repository error: {0}")]
    Repository(#[source] BoxError),

    #[error("Blob store error: {0}")]
    Blob(#[source] BoxError),

    /// The row store refused a write that would duplicate a unique value.
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },
}

impl StoreError {
    /// Wrap any error as a repository failure.
    pub fn repository(err: impl Into<BoxError>) -> Self {
        Self::Repository(err.into())
    }

    /// Wrap any error as a blob store failure.
    pub fn blob(err: impl Into<BoxError>) -> Self {
        Self::Blob(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_source_message() {
        let err = StoreError::repository("connection reset");
        assert_eq!(err.to_string(), "Repository error: connection reset");

        let err = StoreError::blob(std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "Blob store error: disk full");
    }

    #[test]
    fn unique_violation_names_constraint() {
        let err = StoreError::UniqueViolation {
            constraint: "uq_assets_content_ref".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unique constraint violated: uq_assets_content_ref"
        );
    }

    #[test]
    fn source_is_preserved() {
        let err = StoreError::blob(std::io::Error::other("disk full"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
