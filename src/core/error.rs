use crate::core::entity::EntityKey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// A required handler or collaborator was never registered.
    /// Always fatal, raised at the point of use, never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The persisted row backing an entity is gone.
    #[error("Entity '{0}' no longer exists")]
    RowVanished(EntityKey),

    /// Another actor soft-deleted the row after this actor loaded it.
    #[error("Entity '{0}' was deleted by another actor")]
    DeletedByAnother(EntityKey),

    /// Another actor committed a write after this actor loaded the row.
    #[error("Entity '{0}' was modified by another actor")]
    ModifiedByAnother(EntityKey),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cache error: {0}")]
    Cache(String),

    /// The caller's cancellation signal fired. Never conflated with
    /// other failure kinds.
    #[error("Operation cancelled")]
    Cancelled,

    /// One or more event handlers failed during a publish fan-out.
    #[error("{} event handler(s) failed", .0.len())]
    Aggregate(Vec<AppError>),
}

impl AppError {
    /// True for the conflict outcomes of the concurrency guard. The
    /// caller decides whether to reload and retry; this layer never
    /// retries automatically.
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(
            self,
            Self::RowVanished(_) | Self::DeletedByAnother(_) | Self::ModifiedByAnother(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> EntityKey {
        EntityKey::new("order", "42")
    }

    #[test]
    fn conflict_classification() {
        assert!(AppError::RowVanished(key()).is_concurrency_conflict());
        assert!(AppError::DeletedByAnother(key()).is_concurrency_conflict());
        assert!(AppError::ModifiedByAnother(key()).is_concurrency_conflict());
        assert!(!AppError::Cancelled.is_concurrency_conflict());
        assert!(!AppError::Configuration("x".into()).is_concurrency_conflict());
    }

    #[test]
    fn messages_name_the_entity_key() {
        let msg = AppError::ModifiedByAnother(key()).to_string();
        assert!(msg.contains("order:42"));
        assert!(msg.contains("modified by another actor"));
    }

    #[test]
    fn aggregate_counts_failures() {
        let err = AppError::Aggregate(vec![AppError::Cancelled, AppError::Validation("v".into())]);
        assert_eq!(err.to_string(), "2 event handler(s) failed");
    }
}
