//! Optimistic concurrency guard.
//!
//! Before an update or a non-permanent delete commits, the currently
//! persisted state of the row is re-read and compared against the
//! token captured when the in-memory entity was loaded. Conflicts are
//! reported as distinguishable errors; the caller decides whether to
//! reload and retry, this layer never retries.

use crate::core::{AppError, Entity, Result};
use crate::storage::EntityStore;

/// Validates that `entity` may still be written.
///
/// Outcomes, in order of precedence:
/// - persisted row absent → [`AppError::RowVanished`]
/// - persisted row soft-deleted and `ignore_soft_delete` not set →
///   [`AppError::DeletedByAnother`]
/// - persisted token differs from the in-memory token →
///   [`AppError::ModifiedByAnother`], naming the entity key
/// - otherwise the write may proceed.
pub async fn check_write(
    store: &dyn EntityStore,
    entity: &dyn Entity,
    ignore_soft_delete: bool,
) -> Result<()> {
    let key = entity.key();
    let Some(state) = store.persisted_state(&key).await? else {
        return Err(AppError::RowVanished(key));
    };
    if !ignore_soft_delete && state.deleted_at.is_some() {
        return Err(AppError::DeletedByAnother(key));
    }
    if state.row_version != entity.row_version() {
        return Err(AppError::ModifiedByAnother(key));
    }
    Ok(())
}
