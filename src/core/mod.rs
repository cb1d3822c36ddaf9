pub mod entity;
pub mod error;

pub use entity::{Entity, EntityKey, RowVersion, Timestamps};
pub use error::{AppError, Result};
