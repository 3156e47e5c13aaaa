pub mod catalog_repo;
pub mod content_repo;
pub mod models;
pub mod order_repo;
pub mod settings_repo;
pub mod user_repo;

#[cfg(test)]
pub(crate) mod test_db;

use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::domain::errors::DomainError;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DomainError::Conflict(info.message().to_string())
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                log::warn!("Foreign key violation: {}", info.message());
                DomainError::InUse("The record is still referenced by other data".to_string())
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

/// `page` is 1-based.
pub(crate) fn offset(page: i64, limit: i64) -> i64 {
    (page.max(1) - 1) * limit
}
