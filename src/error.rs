//! Error types for the bookstore core
//!
//! This module defines error types using thiserror for ergonomic error handling.
//! There is no transient-failure class in this design: every operation is a
//! single synchronous store call, so nothing is retried internally. Callers
//! own whatever retry policy they want.
//!
//! Error kinds map to the externally visible signals the HTTP layer translates
//! into status codes:
//! - `NotFound` - an entity id does not resolve
//! - `InvalidId` / `InvalidRequest` - bad input, rejected before the store is touched
//! - `Reference` - a write points at a related entity that does not exist
//! - `StillReferenced` - a delete is blocked by existing sale records

use thiserror::Error;

/// Result type alias using our BookstoreError type
pub type Result<T> = std::result::Result<T, BookstoreError>;

/// Main error type for the bookstore core
#[derive(Error, Debug)]
pub enum BookstoreError {
    // ===== Request errors =====

    /// Entity id does not resolve to a stored record
    #[error("{entity} {id} not found")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    /// Identifier is not UUID-shaped; rejected before reaching the store
    #[error("Malformed identifier: {0}")]
    InvalidId(String),

    /// Required field missing or malformed (e.g. no authorId on book creation)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A write references a related entity that does not exist
    #[error("Referenced {entity} {id} does not exist")]
    Reference {
        entity: &'static str,
        id: String,
    },

    /// A delete is blocked because sale records still reference the entity
    #[error("{entity} {id} is still referenced by existing sales")]
    StillReferenced {
        entity: &'static str,
        id: String,
    },

    // ===== Storage errors =====

    /// Generic database error
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Database schema migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    // ===== External library errors =====

    /// Database driver error from sqlx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// Helper methods for creating common errors
impl BookstoreError {
    /// Create a NotFound error for an entity id
    pub fn not_found<S: Into<String>>(entity: &'static str, id: S) -> Self {
        BookstoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create an InvalidRequest error with a message
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        BookstoreError::InvalidRequest(message.into())
    }

    /// Create a Reference error for a dangling related-entity id
    pub fn reference<S: Into<String>>(entity: &'static str, id: S) -> Self {
        BookstoreError::Reference {
            entity,
            id: id.into(),
        }
    }

    /// Check if error means "entity id does not resolve"
    ///
    /// The operation that triggered it (read, update, delete) is logged at the
    /// call site, so the kind itself stays operation-agnostic.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BookstoreError::NotFound { .. })
    }

    /// Check if error is caused by bad caller input
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            BookstoreError::InvalidRequest(_) | BookstoreError::InvalidId(_)
        )
    }

    /// Check if error is a relationship-integrity failure
    pub fn is_reference_error(&self) -> bool {
        matches!(
            self,
            BookstoreError::Reference { .. } | BookstoreError::StillReferenced { .. }
        )
    }

    /// Check if the underlying driver error is a foreign key violation
    ///
    /// Used to translate constraint failures on delete (a book with sales,
    /// a client with purchases) into `StillReferenced`.
    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            BookstoreError::SqlxError(sqlx::Error::Database(db)) => {
                matches!(db.kind(), sqlx::error::ErrorKind::ForeignKeyViolation)
            }
            _ => false,
        }
    }
}
