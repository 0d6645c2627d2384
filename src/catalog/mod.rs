// Bookstore - Book Catalog & Sales Backend
// Copyright (C) 2025 Bookstore contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Catalog services
//!
//! The operation layer the HTTP routing sits on: one service struct per
//! resource, each wrapping a [`Database`](crate::storage::Database) handle.
//! Services validate identifiers before touching the store, run mutations
//! with relationship integrity, and return hydrated views with freshly
//! computed statistics - never a stale pre-write snapshot.

pub mod authors;
pub mod books;
pub mod clients;
pub mod stats;

pub use authors::{AuthorDetails, AuthorService, AuthorSummary};
pub use books::{BookQuery, BookService, Page};
pub use clients::ClientService;
pub use stats::{author_stats, AuthorStats};

use crate::error::{BookstoreError, Result};
use uuid::Uuid;

/// Reject identifiers that are not UUID-shaped before they reach the store
pub(crate) fn validate_id(entity: &'static str, id: &str) -> Result<()> {
    if Uuid::parse_str(id).is_err() {
        return Err(BookstoreError::InvalidId(format!("{entity} id '{id}'")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id_accepts_uuids() {
        let id = Uuid::new_v4().to_string();
        assert!(validate_id("author", &id).is_ok());
    }

    #[test]
    fn test_validate_id_rejects_malformed() {
        let err = validate_id("author", "not-a-uuid").expect_err("must reject");
        assert!(err.is_invalid_request());
    }
}
