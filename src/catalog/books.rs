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


//! Book operations: paginated search and the mutation pipeline
//!
//! Listing order is fixed (`title ASC, id ASC`) regardless of filters so
//! pagination stays stable across pages. `total` always counts every
//! matching row, not the returned page.

use crate::catalog::validate_id;
use crate::error::{BookstoreError, Result};
use crate::storage::graph::{self, BookView};
use crate::storage::models::{AuthorPatch, BookUpdate, NewBook};
use crate::storage::queries::{self, BookFilter};
use crate::storage::Database;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// One page of results plus the total matching count
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Book listing query: optional pagination and filters
///
/// All fields are optional; missing values fall back to defaults and
/// out-of-range values are clamped rather than rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookQuery {
    /// 1-based page number; clamped to a minimum of 1
    pub page: Option<i64>,
    /// Page size; clamped to [1, 100]
    pub limit: Option<i64>,
    /// Case-insensitive substring match on titles; whitespace-only is absent
    pub search: Option<String>,
    /// Exact author filter; combines with `search` as logical AND
    pub author_id: Option<String>,
}

impl BookQuery {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    /// Clamp pagination and normalize filters
    pub(crate) fn normalized(&self) -> (i64, i64, BookFilter) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT);

        let title_contains = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);
        let author_id = self
            .author_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        (
            page,
            limit,
            BookFilter {
                title_contains,
                author_id,
            },
        )
    }
}

/// Book service - paginated search and CRUD with author linkage
#[derive(Debug, Clone)]
pub struct BookService {
    db: Database,
}

impl BookService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// List books matching the query, with authors hydrated
    ///
    /// A page past the last one returns empty items with the correct total,
    /// however far past - the offset saturates instead of overflowing.
    pub async fn find_all(&self, query: &BookQuery) -> Result<Page<BookView>> {
        let (page, limit, filter) = query.normalized();
        let offset = (page - 1).saturating_mul(limit);

        let books = queries::list_books(self.db.pool(), &filter, limit, offset).await?;
        let total = queries::count_books(self.db.pool(), &filter).await?;
        let items = graph::attach_authors(self.db.pool(), books).await?;

        Ok(Page {
            items,
            total,
            page,
            limit,
        })
    }

    /// Get one book with its author hydrated
    pub async fn find_one(&self, id: &str) -> Result<BookView> {
        validate_id("book", id)?;

        graph::load_book_view(self.db.pool(), id)
            .await?
            .ok_or_else(|| BookstoreError::not_found("book", id))
    }

    /// Create a book under an author
    ///
    /// The author id comes from the body or, failing that, from
    /// `fallback_author_id` (the original API's query parameter). A missing
    /// id is a request error and a dangling one a reference error - both
    /// raised before any write.
    pub async fn create(
        &self,
        book: NewBook,
        fallback_author_id: Option<String>,
    ) -> Result<BookView> {
        let author_id = book
            .author_id
            .as_deref()
            .or(fallback_author_id.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .ok_or_else(|| BookstoreError::invalid_request("authorId is required"))?;

        self.ensure_author_exists(&author_id).await?;

        let id = queries::insert_book(self.db.pool(), &book, &author_id).await?;
        debug!("create_book: created book {id} under author {author_id}");

        graph::load_book_view(self.db.pool(), &id)
            .await?
            .ok_or_else(|| {
                BookstoreError::DatabaseError(format!("book {id} not found after creation"))
            })
    }

    /// Apply a partial update and return the freshly loaded view
    ///
    /// The author relation changes only when the patch carries the
    /// `authorId` key: a value replaces it, null or empty clears it. Other
    /// fields in the same patch have no bearing on the relation.
    pub async fn update(&self, id: &str, patch: BookUpdate) -> Result<BookView> {
        validate_id("book", id)?;

        if let AuthorPatch::Set(author_id) = patch.author_patch() {
            self.ensure_author_exists(&author_id).await?;
        }

        let updated = queries::update_book(self.db.pool(), id, &patch).await?;
        if !updated {
            warn!("update_book: book {id} not found");
            return Err(BookstoreError::not_found("book", id));
        }
        debug!("update_book: patched book {id}");

        graph::load_book_view(self.db.pool(), id)
            .await?
            .ok_or_else(|| BookstoreError::not_found("book", id))
    }

    /// Delete a book
    pub async fn delete(&self, id: &str) -> Result<()> {
        validate_id("book", id)?;

        match queries::delete_book(self.db.pool(), id).await {
            Ok(true) => {
                debug!("delete_book: deleted book {id}");
                Ok(())
            }
            Ok(false) => {
                warn!("delete_book: book {id} not found");
                Err(BookstoreError::not_found("book", id))
            }
            Err(e) if e.is_foreign_key_violation() => Err(BookstoreError::StillReferenced {
                entity: "book",
                id: id.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    async fn ensure_author_exists(&self, author_id: &str) -> Result<()> {
        validate_id("author", author_id)?;

        if queries::find_author_by_id(self.db.pool(), author_id)
            .await?
            .is_none()
        {
            return Err(BookstoreError::reference("author", author_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::NewAuthor;

    #[test]
    fn test_query_clamping() {
        let query = BookQuery {
            page: Some(0),
            limit: Some(0),
            ..Default::default()
        };
        let (page, limit, _) = query.normalized();
        assert_eq!(page, 1);
        assert_eq!(limit, 1);

        let query = BookQuery {
            page: Some(-5),
            limit: Some(1000),
            ..Default::default()
        };
        let (page, limit, _) = query.normalized();
        assert_eq!(page, 1);
        assert_eq!(limit, BookQuery::MAX_LIMIT);

        let (page, limit, _) = BookQuery::default().normalized();
        assert_eq!(page, 1);
        assert_eq!(limit, BookQuery::DEFAULT_LIMIT);
    }

    #[test]
    fn test_query_blank_search_is_absent() {
        let query = BookQuery {
            search: Some("   ".to_string()),
            author_id: Some(String::new()),
            ..Default::default()
        };
        let (_, _, filter) = query.normalized();
        assert!(filter.title_contains.is_none());
        assert!(filter.author_id.is_none());

        let query = BookQuery {
            search: Some("  pride ".to_string()),
            ..Default::default()
        };
        let (_, _, filter) = query.normalized();
        assert_eq!(filter.title_contains.as_deref(), Some("pride"));
    }

    #[tokio::test]
    async fn test_find_all_far_past_the_end_is_empty() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let author_id = queries::insert_author(db.pool(), &NewAuthor::new("Jane", "Austen"))
            .await
            .expect("insert failed");
        queries::insert_book(db.pool(), &NewBook::new("Emma"), &author_id)
            .await
            .expect("insert failed");
        let service = BookService::new(db);

        let page = service
            .find_all(&BookQuery {
                page: Some(i64::MAX),
                limit: Some(10),
                ..Default::default()
            })
            .await
            .expect("list failed");

        assert!(page.items.is_empty());
        assert_eq!(page.total, 1);
        assert_eq!(page.page, i64::MAX);
    }

    #[tokio::test]
    async fn test_create_without_author_is_rejected_before_write() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let service = BookService::new(db.clone());

        let err = service
            .create(NewBook::new("Emma"), None)
            .await
            .expect_err("must reject");
        assert!(err.is_invalid_request());

        // Nothing was written
        let total = queries::count_books(db.pool(), &BookFilter::default())
            .await
            .expect("count failed");
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_create_with_dangling_author_is_reference_error() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let service = BookService::new(db);

        let mut book = NewBook::new("Emma");
        book.author_id = Some(uuid::Uuid::new_v4().to_string());

        let err = service.create(book, None).await.expect_err("must reject");
        assert!(err.is_reference_error());
    }

    #[tokio::test]
    async fn test_create_uses_fallback_author_id() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let author_id = queries::insert_author(db.pool(), &NewAuthor::new("Jane", "Austen"))
            .await
            .expect("insert failed");
        let service = BookService::new(db);

        let view = service
            .create(NewBook::new("Emma"), Some(author_id.clone()))
            .await
            .expect("create failed");

        let author = view.author.expect("author relation missing");
        assert_eq!(author.id(), author_id);
    }
}
