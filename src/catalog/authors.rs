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


//! Author operations
//!
//! Every read goes through the hydrated graph so `booksCount` and
//! `averageSalesPerBook` are recomputed from live data. Create and update
//! reload the entity with relations after the write.

use crate::catalog::stats::{author_stats, AuthorStats};
use crate::catalog::validate_id;
use crate::error::{BookstoreError, Result};
use crate::storage::graph::{self, AuthorGraph, BookView};
use crate::storage::models::{AuthorRef, AuthorUpdate, NewAuthor};
use crate::storage::{queries, Database};
use log::{debug, warn};
use serde::Serialize;

/// An author with derived statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub picture_url: Option<String>,
    #[serde(flatten)]
    pub stats: AuthorStats,
}

impl AuthorSummary {
    fn from_graph(graph: &AuthorGraph) -> Self {
        Self {
            id: graph.author.id.clone(),
            first_name: graph.author.first_name.clone(),
            last_name: graph.author.last_name.clone(),
            picture_url: graph.author.picture_url.clone(),
            stats: author_stats(graph),
        }
    }
}

/// An author summary plus their book list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDetails {
    #[serde(flatten)]
    pub summary: AuthorSummary,
    pub books: Vec<BookView>,
}

impl AuthorDetails {
    fn from_graph(graph: AuthorGraph) -> Self {
        let summary = AuthorSummary::from_graph(&graph);
        // The books' author relation is the detail root itself, so only the
        // reference is carried, not a second copy of the entity.
        let author_id = graph.author.id.clone();
        let books = graph
            .books
            .into_iter()
            .map(|bg| BookView {
                book: bg.book,
                author: Some(AuthorRef::unloaded(author_id.clone())),
            })
            .collect();

        Self { summary, books }
    }
}

/// Author service - list, read, create, patch and delete authors
#[derive(Debug, Clone)]
pub struct AuthorService {
    db: Database,
}

impl AuthorService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// List all authors with statistics, ordered by last then first name
    pub async fn list(&self) -> Result<Vec<AuthorSummary>> {
        let graphs = graph::load_all_author_graphs(self.db.pool()).await?;
        Ok(graphs.iter().map(AuthorSummary::from_graph).collect())
    }

    /// Get one author with statistics and books
    pub async fn get(&self, id: &str) -> Result<AuthorDetails> {
        validate_id("author", id)?;

        let graph = graph::load_author_graph(self.db.pool(), id)
            .await?
            .ok_or_else(|| BookstoreError::not_found("author", id))?;

        Ok(AuthorDetails::from_graph(graph))
    }

    /// Create an author and return the freshly loaded summary
    pub async fn create(&self, author: NewAuthor) -> Result<AuthorSummary> {
        let id = queries::insert_author(self.db.pool(), &author).await?;
        debug!("create_author: created author {id}");

        // Reload with relations so the returned stats are computed the same
        // way as on any other read
        let graph = graph::load_author_graph(self.db.pool(), &id)
            .await?
            .ok_or_else(|| {
                BookstoreError::DatabaseError(format!("author {id} not found after creation"))
            })?;

        Ok(AuthorSummary::from_graph(&graph))
    }

    /// Apply a partial update and return the freshly loaded summary
    pub async fn update(&self, id: &str, patch: AuthorUpdate) -> Result<AuthorSummary> {
        validate_id("author", id)?;

        let updated = queries::update_author(self.db.pool(), id, &patch).await?;
        if !updated {
            warn!("update_author: author {id} not found");
            return Err(BookstoreError::not_found("author", id));
        }
        debug!("update_author: patched author {id}");

        let graph = graph::load_author_graph(self.db.pool(), id)
            .await?
            .ok_or_else(|| BookstoreError::not_found("author", id))?;

        Ok(AuthorSummary::from_graph(&graph))
    }

    /// Delete an author, clearing the author reference on their books
    pub async fn delete(&self, id: &str) -> Result<()> {
        validate_id("author", id)?;

        let deleted = queries::delete_author(self.db.pool(), id).await?;
        if !deleted {
            warn!("delete_author: author {id} not found");
            return Err(BookstoreError::not_found("author", id));
        }
        debug!("delete_author: deleted author {id}");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_returns_zeroed_stats() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let service = AuthorService::new(db);

        let summary = service
            .create(NewAuthor::new("Jane", "Austen"))
            .await
            .expect("Failed to create author");

        assert_eq!(summary.first_name, "Jane");
        assert_eq!(summary.stats.books_count, 0);
        assert_eq!(summary.stats.average_sales_per_book, 0.0);
    }

    #[tokio::test]
    async fn test_get_rejects_malformed_id() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let service = AuthorService::new(db);

        let err = service.get("not-a-uuid").await.expect_err("must reject");
        assert!(err.is_invalid_request());
    }

    #[tokio::test]
    async fn test_update_missing_author_is_not_found() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let service = AuthorService::new(db);

        let id = uuid::Uuid::new_v4().to_string();
        let err = service
            .update(&id, AuthorUpdate::default())
            .await
            .expect_err("must fail");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_missing_author_is_not_found() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let service = AuthorService::new(db);

        let id = uuid::Uuid::new_v4().to_string();
        let err = service.delete(&id).await.expect_err("must fail");
        assert!(err.is_not_found());
    }
}
