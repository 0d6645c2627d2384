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


//! Database migrations
//!
//! This module handles database schema creation and migrations.
//!
//! # Migration Strategy
//! Migrations run as plain SQL at startup and are tracked in the
//! `_migrations` table, so opening an existing database only applies what is
//! missing. sqlx's compile-time migration system is avoided because it needs
//! a database connection at build time.

use crate::error::Result;
use sqlx::{Executor, SqlitePool};

/// Run all database migrations
///
/// This function creates the database schema and applies any pending migrations.
/// Migrations are tracked in the `_migrations` table.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    // Create migrations tracking table
    create_migrations_table(pool).await?;

    // Run all migrations in order
    run_migration(pool, 1, "initial_schema", create_initial_schema(pool)).await?;

    Ok(())
}

/// Create migrations tracking table
async fn create_migrations_table(pool: &SqlitePool) -> Result<()> {
    pool.execute(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .await?;

    Ok(())
}

/// Run a single migration if it hasn't been applied yet
async fn run_migration(
    pool: &SqlitePool,
    id: i32,
    name: &str,
    migration_fn: impl std::future::Future<Output = Result<()>>,
) -> Result<()> {
    // Check if migration has been applied
    let applied: Option<i32> = sqlx::query_scalar("SELECT id FROM _migrations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    if applied.is_some() {
        // Migration already applied
        return Ok(());
    }

    // Run migration
    migration_fn.await?;

    // Record migration
    sqlx::query("INSERT INTO _migrations (id, name) VALUES (?, ?)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;

    Ok(())
}

/// Create initial database schema
///
/// Creates the four entity tables with their relationships and indexes.
/// Identifiers are UUIDv4 strings generated by the store, kept as TEXT
/// primary keys.
async fn create_initial_schema(pool: &SqlitePool) -> Result<()> {
    pool.execute(
        r#"
-- ============================================================================
-- MAIN ENTITIES
-- ============================================================================

-- Authors table
CREATE TABLE IF NOT EXISTS authors (
    id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    picture_url TEXT
);

-- Books table
-- author_id is nullable: deleting an author clears the reference instead of
-- deleting the book (ON DELETE SET NULL). booksCount / averageSalesPerBook
-- are never stored; they are recomputed from this graph on every read.
CREATE TABLE IF NOT EXISTS books (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    picture_url TEXT,
    year_published INTEGER NOT NULL DEFAULT 1970,
    author_id TEXT,

    -- Timestamps
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,

    FOREIGN KEY (author_id) REFERENCES authors(id) ON DELETE SET NULL
);

-- Clients table
CREATE TABLE IF NOT EXISTS clients (
    id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    mail TEXT,
    photo_link TEXT
);

-- Sells table: one row per purchase event. The row's existence is the sole
-- signal used for sold counts and per-book sale averages.
-- No cascade here: a book or client with recorded sales cannot be deleted.
CREATE TABLE IF NOT EXISTS sells (
    id TEXT PRIMARY KEY,
    date TEXT NOT NULL,
    client_id TEXT NOT NULL,
    book_id TEXT NOT NULL,
    FOREIGN KEY (client_id) REFERENCES clients(id),
    FOREIGN KEY (book_id) REFERENCES books(id)
);

-- ============================================================================
-- INDEXES
-- ============================================================================

-- Title search and the fixed (title, id) listing order
CREATE INDEX IF NOT EXISTS idx_books_title ON books(title, id);

-- Author filter on book listings, and the nullification on author delete
CREATE INDEX IF NOT EXISTS idx_books_author ON books(author_id);

-- Sale aggregation per book, purchases per client
CREATE INDEX IF NOT EXISTS idx_sells_book ON sells(book_id);
CREATE INDEX IF NOT EXISTS idx_sells_client ON sells(client_id);

-- Author listing order
CREATE INDEX IF NOT EXISTS idx_authors_name ON authors(last_name, first_name);
        "#,
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::storage::database::Database;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        // Opening an already-migrated database must be a no-op
        db.migrate().await.expect("Re-running migrations failed");

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(db.pool())
            .await
            .expect("Failed to count migrations");

        assert_eq!(applied, 1);
    }
}
