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


//! Database query functions
//!
//! Repository-style functions for the four entity tables. Each function is a
//! single statement (or, for author deletion, a single transaction) over a
//! `&SqlitePool`, returning row models from `models.rs`.
//!
//! # Query Patterns
//! - One function per operation, async, `?`-propagating
//! - Mutations return whether a row was affected; "not found" vs. "deleted"
//!   is decided by the catalog layer on top of that
//! - Listing order is fixed regardless of filters so pagination stays stable:
//!   books by `(title, id)`, authors by `(last_name, first_name)`

use crate::error::Result;
use crate::storage::models::*;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Filter for book listings; both fields combine with logical AND
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Case-insensitive substring match on the title
    pub title_contains: Option<String>,
    /// Exact match on the author reference
    pub author_id: Option<String>,
}

// ============================================================================
// AUTHOR QUERIES
// ============================================================================

/// Insert a new author, returning the generated id
pub async fn insert_author(pool: &SqlitePool, author: &NewAuthor) -> Result<String> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        "INSERT INTO authors (id, first_name, last_name, picture_url) VALUES (?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&author.first_name)
    .bind(&author.last_name)
    .bind(&author.picture_url)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Find author by id
pub async fn find_author_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Author>> {
    let author = sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(author)
}

/// Find authors for a set of ids
pub async fn find_authors_by_ids(pool: &SqlitePool, ids: &[String]) -> Result<Vec<Author>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("SELECT * FROM authors WHERE id IN ({placeholders})");

    let mut query = sqlx::query_as::<_, Author>(&sql);
    for id in ids {
        query = query.bind(id);
    }

    let authors = query.fetch_all(pool).await?;

    Ok(authors)
}

/// List all authors in the fixed listing order
pub async fn list_authors(pool: &SqlitePool) -> Result<Vec<Author>> {
    let authors = sqlx::query_as::<_, Author>(
        "SELECT * FROM authors ORDER BY last_name ASC, first_name ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(authors)
}

/// Apply a partial update to an author
///
/// Only supplied fields change; an explicit null clears `picture_url`.
/// Returns false if the id matched no row.
pub async fn update_author(pool: &SqlitePool, id: &str, patch: &AuthorUpdate) -> Result<bool> {
    let mut sql = String::from(
        "UPDATE authors SET \
            first_name = COALESCE(?, first_name), \
            last_name = COALESCE(?, last_name)",
    );
    match &patch.picture_url {
        None => {}
        Some(None) => sql.push_str(", picture_url = NULL"),
        Some(Some(_)) => sql.push_str(", picture_url = ?"),
    }
    sql.push_str(" WHERE id = ?");

    let mut query = sqlx::query(&sql)
        .bind(&patch.first_name)
        .bind(&patch.last_name);
    if let Some(Some(url)) = &patch.picture_url {
        query = query.bind(url);
    }

    let result = query.bind(id).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}

/// Delete an author, clearing the author reference on their books
///
/// Both statements run in one transaction: a concurrent reader either sees
/// the author with their books intact, or neither - never a book pointing at
/// a deleted author. Returns false if the id matched no row.
pub async fn delete_author(pool: &SqlitePool, id: &str) -> Result<bool> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE books SET author_id = NULL WHERE author_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM authors WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}

// ============================================================================
// BOOK QUERIES
// ============================================================================

/// Insert a new book, returning the generated id
///
/// The author reference is passed separately because it is resolved (body
/// value or caller fallback, existence-checked) by the catalog layer before
/// any write happens.
pub async fn insert_book(pool: &SqlitePool, book: &NewBook, author_id: &str) -> Result<String> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO books (id, title, description, picture_url, year_published, author_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&book.title)
    .bind(&book.description)
    .bind(&book.picture_url)
    .bind(book.year_published.unwrap_or(DEFAULT_YEAR_PUBLISHED))
    .bind(author_id)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Find book by id
pub async fn find_book_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(book)
}

/// List one page of books matching the filter
///
/// Ordered by `(title, id)` ascending so pages stay stable across requests.
pub async fn list_books(
    pool: &SqlitePool,
    filter: &BookFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Book>> {
    let mut sql = String::from("SELECT * FROM books WHERE 1=1");
    if filter.title_contains.is_some() {
        sql.push_str(" AND title LIKE ?");
    }
    if filter.author_id.is_some() {
        sql.push_str(" AND author_id = ?");
    }
    sql.push_str(" ORDER BY title ASC, id ASC LIMIT ? OFFSET ?");

    let mut query = sqlx::query_as::<_, Book>(&sql);
    if let Some(search) = &filter.title_contains {
        query = query.bind(format!("%{}%", search));
    }
    if let Some(author_id) = &filter.author_id {
        query = query.bind(author_id);
    }

    let books = query.bind(limit).bind(offset).fetch_all(pool).await?;

    Ok(books)
}

/// Count all books matching the filter (not just the returned page)
pub async fn count_books(pool: &SqlitePool, filter: &BookFilter) -> Result<i64> {
    let mut sql = String::from("SELECT COUNT(*) FROM books WHERE 1=1");
    if filter.title_contains.is_some() {
        sql.push_str(" AND title LIKE ?");
    }
    if filter.author_id.is_some() {
        sql.push_str(" AND author_id = ?");
    }

    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    if let Some(search) = &filter.title_contains {
        query = query.bind(format!("%{}%", search));
    }
    if let Some(author_id) = &filter.author_id {
        query = query.bind(author_id);
    }

    let count = query.fetch_one(pool).await?;

    Ok(count)
}

/// Find all books for a set of authors, in listing order
pub async fn find_books_by_authors(pool: &SqlitePool, author_ids: &[String]) -> Result<Vec<Book>> {
    if author_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; author_ids.len()].join(", ");
    let sql = format!(
        "SELECT * FROM books WHERE author_id IN ({placeholders}) ORDER BY title ASC, id ASC"
    );

    let mut query = sqlx::query_as::<_, Book>(&sql);
    for id in author_ids {
        query = query.bind(id);
    }

    let books = query.fetch_all(pool).await?;

    Ok(books)
}

/// Find books for a set of ids
pub async fn find_books_by_ids(pool: &SqlitePool, ids: &[String]) -> Result<Vec<Book>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("SELECT * FROM books WHERE id IN ({placeholders})");

    let mut query = sqlx::query_as::<_, Book>(&sql);
    for id in ids {
        query = query.bind(id);
    }

    let books = query.fetch_all(pool).await?;

    Ok(books)
}

/// Apply a partial update to a book
///
/// Only supplied fields change; an explicit null clears the nullable
/// columns. The author relation follows the tri-state [`AuthorPatch`] and is
/// replaced wholesale when the patch carries the key. `updated_at` is
/// refreshed on every call. Returns false if the id matched no row.
pub async fn update_book(pool: &SqlitePool, id: &str, patch: &BookUpdate) -> Result<bool> {
    let now = Utc::now();

    let mut sql = String::from(
        "UPDATE books SET \
            title = COALESCE(?, title), \
            year_published = COALESCE(?, year_published), \
            updated_at = ?",
    );
    match &patch.description {
        None => {}
        Some(None) => sql.push_str(", description = NULL"),
        Some(Some(_)) => sql.push_str(", description = ?"),
    }
    match &patch.picture_url {
        None => {}
        Some(None) => sql.push_str(", picture_url = NULL"),
        Some(Some(_)) => sql.push_str(", picture_url = ?"),
    }
    match patch.author_patch() {
        AuthorPatch::Keep => {}
        AuthorPatch::Clear => sql.push_str(", author_id = NULL"),
        AuthorPatch::Set(_) => sql.push_str(", author_id = ?"),
    }
    sql.push_str(" WHERE id = ?");

    let mut query = sqlx::query(&sql)
        .bind(&patch.title)
        .bind(patch.year_published)
        .bind(now);
    if let Some(Some(description)) = &patch.description {
        query = query.bind(description);
    }
    if let Some(Some(url)) = &patch.picture_url {
        query = query.bind(url);
    }
    if let AuthorPatch::Set(author_id) = patch.author_patch() {
        query = query.bind(author_id);
    }

    let result = query.bind(id).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a book
///
/// Returns false if the id matched no row. Fails with a foreign key
/// violation if sale records still reference the book.
pub async fn delete_book(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// ============================================================================
// CLIENT QUERIES
// ============================================================================

/// Insert a new client, returning the generated id
pub async fn insert_client(pool: &SqlitePool, client: &NewClient) -> Result<String> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        "INSERT INTO clients (id, first_name, last_name, mail, photo_link) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&client.first_name)
    .bind(&client.last_name)
    .bind(&client.mail)
    .bind(&client.photo_link)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Find client by id
pub async fn find_client_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Client>> {
    let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(client)
}

/// List all clients
pub async fn list_clients(pool: &SqlitePool) -> Result<Vec<Client>> {
    let clients = sqlx::query_as::<_, Client>(
        "SELECT * FROM clients ORDER BY last_name ASC, first_name ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(clients)
}

/// Apply a partial update to a client
///
/// Only supplied fields change; an explicit null clears `mail` or
/// `photo_link`. Returns false if the id matched no row.
pub async fn update_client(pool: &SqlitePool, id: &str, patch: &ClientUpdate) -> Result<bool> {
    let mut sql = String::from(
        "UPDATE clients SET \
            first_name = COALESCE(?, first_name), \
            last_name = COALESCE(?, last_name)",
    );
    match &patch.mail {
        None => {}
        Some(None) => sql.push_str(", mail = NULL"),
        Some(Some(_)) => sql.push_str(", mail = ?"),
    }
    match &patch.photo_link {
        None => {}
        Some(None) => sql.push_str(", photo_link = NULL"),
        Some(Some(_)) => sql.push_str(", photo_link = ?"),
    }
    sql.push_str(" WHERE id = ?");

    let mut query = sqlx::query(&sql)
        .bind(&patch.first_name)
        .bind(&patch.last_name);
    if let Some(Some(mail)) = &patch.mail {
        query = query.bind(mail);
    }
    if let Some(Some(link)) = &patch.photo_link {
        query = query.bind(link);
    }

    let result = query.bind(id).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a client
///
/// Returns false if the id matched no row. Fails with a foreign key
/// violation if sale records still reference the client.
pub async fn delete_client(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM clients WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// ============================================================================
// SALE QUERIES
// ============================================================================

/// Insert a new sale, returning the generated id
///
/// The foreign keys on `sells` guarantee no orphaned row can be created even
/// if a referenced entity disappears between the catalog layer's existence
/// checks and this insert.
pub async fn insert_sale(
    pool: &SqlitePool,
    client_id: &str,
    book_id: &str,
    date: chrono::NaiveDate,
) -> Result<String> {
    let id = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO sells (id, date, client_id, book_id) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(date)
        .bind(client_id)
        .bind(book_id)
        .execute(pool)
        .await?;

    Ok(id)
}

/// Find sale by id
pub async fn find_sale_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Sale>> {
    let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sells WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(sale)
}

/// List a client's purchases, newest first
pub async fn list_sales_by_client(pool: &SqlitePool, client_id: &str) -> Result<Vec<Sale>> {
    let sales = sqlx::query_as::<_, Sale>(
        "SELECT * FROM sells WHERE client_id = ? ORDER BY date DESC, id ASC",
    )
    .bind(client_id)
    .fetch_all(pool)
    .await?;

    Ok(sales)
}

/// Find all sales for a set of books
pub async fn find_sales_by_books(pool: &SqlitePool, book_ids: &[String]) -> Result<Vec<Sale>> {
    if book_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; book_ids.len()].join(", ");
    let sql = format!("SELECT * FROM sells WHERE book_id IN ({placeholders})");

    let mut query = sqlx::query_as::<_, Sale>(&sql);
    for id in book_ids {
        query = query.bind(id);
    }

    let sales = query.fetch_all(pool).await?;

    Ok(sales)
}
