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


//! Relation loading
//!
//! Hydrates entity graphs to an explicit depth. Each loader's return type
//! states exactly which relations are populated - there is no lazy loading
//! and no hidden per-row queries: the books for a whole set of authors are
//! fetched with one statement, the sales for a whole set of books with
//! another.
//!
//! Collection relations always hydrate to a `Vec` (empty when there is
//! nothing to load), never to a missing field. The single-valued
//! book-to-author relation hydrates to `Option<AuthorRef>`: `None` when the
//! book has no author, `Unloaded(id)` when only the reference is known.

use crate::error::{BookstoreError, Result};
use crate::storage::models::{Author, AuthorRef, Book, Sale};
use crate::storage::queries;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;

/// A book with its sales hydrated
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookGraph {
    #[serde(flatten)]
    pub book: Book,
    pub sales: Vec<Sale>,
}

/// An author with books and their sales hydrated (the stats input graph)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorGraph {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<BookGraph>,
}

/// A book with its author relation hydrated
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    #[serde(flatten)]
    pub book: Book,
    pub author: Option<AuthorRef>,
}

/// A sale with its book hydrated (a client's purchase)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseView {
    #[serde(flatten)]
    pub sale: Sale,
    pub book: Book,
}

/// Hydrate a set of authors with their books and sales
///
/// Input order is preserved. Authors without books get an empty `books`
/// vector; books without sales get an empty `sales` vector.
pub async fn hydrate_authors(pool: &SqlitePool, authors: Vec<Author>) -> Result<Vec<AuthorGraph>> {
    let author_ids: Vec<String> = authors.iter().map(|a| a.id.clone()).collect();
    let books = queries::find_books_by_authors(pool, &author_ids).await?;

    let book_ids: Vec<String> = books.iter().map(|b| b.id.clone()).collect();
    let sales = queries::find_sales_by_books(pool, &book_ids).await?;

    let mut sales_by_book: HashMap<String, Vec<Sale>> = HashMap::new();
    for sale in sales {
        sales_by_book.entry(sale.book_id.clone()).or_default().push(sale);
    }

    let mut books_by_author: HashMap<String, Vec<BookGraph>> = HashMap::new();
    for book in books {
        let sales = sales_by_book.remove(&book.id).unwrap_or_default();
        // find_books_by_authors only returns rows with a non-null author_id
        if let Some(author_id) = book.author_id.clone() {
            books_by_author
                .entry(author_id)
                .or_default()
                .push(BookGraph { book, sales });
        }
    }

    let graphs = authors
        .into_iter()
        .map(|author| {
            let books = books_by_author.remove(&author.id).unwrap_or_default();
            AuthorGraph { author, books }
        })
        .collect();

    Ok(graphs)
}

/// Load one author with books and sales, `None` if the id does not resolve
pub async fn load_author_graph(pool: &SqlitePool, id: &str) -> Result<Option<AuthorGraph>> {
    let Some(author) = queries::find_author_by_id(pool, id).await? else {
        return Ok(None);
    };

    let mut graphs = hydrate_authors(pool, vec![author]).await?;
    Ok(graphs.pop())
}

/// Load all authors with books and sales, in the fixed listing order
pub async fn load_all_author_graphs(pool: &SqlitePool) -> Result<Vec<AuthorGraph>> {
    let authors = queries::list_authors(pool).await?;
    hydrate_authors(pool, authors).await
}

/// Hydrate the author relation on a page of books
///
/// One batch lookup for all distinct author ids on the page; books without
/// an author keep `None`.
pub async fn attach_authors(pool: &SqlitePool, books: Vec<Book>) -> Result<Vec<BookView>> {
    let mut author_ids: Vec<String> = books.iter().filter_map(|b| b.author_id.clone()).collect();
    author_ids.sort();
    author_ids.dedup();

    let authors = queries::find_authors_by_ids(pool, &author_ids).await?;
    let by_id: HashMap<String, Author> =
        authors.into_iter().map(|a| (a.id.clone(), a)).collect();

    let views = books
        .into_iter()
        .map(|book| {
            let author = book
                .author_id
                .as_ref()
                .map(|id| match by_id.get(id) {
                    Some(author) => AuthorRef::Loaded(author.clone()),
                    None => AuthorRef::unloaded(id.clone()),
                });
            BookView { book, author }
        })
        .collect();

    Ok(views)
}

/// Load one book with its author hydrated, `None` if the id does not resolve
pub async fn load_book_view(pool: &SqlitePool, id: &str) -> Result<Option<BookView>> {
    let Some(book) = queries::find_book_by_id(pool, id).await? else {
        return Ok(None);
    };

    let mut views = attach_authors(pool, vec![book]).await?;
    Ok(views.pop())
}

/// Load a client's purchases with their books hydrated, newest first
pub async fn load_purchases(pool: &SqlitePool, client_id: &str) -> Result<Vec<PurchaseView>> {
    let sales = queries::list_sales_by_client(pool, client_id).await?;

    let mut book_ids: Vec<String> = sales.iter().map(|s| s.book_id.clone()).collect();
    book_ids.sort();
    book_ids.dedup();

    let books = queries::find_books_by_ids(pool, &book_ids).await?;
    let by_id: HashMap<String, Book> = books.into_iter().map(|b| (b.id.clone(), b)).collect();

    sales
        .into_iter()
        .map(|sale| {
            let book = by_id.get(&sale.book_id).cloned().ok_or_else(|| {
                BookstoreError::DatabaseError(format!(
                    "sale {} references missing book {}",
                    sale.id, sale.book_id
                ))
            })?;
            Ok(PurchaseView { sale, book })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::Database;
    use crate::storage::models::{NewAuthor, NewBook, NewClient};

    async fn seed_author(db: &Database, first: &str, last: &str) -> String {
        queries::insert_author(db.pool(), &NewAuthor::new(first, last))
            .await
            .expect("Failed to insert author")
    }

    #[tokio::test]
    async fn test_author_graph_hydrates_books_and_sales() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let author_id = seed_author(&db, "Jane", "Austen").await;
        let book_id = queries::insert_book(db.pool(), &NewBook::new("Emma"), &author_id)
            .await
            .expect("Failed to insert book");
        let client_id = queries::insert_client(db.pool(), &NewClient::new("Ada", "Lovelace"))
            .await
            .expect("Failed to insert client");

        let date = chrono::NaiveDate::from_ymd_opt(2025, 1, 2).expect("bad date");
        queries::insert_sale(db.pool(), &client_id, &book_id, date)
            .await
            .expect("Failed to insert sale");

        let graph = load_author_graph(db.pool(), &author_id)
            .await
            .expect("Failed to load graph")
            .expect("Author missing");

        assert_eq!(graph.books.len(), 1);
        assert_eq!(graph.books[0].book.title, "Emma");
        assert_eq!(graph.books[0].sales.len(), 1);
    }

    #[tokio::test]
    async fn test_author_graph_empty_relations_are_empty_vecs() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let author_id = seed_author(&db, "Jane", "Austen").await;

        let graph = load_author_graph(db.pool(), &author_id)
            .await
            .expect("Failed to load graph")
            .expect("Author missing");

        assert!(graph.books.is_empty());
    }

    #[tokio::test]
    async fn test_load_author_graph_missing_root_is_none() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let graph = load_author_graph(db.pool(), "no-such-id")
            .await
            .expect("Failed to load graph");
        assert!(graph.is_none());
    }

    #[tokio::test]
    async fn test_book_view_hydrates_author() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let author_id = seed_author(&db, "Jane", "Austen").await;
        let book_id = queries::insert_book(db.pool(), &NewBook::new("Emma"), &author_id)
            .await
            .expect("Failed to insert book");

        let view = load_book_view(db.pool(), &book_id)
            .await
            .expect("Failed to load view")
            .expect("Book missing");

        let author = view.author.expect("author relation missing");
        assert_eq!(author.id(), author_id);
        assert_eq!(
            author.loaded().map(|a| a.last_name.as_str()),
            Some("Austen")
        );
    }

    #[tokio::test]
    async fn test_book_view_without_author_is_none() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let author_id = seed_author(&db, "Jane", "Austen").await;
        let book_id = queries::insert_book(db.pool(), &NewBook::new("Emma"), &author_id)
            .await
            .expect("Failed to insert book");
        queries::delete_author(db.pool(), &author_id)
            .await
            .expect("Failed to delete author");

        let view = load_book_view(db.pool(), &book_id)
            .await
            .expect("Failed to load view")
            .expect("Book missing");

        assert!(view.author.is_none());
    }
}
