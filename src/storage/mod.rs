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


//! Database storage and models
//!
//! This module handles all database operations using SQLite via sqlx.
//!
//! # Database Schema
//! - authors: first/last name, optional picture URL
//! - books: title, optional description/picture, publication year, nullable
//!   author reference (cleared when the author is deleted)
//! - clients: first/last name, optional mail and photo link
//! - sells: one purchase event per row, referencing a client and a book
//!
//! # Usage Example
//! ```no_run
//! use bookstore_core::storage::{queries, Database};
//! use bookstore_core::storage::models::{NewAuthor, NewBook};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create database
//! let db = Database::new("./bookstore.db").await?;
//!
//! // Insert an author and one of their books
//! let author_id = queries::insert_author(db.pool(), &NewAuthor::new("Jane", "Austen")).await?;
//! let book_id = queries::insert_book(db.pool(), &NewBook::new("Emma"), &author_id).await?;
//!
//! // Read it back
//! let book = queries::find_book_by_id(db.pool(), &book_id).await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod graph;
pub mod migrations;
pub mod models;
pub mod queries;

// Re-export commonly used types
pub use database::Database;
pub use graph::{AuthorGraph, BookGraph, BookView, PurchaseView};
pub use models::{
    Author, AuthorPatch, AuthorRef, AuthorUpdate, Book, BookUpdate, Client, ClientUpdate,
    NewAuthor, NewBook, NewClient, NewSale, Sale,
};
