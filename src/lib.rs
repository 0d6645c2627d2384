//! Bookstore management core
//!
//! Storage, relation loading, derived statistics, pagination/search and the
//! mutation pipeline for a bookstore backend: authors, books, clients and
//! sales over SQLite. The HTTP routing layer sits on top of this crate - it
//! parses path/query parameters into the typed inputs here and serializes
//! the returned views to JSON.
//!
//! # Example
//! ```no_run
//! use bookstore_core::{AuthorService, BookService, Database};
//! use bookstore_core::storage::models::{NewAuthor, NewBook};
//!
//! # async fn example() -> bookstore_core::Result<()> {
//! let db = Database::new(Database::default_path()).await?;
//!
//! let authors = AuthorService::new(db.clone());
//! let jane = authors.create(NewAuthor::new("Jane", "Austen")).await?;
//!
//! let books = BookService::new(db);
//! let mut emma = NewBook::new("Emma");
//! emma.author_id = Some(jane.id.clone());
//! books.create(emma, None).await?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod error;
pub mod storage;

// Re-export the service layer and common types at the crate root
pub use catalog::{
    author_stats, AuthorDetails, AuthorService, AuthorStats, AuthorSummary, BookQuery,
    BookService, ClientService, Page,
};
pub use error::{BookstoreError, Result};
pub use storage::Database;
