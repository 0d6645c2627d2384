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


//! Derived author statistics
//!
//! Pure functions over a hydrated [`AuthorGraph`] - no store access, no side
//! effects. The statistics are never persisted; they are recomputed from the
//! current book/sale graph on every read so they cannot drift.

use crate::storage::graph::AuthorGraph;
use serde::Serialize;

/// Derived statistics for one author
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorStats {
    /// Live count of books referencing the author
    pub books_count: i64,
    /// Total sale records across the author's books, divided by the book
    /// count. Unrounded; rounding for display is a presentation concern.
    pub average_sales_per_book: f64,
}

/// Compute an author's statistics from their hydrated graph
///
/// An author with zero books has both statistics at 0 (no division by zero).
/// A book with an empty sales vector contributes 0 to the total.
pub fn author_stats(graph: &AuthorGraph) -> AuthorStats {
    let books_count = graph.books.len() as i64;

    if books_count == 0 {
        return AuthorStats {
            books_count: 0,
            average_sales_per_book: 0.0,
        };
    }

    let total_sales: usize = graph.books.iter().map(|b| b.sales.len()).sum();

    AuthorStats {
        books_count,
        average_sales_per_book: total_sales as f64 / books_count as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::graph::BookGraph;
    use crate::storage::models::{Author, Book, Sale};
    use chrono::{NaiveDate, Utc};

    fn author(id: &str) -> Author {
        Author {
            id: id.to_string(),
            first_name: "Jane".to_string(),
            last_name: "Austen".to_string(),
            picture_url: None,
        }
    }

    fn book(id: &str, author_id: &str) -> Book {
        let now = Utc::now();
        Book {
            id: id.to_string(),
            title: format!("Book {id}"),
            description: None,
            picture_url: None,
            year_published: 1970,
            author_id: Some(author_id.to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    fn sales(book_id: &str, count: usize) -> Vec<Sale> {
        (0..count)
            .map(|n| Sale {
                id: format!("{book_id}-sale-{n}"),
                date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("bad date"),
                client_id: "client".to_string(),
                book_id: book_id.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_author_with_no_books_has_zero_stats() {
        let graph = AuthorGraph {
            author: author("a1"),
            books: vec![],
        };

        let stats = author_stats(&graph);
        assert_eq!(stats.books_count, 0);
        assert_eq!(stats.average_sales_per_book, 0.0);
    }

    #[test]
    fn test_average_is_total_sales_over_book_count() {
        let graph = AuthorGraph {
            author: author("a1"),
            books: vec![
                BookGraph {
                    book: book("b1", "a1"),
                    sales: sales("b1", 3),
                },
                BookGraph {
                    book: book("b2", "a1"),
                    sales: sales("b2", 1),
                },
            ],
        };

        let stats = author_stats(&graph);
        assert_eq!(stats.books_count, 2);
        assert_eq!(stats.average_sales_per_book, 2.0);
    }

    #[test]
    fn test_book_without_sales_contributes_zero() {
        let graph = AuthorGraph {
            author: author("a1"),
            books: vec![
                BookGraph {
                    book: book("b1", "a1"),
                    sales: sales("b1", 1),
                },
                BookGraph {
                    book: book("b2", "a1"),
                    sales: vec![],
                },
            ],
        };

        let stats = author_stats(&graph);
        assert_eq!(stats.books_count, 2);
        assert_eq!(stats.average_sales_per_book, 0.5);
    }

    #[test]
    fn test_average_is_not_truncated() {
        let graph = AuthorGraph {
            author: author("a1"),
            books: vec![
                BookGraph {
                    book: book("b1", "a1"),
                    sales: sales("b1", 1),
                },
                BookGraph {
                    book: book("b2", "a1"),
                    sales: sales("b2", 0),
                },
                BookGraph {
                    book: book("b3", "a1"),
                    sales: sales("b3", 1),
                },
            ],
        };

        let stats = author_stats(&graph);
        assert!((stats.average_sales_per_book - 2.0 / 3.0).abs() < f64::EPSILON);
    }
}
