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


//! Database models for the bookstore
//!
//! Row models map 1:1 to the tables created in `migrations.rs`; insert and
//! patch structs carry caller input. Patch fields on required columns are
//! plain `Option`s: `None` means "leave unchanged". Nullable columns use the
//! double-`Option` idiom instead, so the *presence* of the key governs the
//! change: absent leaves the column alone, an explicit null clears it, a
//! value replaces it. The book's author relation resolves the same idiom to
//! the tri-state `AuthorPatch`, which additionally gets existence-checked.
//!
//! # SQLite Adaptations
//! - Identifiers are UUIDv4 strings stored as TEXT
//! - Dates stored as TEXT in ISO 8601 format
//!
//! # JSON shape
//! Author and Book types serialize camelCase (`firstName`, `yearPublished`);
//! Client keeps its snake_case wire fields (`first_name`, `photo_link`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// Default publication year when a book is created without one
pub const DEFAULT_YEAR_PUBLISHED: i64 = 1970;

// ============================================================================
// ROW MODELS
// ============================================================================

/// Author entity
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[sqlx(default)]
    pub picture_url: Option<String>,
}

/// Book entity
///
/// `author_id` is the raw foreign key column; hydrated views expose the
/// relation as an [`AuthorRef`] instead, so the column itself stays out of
/// the JSON shape.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    #[sqlx(default)]
    pub description: Option<String>,
    #[sqlx(default)]
    pub picture_url: Option<String>,
    pub year_published: i64,
    #[sqlx(default)]
    #[serde(skip_serializing, default)]
    pub author_id: Option<String>,

    // Timestamps
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client entity
///
/// Wire fields are snake_case, unlike authors and books.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[sqlx(default)]
    pub mail: Option<String>,
    #[sqlx(default)]
    pub photo_link: Option<String>,
}

/// Sale entity - one purchase event linking a client and a book
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub date: NaiveDate,
    pub client_id: String,
    pub book_id: String,
}

// ============================================================================
// RELATION REFERENCES
// ============================================================================

/// A book's author relation: either just the identifier or the loaded entity
///
/// Replaces the "bare id cast to an entity shape" pattern: a relation field
/// is explicitly `Unloaded(id)` or `Loaded(entity)`, with accessor behavior
/// defined for each state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorRef {
    /// Full author entity has been hydrated
    Loaded(Author),
    /// Only the identifier is known; serializes as `{"id": "..."}`
    Unloaded { id: String },
}

impl AuthorRef {
    pub fn unloaded<S: Into<String>>(id: S) -> Self {
        AuthorRef::Unloaded { id: id.into() }
    }

    /// The referenced author's id, loaded or not
    pub fn id(&self) -> &str {
        match self {
            AuthorRef::Loaded(author) => &author.id,
            AuthorRef::Unloaded { id } => id,
        }
    }

    /// The hydrated entity, `None` while unloaded
    pub fn loaded(&self) -> Option<&Author> {
        match self {
            AuthorRef::Loaded(author) => Some(author),
            AuthorRef::Unloaded { .. } => None,
        }
    }
}

// ============================================================================
// NEW RECORD STRUCTS (for inserts)
// ============================================================================

/// New author record for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuthor {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub picture_url: Option<String>,
}

impl NewAuthor {
    pub fn new<S: Into<String>>(first_name: S, last_name: S) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            picture_url: None,
        }
    }
}

/// New book record for insertion
///
/// `author_id` may come from the request body or from a caller-supplied
/// fallback (a query parameter in the original API); resolution happens in
/// the catalog layer before any write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub picture_url: Option<String>,
    #[serde(default)]
    pub year_published: Option<i64>,
    #[serde(default)]
    pub author_id: Option<String>,
}

impl NewBook {
    pub fn new<S: Into<String>>(title: S) -> Self {
        Self {
            title: title.into(),
            description: None,
            picture_url: None,
            year_published: None,
            author_id: None,
        }
    }
}

/// New client record for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub photo_link: Option<String>,
}

impl NewClient {
    pub fn new<S: Into<String>>(first_name: S, last_name: S) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            mail: None,
            photo_link: None,
        }
    }
}

/// New sale record - "buy book" input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    pub client_id: String,
    pub book_id: String,
    /// Purchase date; defaults to today when absent
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

// ============================================================================
// PATCH STRUCTS (partial updates)
// ============================================================================

/// Partial update for an author
///
/// An explicit null on `picture_url` clears the column; an absent key leaves
/// it unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<Option<String>>,
}

/// Partial update for a client
///
/// `mail` and `photo_link` are nullable: an explicit null clears them, an
/// absent key leaves them unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub mail: Option<Option<String>>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub photo_link: Option<Option<String>>,
}

/// What a book patch does to the author relation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthorPatch {
    /// Key absent from the patch: relation untouched
    #[default]
    Keep,
    /// Key present with null/empty value: relation cleared
    Clear,
    /// Key present with an id: relation replaced wholesale
    Set(String),
}

/// Partial update for a book
///
/// The nullable columns (`description`, `picture_url`, `author_id`) use the
/// double-`Option` idiom to distinguish "key absent" (outer `None`) from
/// "key present but null" (inner `None`). For the author relation an empty
/// or whitespace-only id also clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookUpdate {
    pub title: Option<String>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<Option<String>>,
    pub year_published: Option<i64>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub author_id: Option<Option<String>>,
}

impl BookUpdate {
    /// Resolve the tri-state author relation change from the raw field
    pub fn author_patch(&self) -> AuthorPatch {
        match &self.author_id {
            None => AuthorPatch::Keep,
            Some(None) => AuthorPatch::Clear,
            Some(Some(id)) => {
                let id = id.trim();
                if id.is_empty() {
                    AuthorPatch::Clear
                } else {
                    AuthorPatch::Set(id.to_string())
                }
            }
        }
    }
}

/// Deserialize `Option<Option<T>>` so that an explicit null stays `Some(None)`
fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_update_author_key_absent_keeps_relation() {
        let patch: BookUpdate = serde_json::from_str(r#"{"title": "New Title"}"#)
            .expect("Failed to parse patch");
        assert_eq!(patch.author_patch(), AuthorPatch::Keep);
        assert_eq!(patch.title.as_deref(), Some("New Title"));
    }

    #[test]
    fn test_book_update_description_distinguishes_null_from_absent() {
        let patch: BookUpdate = serde_json::from_str(r#"{"description": null}"#)
            .expect("Failed to parse patch");
        assert_eq!(patch.description, Some(None));

        let patch: BookUpdate = serde_json::from_str(r#"{"title": "Emma"}"#)
            .expect("Failed to parse patch");
        assert_eq!(patch.description, None);

        let patch: BookUpdate = serde_json::from_str(r#"{"description": "A novel"}"#)
            .expect("Failed to parse patch");
        assert_eq!(patch.description, Some(Some("A novel".to_string())));
    }

    #[test]
    fn test_book_update_author_null_clears_relation() {
        let patch: BookUpdate = serde_json::from_str(r#"{"authorId": null}"#)
            .expect("Failed to parse patch");
        assert_eq!(patch.author_patch(), AuthorPatch::Clear);
    }

    #[test]
    fn test_book_update_author_empty_string_clears_relation() {
        let patch: BookUpdate =
            serde_json::from_str(r#"{"title": "Same", "authorId": ""}"#)
                .expect("Failed to parse patch");
        assert_eq!(patch.author_patch(), AuthorPatch::Clear);
    }

    #[test]
    fn test_book_update_author_id_sets_relation() {
        let patch: BookUpdate =
            serde_json::from_str(r#"{"authorId": "3f2a7b1c-0000-4000-8000-000000000001"}"#)
                .expect("Failed to parse patch");
        assert_eq!(
            patch.author_patch(),
            AuthorPatch::Set("3f2a7b1c-0000-4000-8000-000000000001".to_string())
        );
    }

    #[test]
    fn test_author_ref_serialization() {
        let unloaded = AuthorRef::unloaded("abc");
        let json = serde_json::to_value(&unloaded).expect("Failed to serialize");
        assert_eq!(json, serde_json::json!({ "id": "abc" }));

        let loaded = AuthorRef::Loaded(Author {
            id: "abc".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Austen".to_string(),
            picture_url: None,
        });
        assert_eq!(loaded.id(), "abc");
        assert_eq!(loaded.loaded().map(|a| a.first_name.as_str()), Some("Jane"));

        let json = serde_json::to_value(&loaded).expect("Failed to serialize");
        assert_eq!(json["firstName"], "Jane");
    }

    #[test]
    fn test_client_wire_fields_are_snake_case() {
        let client = Client {
            id: "c1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            mail: Some("ada@example.com".to_string()),
            photo_link: None,
        };
        let json = serde_json::to_value(&client).expect("Failed to serialize");
        assert!(json.get("first_name").is_some());
        assert!(json.get("firstName").is_none());
        assert_eq!(json["photo_link"], serde_json::Value::Null);
    }
}
