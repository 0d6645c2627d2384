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


//! Database connection and management
//!
//! This module handles database connection pooling, initialization, and
//! maintenance for the bookstore schema.
//!
//! # SQLite Configuration
//! - WAL mode for better concurrency
//! - Foreign keys enabled (required for the `ON DELETE SET NULL` rule that
//!   clears a book's author reference when the author is deleted)
//! - Normal synchronous mode (balance safety/speed)

use crate::error::{BookstoreError, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    ConnectOptions,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Database manager - handles connection pooling and operations
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    path: Option<PathBuf>, // None for in-memory databases
}

impl Database {
    /// Create new database connection with migrations
    ///
    /// # Arguments
    /// * `database_path` - Path to SQLite database file (will be created if doesn't exist)
    ///
    /// # Errors
    /// Returns error if:
    /// - Parent directory doesn't exist and can't be created
    /// - Database file can't be opened
    /// - Migrations fail
    pub async fn new<P: AsRef<Path>>(database_path: P) -> Result<Self> {
        let path = database_path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    BookstoreError::DatabaseError(format!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        // Create connection options
        let connection_string = format!("sqlite://{}?mode=rwc", path.display());
        let mut connect_opts = SqliteConnectOptions::from_str(&connection_string)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .foreign_keys(true)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        // Disable statement logging; the catalog layer logs at operation level
        connect_opts = connect_opts.disable_statement_logging();

        // Create connection pool
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(connect_opts)
            .await?;

        // Run migrations
        let db = Self {
            pool,
            path: Some(path.to_path_buf()),
        };
        db.migrate().await?;

        Ok(db)
    }

    /// Create in-memory database for testing
    ///
    /// # Errors
    /// Returns error if database creation or migration fails
    pub async fn new_in_memory() -> Result<Self> {
        let connect_opts = SqliteConnectOptions::from_str("sqlite::memory:")?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .foreign_keys(true)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(1) // In-memory DB typically single-threaded
            .connect_with(connect_opts)
            .await?;

        let db = Self { pool, path: None };
        db.migrate().await?;

        Ok(db)
    }

    /// Run database migrations
    ///
    /// Applies all pending migrations to bring the database schema up to date.
    /// Migrations are run automatically when creating a new database connection.
    pub async fn migrate(&self) -> Result<()> {
        crate::storage::migrations::run_migrations(&self.pool)
            .await
            .map_err(|e| BookstoreError::MigrationFailed(e.to_string()))?;

        Ok(())
    }

    /// Get reference to the connection pool
    ///
    /// Use this to execute queries directly on the pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get database file path
    ///
    /// Returns `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close database and release all connections
    ///
    /// This will wait for all active connections to finish before closing.
    pub async fn close(self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }

    /// Get default database path for the platform
    ///
    /// Returns platform-specific application data directory path:
    /// - macOS: ~/Library/Application Support/Bookstore/bookstore.db
    /// - Linux: ~/.local/share/bookstore/bookstore.db
    /// - Windows: %APPDATA%/Bookstore/bookstore.db
    pub fn default_path() -> PathBuf {
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("Bookstore")
                .join("bookstore.db")
        }

        #[cfg(target_os = "linux")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("bookstore")
                .join("bookstore.db")
        }

        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("Bookstore").join("bookstore.db")
        }

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            PathBuf::from("./bookstore.db")
        }
    }

    /// Check database integrity
    ///
    /// Runs SQLite integrity check and returns true if database is okay.
    pub async fn check_integrity(&self) -> Result<bool> {
        let result: String = sqlx::query_scalar("PRAGMA integrity_check")
            .fetch_one(&self.pool)
            .await?;

        Ok(result == "ok")
    }
}
