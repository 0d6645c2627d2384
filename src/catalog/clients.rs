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


//! Client operations and sale recording ("buy book")
//!
//! A sale links an existing client to an existing book; both references are
//! checked before the insert and the row's foreign keys make a dangling sale
//! impossible even under races. A recorded sale is immediately visible to
//! aggregate queries.

use crate::catalog::validate_id;
use crate::error::{BookstoreError, Result};
use crate::storage::graph::{self, PurchaseView};
use crate::storage::models::{Client, ClientUpdate, NewClient, NewSale, Sale};
use crate::storage::{queries, Database};
use chrono::Utc;
use log::{debug, warn};

/// Client service - CRUD, purchase history and sale recording
#[derive(Debug, Clone)]
pub struct ClientService {
    db: Database,
}

impl ClientService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// List all clients
    pub async fn list(&self) -> Result<Vec<Client>> {
        queries::list_clients(self.db.pool()).await
    }

    /// Get one client
    pub async fn get(&self, id: &str) -> Result<Client> {
        validate_id("client", id)?;

        queries::find_client_by_id(self.db.pool(), id)
            .await?
            .ok_or_else(|| BookstoreError::not_found("client", id))
    }

    /// Create a client
    pub async fn create(&self, client: NewClient) -> Result<Client> {
        let id = queries::insert_client(self.db.pool(), &client).await?;
        debug!("create_client: created client {id}");

        queries::find_client_by_id(self.db.pool(), &id)
            .await?
            .ok_or_else(|| {
                BookstoreError::DatabaseError(format!("client {id} not found after creation"))
            })
    }

    /// Apply a partial update and return the fresh entity
    pub async fn update(&self, id: &str, patch: ClientUpdate) -> Result<Client> {
        validate_id("client", id)?;

        let updated = queries::update_client(self.db.pool(), id, &patch).await?;
        if !updated {
            warn!("update_client: client {id} not found");
            return Err(BookstoreError::not_found("client", id));
        }
        debug!("update_client: patched client {id}");

        queries::find_client_by_id(self.db.pool(), id)
            .await?
            .ok_or_else(|| BookstoreError::not_found("client", id))
    }

    /// Delete a client
    pub async fn delete(&self, id: &str) -> Result<()> {
        validate_id("client", id)?;

        match queries::delete_client(self.db.pool(), id).await {
            Ok(true) => {
                debug!("delete_client: deleted client {id}");
                Ok(())
            }
            Ok(false) => {
                warn!("delete_client: client {id} not found");
                Err(BookstoreError::not_found("client", id))
            }
            Err(e) if e.is_foreign_key_violation() => Err(BookstoreError::StillReferenced {
                entity: "client",
                id: id.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    /// A client's purchase history with books hydrated, newest first
    pub async fn purchases(&self, id: &str) -> Result<Vec<PurchaseView>> {
        validate_id("client", id)?;

        // Distinguish "no purchases" from "no such client"
        if queries::find_client_by_id(self.db.pool(), id).await?.is_none() {
            return Err(BookstoreError::not_found("client", id));
        }

        graph::load_purchases(self.db.pool(), id).await
    }

    /// Record a sale: the client buys the book
    ///
    /// Fails with a reference error if either id does not resolve; the date
    /// defaults to today when absent.
    pub async fn sell_book(&self, sale: NewSale) -> Result<Sale> {
        validate_id("client", &sale.client_id)?;
        validate_id("book", &sale.book_id)?;

        if queries::find_client_by_id(self.db.pool(), &sale.client_id)
            .await?
            .is_none()
        {
            return Err(BookstoreError::reference("client", &sale.client_id));
        }
        if queries::find_book_by_id(self.db.pool(), &sale.book_id)
            .await?
            .is_none()
        {
            return Err(BookstoreError::reference("book", &sale.book_id));
        }

        let date = sale.date.unwrap_or_else(|| Utc::now().date_naive());
        let id = queries::insert_sale(self.db.pool(), &sale.client_id, &sale.book_id, date).await?;
        debug!(
            "sell_book: client {} bought book {} (sale {id})",
            sale.client_id, sale.book_id
        );

        queries::find_sale_by_id(self.db.pool(), &id)
            .await?
            .ok_or_else(|| {
                BookstoreError::DatabaseError(format!("sale {id} not found after creation"))
            })
    }
}
