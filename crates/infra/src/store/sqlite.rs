//! SQLite-backed warehouse store.
//!
//! ## Schema
//!
//! Tables are created idempotently on connect; there is no migration tooling.
//! `warehouses.name` carries a `UNIQUE` constraint and `items.warehouse_id` a
//! foreign key with `ON DELETE CASCADE`, so the database itself enforces name
//! uniqueness and parent existence. `AUTOINCREMENT` keeps ids from ever being
//! reused, which means a deleted item id stays unreachable.
//!
//! ## Error Mapping
//!
//! | SQLite failure | StoreError |
//! |----------------|------------|
//! | unique violation on `warehouses.name` | `DuplicateName` |
//! | foreign key violation on `items.warehouse_id` | `WarehouseMissing` |
//! | no row matched by an update/delete | `NotFound` |
//! | anything else | `Backend` |
//!
//! ## Transactions
//!
//! Every trait method runs inside one transaction. Reads that touch both
//! tables share a snapshot; cascade delete removes the items and the
//! warehouse row before a single commit.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, Sqlite, Transaction};
use tracing::instrument;

use stockroom_core::{ItemId, WarehouseId};
use stockroom_inventory::{Item, NewItem, NewWarehouse, Warehouse, WarehouseChange};

use super::{StoreError, WarehouseStore};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS warehouses (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT    NOT NULL UNIQUE,
        location    TEXT    NOT NULL DEFAULT '',
        description TEXT    NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS items (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        name         TEXT    NOT NULL,
        quantity     REAL    NOT NULL DEFAULT 0 CHECK (quantity >= 0),
        warehouse_id INTEGER NOT NULL REFERENCES warehouses(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_items_warehouse_id ON items (warehouse_id)",
];

/// SQLite-backed warehouse store.
///
/// `SqlitePool` is `Send + Sync` and cheap to clone, so the store can be
/// shared behind an `Arc` by every request.
#[derive(Debug, Clone)]
pub struct SqliteWarehouseStore {
    pool: SqlitePool,
}

impl SqliteWarehouseStore {
    /// Connect to `database_url` and create the schema if needed.
    ///
    /// In-memory URLs (`sqlite::memory:`) get a single connection that is
    /// never recycled; otherwise each new connection would see an empty
    /// database.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| map_sqlx_error("parse_url", e))?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self::new(pool);
        store.init_schema().await?;
        tracing::info!(in_memory, "sqlite warehouse store ready");
        Ok(store)
    }

    /// Wrap an existing pool. The caller is responsible for `init_schema`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn init_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("init_schema", e))?;
        }
        Ok(())
    }

    async fn begin(&self) -> Result<Transaction<'static, Sqlite>, StoreError> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))
    }
}

#[async_trait]
impl WarehouseStore for SqliteWarehouseStore {
    #[instrument(skip(self, new), fields(name = %new.name), level = "debug")]
    async fn insert_warehouse(&self, new: NewWarehouse) -> Result<Warehouse, StoreError> {
        let mut tx = self.begin().await?;

        let result = sqlx::query(
            "INSERT INTO warehouses (name, location, description) VALUES (?1, ?2, ?3)",
        )
        .bind(new.name.as_str())
        .bind(&new.location)
        .bind(&new.description)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateName(new.name.to_string())
            } else {
                map_sqlx_error("insert_warehouse", e)
            }
        })?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(Warehouse::from_parts(
            WarehouseId::new(result.last_insert_rowid()),
            new.name.into_inner(),
            new.location,
            new.description,
            Vec::new(),
        ))
    }

    #[instrument(skip(self), fields(warehouse_id = %id), level = "debug")]
    async fn find_warehouse(&self, id: WarehouseId) -> Result<Option<Warehouse>, StoreError> {
        let mut tx = self.begin().await?;

        let row = sqlx::query_as::<_, WarehouseRow>(
            "SELECT id, name, location, description FROM warehouses WHERE id = ?1",
        )
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("find_warehouse", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let items = items_of(&mut tx, id).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(Some(row.into_warehouse(items)))
    }

    #[instrument(skip(self), level = "debug")]
    async fn find_all_warehouses(&self) -> Result<Vec<Warehouse>, StoreError> {
        let mut tx = self.begin().await?;

        let rows = sqlx::query_as::<_, WarehouseRow>(
            "SELECT id, name, location, description FROM warehouses ORDER BY id ASC",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("find_all_warehouses", e))?;

        let item_rows = sqlx::query_as::<_, ItemRow>(
            "SELECT id, name, quantity, warehouse_id FROM items ORDER BY id ASC",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("find_all_items", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        let mut by_warehouse: HashMap<i64, Vec<Item>> = HashMap::new();
        for row in item_rows {
            by_warehouse
                .entry(row.warehouse_id)
                .or_default()
                .push(row.into_item());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = by_warehouse.remove(&row.id).unwrap_or_default();
                row.into_warehouse(items)
            })
            .collect())
    }

    #[instrument(skip(self), level = "debug")]
    async fn find_warehouse_by_name(&self, name: &str) -> Result<Option<Warehouse>, StoreError> {
        let mut tx = self.begin().await?;

        let row = sqlx::query_as::<_, WarehouseRow>(
            "SELECT id, name, location, description FROM warehouses WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("find_warehouse_by_name", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let items = items_of(&mut tx, WarehouseId::new(row.id)).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(Some(row.into_warehouse(items)))
    }

    #[instrument(skip(self, change), fields(warehouse_id = %id), level = "debug")]
    async fn update_warehouse(&self, id: WarehouseId, change: &WarehouseChange) -> Result<Warehouse, StoreError> {
        let mut tx = self.begin().await?;

        // NULL binds keep the column's current value.
        let row = sqlx::query_as::<_, WarehouseRow>(
            r#"
            UPDATE warehouses
               SET name        = COALESCE(?1, name),
                   location    = COALESCE(?2, location),
                   description = COALESCE(?3, description)
             WHERE id = ?4
            RETURNING id, name, location, description
            "#,
        )
        .bind(change.name.as_ref().map(|name| name.as_str()))
        .bind(change.location.as_deref())
        .bind(change.description.as_deref())
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| match &change.name {
            Some(name) if is_unique_violation(&e) => StoreError::DuplicateName(name.to_string()),
            _ => map_sqlx_error("update_warehouse", e),
        })?;

        let Some(row) = row else {
            return Err(StoreError::NotFound);
        };
        let items = items_of(&mut tx, id).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(row.into_warehouse(items))
    }

    #[instrument(skip(self), fields(warehouse_id = %id), level = "debug")]
    async fn delete_warehouse(&self, id: WarehouseId) -> Result<(), StoreError> {
        let mut tx = self.begin().await?;

        // Explicit even though the foreign key cascades: the cascade must not
        // depend on the connection's foreign_keys pragma.
        let removed_items = sqlx::query("DELETE FROM items WHERE warehouse_id = ?1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_items", e))?
            .rows_affected();

        let result = sqlx::query("DELETE FROM warehouses WHERE id = ?1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_warehouse", e))?;

        if result.rows_affected() == 0 {
            // Dropping `tx` rolls back.
            return Err(StoreError::NotFound);
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        tracing::debug!(removed_items, "warehouse deleted");
        Ok(())
    }

    #[instrument(skip(self, new), fields(warehouse_id = %warehouse_id), level = "debug")]
    async fn insert_item(&self, warehouse_id: WarehouseId, new: NewItem) -> Result<Item, StoreError> {
        let mut tx = self.begin().await?;

        let result = sqlx::query(
            "INSERT INTO items (name, quantity, warehouse_id) VALUES (?1, ?2, ?3)",
        )
        .bind(&new.name)
        .bind(new.quantity)
        .bind(warehouse_id.get())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::WarehouseMissing
            } else {
                map_sqlx_error("insert_item", e)
            }
        })?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(Item::from_parts(
            ItemId::new(result.last_insert_rowid()),
            new.name,
            new.quantity,
            warehouse_id,
        ))
    }

    #[instrument(skip(self), fields(item_id = %id), level = "debug")]
    async fn find_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query_as::<_, ItemRow>(
            "SELECT id, name, quantity, warehouse_id FROM items WHERE id = ?1",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_item", e))?;

        Ok(row.map(ItemRow::into_item))
    }

    #[instrument(skip(self), fields(warehouse_id = %warehouse_id), level = "debug")]
    async fn find_items_by_warehouse(&self, warehouse_id: WarehouseId) -> Result<Vec<Item>, StoreError> {
        let mut tx = self.begin().await?;
        let items = items_of(&mut tx, warehouse_id).await?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(items)
    }

    #[instrument(skip(self), fields(warehouse_id = %warehouse_id, item_id = %item_id), level = "debug")]
    async fn delete_item(&self, warehouse_id: WarehouseId, item_id: ItemId) -> Result<(), StoreError> {
        let mut tx = self.begin().await?;

        let result = sqlx::query("DELETE FROM items WHERE id = ?1 AND warehouse_id = ?2")
            .bind(item_id.get())
            .bind(warehouse_id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_item", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }
}

async fn items_of(
    tx: &mut Transaction<'static, Sqlite>,
    warehouse_id: WarehouseId,
) -> Result<Vec<Item>, StoreError> {
    let rows = sqlx::query_as::<_, ItemRow>(
        "SELECT id, name, quantity, warehouse_id FROM items WHERE warehouse_id = ?1 ORDER BY id ASC",
    )
    .bind(warehouse_id.get())
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("find_items_by_warehouse", e))?;

    Ok(rows.into_iter().map(ItemRow::into_item).collect())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            StoreError::Backend(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Backend(format!("connection pool timed out in {operation}"))
        }
        other => StoreError::Backend(format!("{operation}: {other}")),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_foreign_key_violation())
}

// SQLx row types

#[derive(Debug, FromRow)]
struct WarehouseRow {
    id: i64,
    name: String,
    location: String,
    description: String,
}

impl WarehouseRow {
    fn into_warehouse(self, items: Vec<Item>) -> Warehouse {
        Warehouse::from_parts(
            WarehouseId::new(self.id),
            self.name,
            self.location,
            self.description,
            items,
        )
    }
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: i64,
    name: String,
    quantity: f64,
    warehouse_id: i64,
}

impl ItemRow {
    fn into_item(self) -> Item {
        Item::from_parts(
            ItemId::new(self.id),
            self.name,
            self.quantity,
            WarehouseId::new(self.warehouse_id),
        )
    }
}
