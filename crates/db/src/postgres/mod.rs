//! PostgreSQL adapter for the [`OrderedStore`] port.
//!
//! One generic [`PgStore`] serves every catalog table. Per-table knowledge
//! (table name, editable columns, scope column, child rows) is supplied by
//! the [`PgEntity`] impls in [`tables`].
//!
//! Every write runs in a single transaction. The `(scope, position)` unique
//! constraints are deferred, so swaps and compaction may pass through
//! transient duplicates; they are checked at commit. Position writes are
//! conditioned on the positions they were planned against and report a
//! [`StoreError::Conflict`] when another writer moved a row first.

pub mod tables;

use std::marker::PhantomData;

use async_trait::async_trait;
use mediashelf_core::entity::{CatalogEntity, Scope};
use mediashelf_core::ordering::{PositionChange, PositionSwap, ScopeStats, Slot};
use mediashelf_core::store::{OrderedStore, StoreError, StoreResult};
use mediashelf_core::types::{DbId, Position};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};

/// Columns every catalog table carries, in select order.
const META_COLUMNS: &[&str] = &["id", "position", "created_at", "updated_at"];

/// A bindable column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    OptText(Option<String>),
    Int(i32),
    OptInt(Option<i32>),
    OptBigInt(Option<DbId>),
    Bool(bool),
    TextList(Vec<String>),
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: Value) {
    match value {
        Value::Text(v) => qb.push_bind(v),
        Value::OptText(v) => qb.push_bind(v),
        Value::Int(v) => qb.push_bind(v),
        Value::OptInt(v) => qb.push_bind(v),
        Value::OptBigInt(v) => qb.push_bind(v),
        Value::Bool(v) => qb.push_bind(v),
        Value::TextList(v) => qb.push_bind(v),
    };
}

/// Table mapping of a catalog entity.
#[async_trait]
pub trait PgEntity: CatalogEntity + for<'r> FromRow<'r, PgRow> + Unpin {
    const TABLE: &'static str;

    /// Editable columns, in the order [`PgEntity::values`] returns them.
    /// Excludes the metadata and scope columns.
    const COLUMNS: &'static [&'static str];

    /// Foreign key to the owning parent, for scoped tables.
    const SCOPE_COLUMN: Option<&'static str> = None;

    fn values(&self) -> Vec<Value>;

    /// Fill in embedded child rows (media, genre links) after a select.
    async fn load_children(_conn: &mut PgConnection, _rows: &mut [Self]) -> sqlx::Result<()> {
        Ok(())
    }

    /// Replace the embedded child rows of row `id` with those of `row`.
    async fn save_children(_conn: &mut PgConnection, _id: DbId, _row: &Self) -> sqlx::Result<()> {
        Ok(())
    }

    /// Copy the separately stored child rows of `from` under `to`.
    async fn copy_children(_conn: &mut PgConnection, _from: DbId, _to: DbId) -> sqlx::Result<()> {
        Ok(())
    }
}

fn select_list<E: PgEntity>() -> String {
    META_COLUMNS
        .iter()
        .chain(E::SCOPE_COLUMN.iter())
        .chain(E::COLUMNS.iter())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

fn order_by<E: PgEntity>() -> String {
    match E::SCOPE_COLUMN {
        Some(column) => format!(" ORDER BY {column}, position, id"),
        None => " ORDER BY position, id".to_string(),
    }
}

fn push_scope_filter<E: PgEntity>(qb: &mut QueryBuilder<'_, Postgres>, scope: Scope) {
    match (E::SCOPE_COLUMN, scope) {
        (Some(column), Scope::Parent(id)) => {
            qb.push(format!(" WHERE {column} = "));
            qb.push_bind(id);
        }
        (Some(column), Scope::Global) => {
            qb.push(format!(" WHERE {column} IS NULL"));
        }
        (None, Scope::Parent(_)) => {
            qb.push(" WHERE FALSE");
        }
        (None, Scope::Global) => {}
    }
}

/// Map a driver error onto the port's taxonomy.
///
/// Unique and foreign-key violations mean a concurrent writer changed the
/// rows this operation was planned against.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or("unknown");
        match db_err.code().as_deref() {
            Some("23505") => {
                return StoreError::Conflict(format!("unique constraint {constraint} violated"));
            }
            Some("23503") => {
                return StoreError::Conflict(format!(
                    "referenced row no longer exists ({constraint})"
                ));
            }
            Some("40001") => {
                return StoreError::Conflict("serialization failure".to_string());
            }
            _ => {}
        }
    }
    StoreError::backend(err)
}

/// Generic PostgreSQL store for one catalog table.
pub struct PgStore<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> PgStore<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

impl<E> std::fmt::Debug for PgStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore")
            .field("entity", &std::any::type_name::<E>())
            .finish()
    }
}

impl<E: PgEntity> PgStore<E> {
    async fn insert_row(conn: &mut PgConnection, entity: &E) -> StoreResult<E> {
        let mut columns: Vec<&str> = Vec::new();
        let mut values = Vec::new();
        if let Some(column) = E::SCOPE_COLUMN {
            columns.push(column);
            values.push(Value::OptBigInt(entity.scope().parent_id()));
        }
        let own = entity.values();
        debug_assert_eq!(own.len(), E::COLUMNS.len());
        columns.extend_from_slice(E::COLUMNS);
        values.extend(own);
        columns.push("position");
        values.push(Value::Int(entity.position()));

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            E::TABLE,
            columns.join(", ")
        ));
        for (index, value) in values.into_iter().enumerate() {
            if index > 0 {
                qb.push(", ");
            }
            push_value(&mut qb, value);
        }
        qb.push(format!(") RETURNING {}", select_list::<E>()));

        let mut saved = qb
            .build_query_as::<E>()
            .fetch_one(&mut *conn)
            .await
            .map_err(store_error)?;
        let id = saved
            .id()
            .ok_or_else(|| StoreError::Backend("insert returned no id".into()))?;

        E::save_children(conn, id, entity)
            .await
            .map_err(store_error)?;
        E::load_children(conn, std::slice::from_mut(&mut saved))
            .await
            .map_err(store_error)?;
        Ok(saved)
    }

    async fn fetch_rows(
        conn: &mut PgConnection,
        mut qb: QueryBuilder<'_, Postgres>,
    ) -> StoreResult<Vec<E>> {
        let mut rows = qb
            .build_query_as::<E>()
            .fetch_all(&mut *conn)
            .await
            .map_err(store_error)?;
        E::load_children(conn, &mut rows)
            .await
            .map_err(store_error)?;
        Ok(rows)
    }
}

#[async_trait]
impl<E: PgEntity> OrderedStore<E> for PgStore<E> {
    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<E>> {
        let mut conn = self.pool.acquire().await.map_err(store_error)?;
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM {} WHERE id = ",
            select_list::<E>(),
            E::TABLE
        ));
        qb.push_bind(id);
        Ok(Self::fetch_rows(&mut conn, qb).await?.into_iter().next())
    }

    async fn find_all(&self) -> StoreResult<Vec<E>> {
        let mut conn = self.pool.acquire().await.map_err(store_error)?;
        let qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM {}{}",
            select_list::<E>(),
            E::TABLE,
            order_by::<E>()
        ));
        Self::fetch_rows(&mut conn, qb).await
    }

    async fn find_in_scope(&self, scope: Scope) -> StoreResult<Vec<E>> {
        let mut conn = self.pool.acquire().await.map_err(store_error)?;
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM {}",
            select_list::<E>(),
            E::TABLE
        ));
        push_scope_filter::<E>(&mut qb, scope);
        qb.push(" ORDER BY position, id");
        Self::fetch_rows(&mut conn, qb).await
    }

    async fn scope_stats(&self, scope: Scope) -> StoreResult<ScopeStats> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT COUNT(*), MAX(position) FROM {}",
            E::TABLE
        ));
        push_scope_filter::<E>(&mut qb, scope);
        let (count, max_position) = qb
            .build_query_as::<(i64, Option<Position>)>()
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(ScopeStats {
            count,
            max_position,
        })
    }

    async fn scope_slots(&self, scope: Scope) -> StoreResult<Vec<Slot>> {
        let mut qb =
            QueryBuilder::<Postgres>::new(format!("SELECT id, position FROM {}", E::TABLE));
        push_scope_filter::<E>(&mut qb, scope);
        qb.push(" ORDER BY position, id");
        let rows = qb
            .build_query_as::<(DbId, Position)>()
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(rows
            .into_iter()
            .map(|(id, position)| Slot { id, position })
            .collect())
    }

    async fn all_slots(&self) -> StoreResult<Vec<(Scope, Slot)>> {
        let scope_expr = E::SCOPE_COLUMN.unwrap_or("NULL::BIGINT");
        let query = format!("SELECT {scope_expr}, id, position FROM {}", E::TABLE);
        let rows = sqlx::query_as::<_, (Option<DbId>, DbId, Position)>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(rows
            .into_iter()
            .map(|(parent, id, position)| (Scope::from(parent), Slot { id, position }))
            .collect())
    }

    async fn insert(&self, entity: E) -> StoreResult<E> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        let saved = Self::insert_row(&mut tx, &entity).await?;
        tx.commit().await.map_err(store_error)?;
        Ok(saved)
    }

    async fn insert_duplicate(&self, source_id: DbId, copy: E) -> StoreResult<E> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        let saved = Self::insert_row(&mut tx, &copy).await?;
        if let Some(id) = saved.id() {
            E::copy_children(&mut tx, source_id, id)
                .await
                .map_err(store_error)?;
        }
        tx.commit().await.map_err(store_error)?;
        Ok(saved)
    }

    async fn update(&self, entity: E) -> StoreResult<Option<E>> {
        let Some(id) = entity.id() else {
            return Ok(None);
        };
        let values = entity.values();
        debug_assert_eq!(values.len(), E::COLUMNS.len());

        let mut qb = QueryBuilder::<Postgres>::new(format!("UPDATE {} SET ", E::TABLE));
        for (column, value) in E::COLUMNS.iter().zip(values) {
            qb.push(format!("{column} = "));
            push_value(&mut qb, value);
            qb.push(", ");
        }
        qb.push("updated_at = now() WHERE id = ");
        qb.push_bind(id);
        qb.push(format!(" RETURNING {}", select_list::<E>()));

        let mut tx = self.pool.begin().await.map_err(store_error)?;
        let Some(mut saved) = qb
            .build_query_as::<E>()
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_error)?
        else {
            return Ok(None);
        };
        E::save_children(&mut tx, id, &entity)
            .await
            .map_err(store_error)?;
        E::load_children(&mut tx, std::slice::from_mut(&mut saved))
            .await
            .map_err(store_error)?;
        tx.commit().await.map_err(store_error)?;
        Ok(Some(saved))
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        let query = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        let result = sqlx::query(&query)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let query = format!("DELETE FROM {}", E::TABLE);
        let result = sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected())
    }

    async fn swap_positions(&self, swap: PositionSwap) -> StoreResult<()> {
        let PositionSwap { moving, neighbor } = swap;
        let query = format!(
            "UPDATE {} SET position = CASE id WHEN $1 THEN $2 ELSE $3 END \
             WHERE (id = $1 AND position = $3) OR (id = $4 AND position = $2)",
            E::TABLE
        );

        let mut tx = self.pool.begin().await.map_err(store_error)?;
        let result = sqlx::query(&query)
            .bind(moving.id)
            .bind(neighbor.position)
            .bind(moving.position)
            .bind(neighbor.id)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;
        if result.rows_affected() != 2 {
            return Err(StoreError::Conflict(format!(
                "rows {} and {} changed position concurrently",
                moving.id, neighbor.id
            )));
        }
        tx.commit().await.map_err(store_error)
    }

    async fn assign_positions(&self, changes: &[PositionChange]) -> StoreResult<()> {
        let query = format!(
            "UPDATE {} SET position = $1 WHERE id = $2 AND position = $3",
            E::TABLE
        );

        let mut tx = self.pool.begin().await.map_err(store_error)?;
        for change in changes {
            let result = sqlx::query(&query)
                .bind(change.to)
                .bind(change.id)
                .bind(change.from)
                .execute(&mut *tx)
                .await
                .map_err(store_error)?;
            if result.rows_affected() != 1 {
                return Err(StoreError::Conflict(format!(
                    "row {} no longer holds position {}",
                    change.id, change.from
                )));
            }
        }
        tx.commit().await.map_err(store_error)
    }
}
