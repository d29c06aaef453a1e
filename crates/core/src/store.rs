//! Storage port for ordered catalog tables.
//!
//! Implementations live in `mediashelf-db` (PostgreSQL and in-memory) and
//! must not leak backend types through this interface. Every method is a
//! single atomic unit: either all of its rows are written or none are.

use async_trait::async_trait;

use crate::entity::{CatalogEntity, Scope};
use crate::ordering::{PositionChange, PositionSwap, ScopeStats, Slot};
use crate::types::DbId;

/// Failure reported by a storage adapter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness rule or a position-conditioned write failed because
    /// another writer got there first. Safe to retry.
    #[error("conflicting write: {0}")]
    Conflict(String),

    /// Anything else the backend reported.
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoreError::Backend(Box::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations for one entity type.
#[async_trait]
pub trait OrderedStore<E: CatalogEntity>: Send + Sync {
    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<E>>;

    /// Every row, ordered by scope, then position, then id.
    async fn find_all(&self) -> StoreResult<Vec<E>>;

    /// Rows of one scope, ordered by position, then id.
    async fn find_in_scope(&self, scope: Scope) -> StoreResult<Vec<E>>;

    /// Sibling count and highest position of a scope.
    async fn scope_stats(&self, scope: Scope) -> StoreResult<ScopeStats>;

    /// Id/position pairs of one scope, ordered by position, then id.
    async fn scope_slots(&self, scope: Scope) -> StoreResult<Vec<Slot>>;

    /// Id/position pairs of every scope.
    async fn all_slots(&self) -> StoreResult<Vec<(Scope, Slot)>>;

    /// Insert a new row at the position it carries, assigning fresh ids to
    /// the row and any embedded children.
    ///
    /// Fails with [`StoreError::Conflict`] if the position is taken.
    async fn insert(&self, entity: E) -> StoreResult<E>;

    /// Insert `copy` like [`OrderedStore::insert`] and, in the same unit,
    /// copy every child row owned by `source_id` under the new row.
    async fn insert_duplicate(&self, source_id: DbId, copy: E) -> StoreResult<E>;

    /// Replace every non-identity column of an existing row, except its
    /// position and scope. Returns `None` if the row does not exist.
    async fn update(&self, entity: E) -> StoreResult<Option<E>>;

    /// Delete a row and everything it owns. Returns whether a row existed.
    async fn delete(&self, id: DbId) -> StoreResult<bool>;

    /// Delete every row of the table. Returns the number of rows deleted.
    async fn delete_all(&self) -> StoreResult<u64>;

    /// Exchange two positions, provided both rows still hold the positions
    /// the swap was planned against.
    async fn swap_positions(&self, swap: PositionSwap) -> StoreResult<()>;

    /// Apply a batch of position rewrites, each conditioned on its `from`.
    async fn assign_positions(&self, changes: &[PositionChange]) -> StoreResult<()>;
}
