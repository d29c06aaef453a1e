//! Generic catalog service.
//!
//! One [`CatalogService`] is instantiated per entity type. It runs the
//! ordering mechanism (assign, move, compact, duplicate) against an
//! [`OrderedStore`], reads through the entity family's [`CacheRegion`] and
//! clears that region after every successful write.

use std::sync::Arc;

use crate::cache::{CacheKey, CacheRegion};
use crate::entity::{CatalogEntity, Scope};
use crate::error::CoreError;
use crate::ordering::{self, Direction, MoveError};
use crate::store::{OrderedStore, StoreError};
use crate::types::DbId;

pub struct CatalogService<E: CatalogEntity> {
    store: Arc<dyn OrderedStore<E>>,
    cache: Arc<CacheRegion>,
    /// Regions of other families whose rows embed references to this type.
    dependents: Arc<[Arc<CacheRegion>]>,
}

impl<E: CatalogEntity> Clone for CatalogService<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            dependents: Arc::clone(&self.dependents),
        }
    }
}

impl<E: CatalogEntity> std::fmt::Debug for CatalogService<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("entity", &E::KIND)
            .field("cache", &self.cache)
            .finish()
    }
}

impl<E: CatalogEntity> CatalogService<E> {
    pub fn new(store: Arc<dyn OrderedStore<E>>, cache: Arc<CacheRegion>) -> Self {
        Self {
            store,
            cache,
            dependents: Arc::new([]),
        }
    }

    /// Also clear `regions` after every write.
    pub fn with_dependents(mut self, regions: Vec<Arc<CacheRegion>>) -> Self {
        self.dependents = regions.into();
        self
    }

    fn evict(&self) {
        self.cache.evict_all();
        for region in self.dependents.iter() {
            region.evict_all();
        }
    }

    fn entity() -> &'static str {
        E::KIND.name()
    }

    fn not_found(id: DbId) -> CoreError {
        CoreError::NotFound {
            entity: Self::entity(),
            id,
        }
    }

    /// Translate a storage failure into the service-tier taxonomy.
    fn storage_failure(operation: &'static str, err: StoreError) -> CoreError {
        match err {
            StoreError::Conflict(msg) => {
                tracing::warn!(entity = Self::entity(), operation, error = %msg, "Storage conflict");
                CoreError::Conflict(format!("{} {operation}: {msg}", Self::entity()))
            }
            StoreError::Backend(source) => {
                tracing::error!(entity = Self::entity(), operation, error = %source, "Storage failure");
                CoreError::Internal(format!("{} {operation} failed", Self::entity()))
            }
        }
    }

    fn move_failure(err: MoveError) -> CoreError {
        match err {
            MoveError::NotInScope(id) => Self::not_found(id),
            MoveError::AtEdge { .. } => {
                CoreError::Validation(format!("{} {err}", Self::entity()))
            }
            MoveError::DuplicatePosition { .. } => {
                tracing::error!(entity = Self::entity(), error = %err, "Corrupt ordering scope");
                CoreError::Conflict(format!("{} {err}", Self::entity()))
            }
        }
    }

    /// Load a row straight from storage, bypassing the cache.
    async fn require(&self, id: DbId) -> Result<E, CoreError> {
        self.store
            .find_by_id(id)
            .await
            .map_err(|e| Self::storage_failure("lookup", e))?
            .ok_or_else(|| Self::not_found(id))
    }

    fn persisted_id(entity: &E) -> Result<DbId, CoreError> {
        entity.id().ok_or_else(|| {
            CoreError::InvalidArgument(format!("{} has not been persisted", Self::entity()))
        })
    }

    /* ----------------------------------------------------------------------
    Reads
    ---------------------------------------------------------------------- */

    pub async fn get(&self, id: DbId) -> Result<Option<E>, CoreError> {
        let key = CacheKey::Item(E::KIND, id);
        if let Some(hit) = self.cache.get::<Option<E>>(&key) {
            return Ok(hit);
        }
        let generation = self.cache.generation();
        let row = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| Self::storage_failure("lookup", e))?;
        self.cache.put_if_current(generation, key, row.clone());
        Ok(row)
    }

    /// Every row of the type, ordered by scope and position.
    pub async fn list(&self) -> Result<Vec<E>, CoreError> {
        let key = CacheKey::All(E::KIND);
        if let Some(hit) = self.cache.get::<Vec<E>>(&key) {
            return Ok(hit);
        }
        let generation = self.cache.generation();
        let rows = self
            .store
            .find_all()
            .await
            .map_err(|e| Self::storage_failure("list", e))?;
        self.cache.put_if_current(generation, key, rows.clone());
        Ok(rows)
    }

    /// Rows of one scope in display order.
    pub async fn list_in_scope(&self, scope: Scope) -> Result<Vec<E>, CoreError> {
        let key = CacheKey::Scope(E::KIND, scope);
        if let Some(hit) = self.cache.get::<Vec<E>>(&key) {
            return Ok(hit);
        }
        let generation = self.cache.generation();
        let rows = self
            .store
            .find_in_scope(scope)
            .await
            .map_err(|e| Self::storage_failure("list", e))?;
        self.cache.put_if_current(generation, key, rows.clone());
        Ok(rows)
    }

    pub async fn exists(&self, id: DbId) -> Result<bool, CoreError> {
        Ok(self.get(id).await?.is_some())
    }

    /* ----------------------------------------------------------------------
    Writes
    ---------------------------------------------------------------------- */

    /// Append a new row to the end of its scope.
    pub async fn add(&self, entity: E) -> Result<E, CoreError> {
        if entity.id().is_some() {
            return Err(CoreError::InvalidArgument(format!(
                "new {} must not carry an id",
                Self::entity()
            )));
        }
        let mut entity = entity;
        let scope = entity.scope();
        let stats = self
            .store
            .scope_stats(scope)
            .await
            .map_err(|e| Self::storage_failure("add", e))?;
        entity.set_position(ordering::next_position(stats)?);

        let saved = self
            .store
            .insert(entity)
            .await
            .map_err(|e| Self::storage_failure("add", e))?;
        self.evict();

        tracing::info!(
            entity = Self::entity(),
            id = ?saved.id(),
            position = saved.position(),
            %scope,
            "Entity added",
        );
        Ok(saved)
    }

    /// Replace every field of an existing row except identity, position and
    /// scope.
    pub async fn update(&self, entity: E) -> Result<E, CoreError> {
        let id = Self::persisted_id(&entity)?;
        let saved = self
            .store
            .update(entity)
            .await
            .map_err(|e| Self::storage_failure("update", e))?
            .ok_or_else(|| Self::not_found(id))?;
        self.evict();

        tracing::info!(entity = Self::entity(), id, "Entity updated");
        Ok(saved)
    }

    /// Delete a row and its owned children. Siblings keep their positions.
    pub async fn remove(&self, id: DbId) -> Result<(), CoreError> {
        let deleted = self
            .store
            .delete(id)
            .await
            .map_err(|e| Self::storage_failure("remove", e))?;
        if !deleted {
            return Err(Self::not_found(id));
        }
        self.evict();

        tracing::info!(entity = Self::entity(), id, "Entity removed");
        Ok(())
    }

    /// Delete every row of the type.
    pub async fn clear(&self) -> Result<u64, CoreError> {
        let rows = self
            .store
            .delete_all()
            .await
            .map_err(|e| Self::storage_failure("clear", e))?;
        self.evict();

        tracing::info!(entity = Self::entity(), rows, "Entities cleared");
        Ok(rows)
    }

    pub async fn move_up(&self, id: DbId) -> Result<E, CoreError> {
        self.shift(id, Direction::Up).await
    }

    pub async fn move_down(&self, id: DbId) -> Result<E, CoreError> {
        self.shift(id, Direction::Down).await
    }

    /// Swap a row with its neighbour in `direction`.
    ///
    /// Moving the first row up or the last row down is a validation failure
    /// and leaves storage untouched.
    async fn shift(&self, id: DbId, direction: Direction) -> Result<E, CoreError> {
        let entity = self.require(id).await?;
        let scope = entity.scope();
        let siblings = self
            .store
            .scope_slots(scope)
            .await
            .map_err(|e| Self::storage_failure("move", e))?;

        let swap = ordering::plan_swap(&siblings, id, direction).map_err(Self::move_failure)?;
        self.store
            .swap_positions(swap)
            .await
            .map_err(|e| Self::storage_failure("move", e))?;
        self.evict();

        tracing::info!(
            entity = Self::entity(),
            id,
            direction = direction.as_str(),
            from = swap.moving.position,
            to = swap.neighbor.position,
            neighbor = swap.neighbor.id,
            "Entity moved",
        );

        let mut moved = entity;
        moved.set_position(swap.neighbor.position);
        Ok(moved)
    }

    /// Deep-copy a row (and everything it owns) to the end of its scope.
    pub async fn duplicate(&self, id: DbId) -> Result<E, CoreError> {
        let source = self.require(id).await?;
        let scope = source.scope();

        let mut copy = source.duplicate();
        let stats = self
            .store
            .scope_stats(scope)
            .await
            .map_err(|e| Self::storage_failure("duplicate", e))?;
        copy.set_position(ordering::next_position(stats)?);

        let saved = self
            .store
            .insert_duplicate(id, copy)
            .await
            .map_err(|e| Self::storage_failure("duplicate", e))?;
        self.evict();

        tracing::info!(
            entity = Self::entity(),
            source = id,
            id = ?saved.id(),
            position = saved.position(),
            "Entity duplicated",
        );
        Ok(saved)
    }

    /// Make positions dense and zero-based in every scope of the type.
    ///
    /// Display order is preserved. Returns the number of rows rewritten.
    pub async fn update_positions(&self) -> Result<usize, CoreError> {
        let slots = self
            .store
            .all_slots()
            .await
            .map_err(|e| Self::storage_failure("update positions", e))?;
        let changes = ordering::compact_scopes(slots)?;

        if !changes.is_empty() {
            self.store
                .assign_positions(&changes)
                .await
                .map_err(|e| Self::storage_failure("update positions", e))?;
            self.evict();
        }

        tracing::info!(entity = Self::entity(), rows = changes.len(), "Positions updated");
        Ok(changes.len())
    }
}
