//! In-memory adapter for the [`OrderedStore`] port.
//!
//! Backs local development (`STORAGE_BACKEND=memory`) and the test suites.
//! All tables live behind one async mutex, so every port call is a single
//! critical section. The adapter enforces the same rules as the PostgreSQL
//! schema: unique `(scope, position)`, owned children cascading on delete,
//! referenced parents and genres having to exist, and position writes
//! conditioned on the positions they were planned against.

mod tables;

use std::collections::{BTreeMap, HashSet};
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mediashelf_core::entity::{CatalogEntity, Scope};
use mediashelf_core::ordering::{PositionChange, PositionSwap, ScopeStats, Slot};
use mediashelf_core::store::{OrderedStore, StoreError, StoreResult};
use mediashelf_core::types::{DbId, Position};
use tokio::sync::Mutex;

use crate::models::{
    Book, BookCategory, Episode, Game, Genre, Movie, Music, Program, Season, Show, Song,
};

/// Rows of one entity type keyed by id, plus its id sequence.
#[derive(Debug)]
pub struct Table<E> {
    rows: BTreeMap<DbId, E>,
    last_id: DbId,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<E: CatalogEntity> Table<E> {
    fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, id: DbId) -> bool {
        self.rows.contains_key(&id)
    }

    fn sorted<'a>(&self, rows: impl Iterator<Item = &'a E>) -> Vec<E> {
        let mut rows: Vec<E> = rows.cloned().collect();
        rows.sort_by_key(|row| (row.scope(), row.position(), row.id()));
        rows
    }

    fn in_scope(&self, scope: Scope) -> impl Iterator<Item = &E> {
        self.rows.values().filter(move |row| row.scope() == scope)
    }

    fn position_taken(&self, scope: Scope, position: Position) -> bool {
        self.in_scope(scope).any(|row| row.position() == position)
    }

    /// Store a new row under a fresh id with fresh timestamps.
    fn insert_new(&mut self, mut row: E) -> E {
        let id = self.next_id();
        let now = Utc::now();
        let meta = row.meta_mut();
        meta.id = Some(id);
        meta.created_at = Some(now);
        meta.updated_at = Some(now);
        self.rows.insert(id, row.clone());
        row
    }
}

/// Every catalog table.
#[derive(Debug, Default)]
pub struct Tables {
    pub genres: Table<Genre>,
    pub movies: Table<Movie>,
    pub shows: Table<Show>,
    pub seasons: Table<Season>,
    pub episodes: Table<Episode>,
    pub music: Table<Music>,
    pub songs: Table<Song>,
    pub book_categories: Table<BookCategory>,
    pub books: Table<Book>,
    pub games: Table<Game>,
    pub programs: Table<Program>,
    last_medium_id: DbId,
}

impl Tables {
    fn next_medium_id(&mut self) -> DbId {
        self.last_medium_id += 1;
        self.last_medium_id
    }
}

/// Shared in-memory database handed to every [`MemoryStore`].
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    tables: Mutex<Tables>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Table access and relational rules of an entity held in memory.
pub trait MemoryEntity: CatalogEntity {
    fn table(tables: &Tables) -> &Table<Self>;

    fn table_mut(tables: &mut Tables) -> &mut Table<Self>;

    /// Fail unless the parent and any referenced rows exist.
    fn check_references(&self, _tables: &Tables) -> StoreResult<()> {
        Ok(())
    }

    /// Give embedded children without an id a fresh one.
    fn assign_child_ids(&mut self, _tables: &mut Tables) {}

    /// Carry the scope of the stored row over to a replacement.
    fn keep_scope(&mut self, _stored: &Self) {}

    /// Copy the separately stored children of `from` under `to`.
    fn copy_children(_tables: &mut Tables, _from: DbId, _to: DbId) {}

    /// Delete everything row `id` owns, and links pointing at it.
    fn remove_children(_tables: &mut Tables, _id: DbId) {}
}

/// Conflict raised when a referenced row is missing, matching the foreign
/// key violation the PostgreSQL adapter reports.
pub(crate) fn missing_reference(what: &str, id: DbId) -> StoreError {
    StoreError::Conflict(format!("referenced {what} {id} no longer exists"))
}

/// [`OrderedStore`] over one table of a [`MemoryDatabase`].
pub struct MemoryStore<E> {
    db: Arc<MemoryDatabase>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> MemoryStore<E> {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

impl<E> std::fmt::Debug for MemoryStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entity", &std::any::type_name::<E>())
            .finish()
    }
}

fn insert_row<E: MemoryEntity>(tables: &mut Tables, mut entity: E) -> StoreResult<E> {
    entity.check_references(tables)?;
    let table = E::table(tables);
    if table.position_taken(entity.scope(), entity.position()) {
        return Err(StoreError::Conflict(format!(
            "position {} already taken in {} ({})",
            entity.position(),
            E::KIND,
            entity.scope()
        )));
    }
    entity.assign_child_ids(tables);
    Ok(E::table_mut(tables).insert_new(entity))
}

#[async_trait]
impl<E: MemoryEntity> OrderedStore<E> for MemoryStore<E> {
    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<E>> {
        let tables = self.db.tables.lock().await;
        Ok(E::table(&tables).rows.get(&id).cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<E>> {
        let tables = self.db.tables.lock().await;
        let table = E::table(&tables);
        Ok(table.sorted(table.rows.values()))
    }

    async fn find_in_scope(&self, scope: Scope) -> StoreResult<Vec<E>> {
        let tables = self.db.tables.lock().await;
        let table = E::table(&tables);
        Ok(table.sorted(table.in_scope(scope)))
    }

    async fn scope_stats(&self, scope: Scope) -> StoreResult<ScopeStats> {
        let tables = self.db.tables.lock().await;
        let table = E::table(&tables);
        let mut stats = ScopeStats::default();
        for row in table.in_scope(scope) {
            stats.count += 1;
            stats.max_position = stats.max_position.max(Some(row.position()));
        }
        Ok(stats)
    }

    async fn scope_slots(&self, scope: Scope) -> StoreResult<Vec<Slot>> {
        let tables = self.db.tables.lock().await;
        let table = E::table(&tables);
        Ok(table
            .sorted(table.in_scope(scope))
            .iter()
            .filter_map(slot)
            .collect())
    }

    async fn all_slots(&self) -> StoreResult<Vec<(Scope, Slot)>> {
        let tables = self.db.tables.lock().await;
        Ok(E::table(&tables)
            .rows
            .values()
            .filter_map(|row| slot(row).map(|s| (row.scope(), s)))
            .collect())
    }

    async fn insert(&self, entity: E) -> StoreResult<E> {
        let mut tables = self.db.tables.lock().await;
        insert_row(&mut tables, entity)
    }

    async fn insert_duplicate(&self, source_id: DbId, copy: E) -> StoreResult<E> {
        let mut tables = self.db.tables.lock().await;
        let saved = insert_row(&mut tables, copy)?;
        if let Some(id) = saved.id() {
            E::copy_children(&mut tables, source_id, id);
        }
        Ok(saved)
    }

    async fn update(&self, entity: E) -> StoreResult<Option<E>> {
        let Some(id) = entity.id() else {
            return Ok(None);
        };
        let mut tables = self.db.tables.lock().await;
        let Some(stored) = E::table(&tables).rows.get(&id).cloned() else {
            return Ok(None);
        };

        let mut entity = entity;
        entity.keep_scope(&stored);
        entity.check_references(&tables)?;
        entity.assign_child_ids(&mut tables);
        let meta = entity.meta_mut();
        meta.position = stored.position();
        meta.created_at = stored.meta().created_at;
        meta.updated_at = Some(Utc::now());

        E::table_mut(&mut tables).rows.insert(id, entity.clone());
        Ok(Some(entity))
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        let mut tables = self.db.tables.lock().await;
        if E::table_mut(&mut tables).rows.remove(&id).is_none() {
            return Ok(false);
        }
        E::remove_children(&mut tables, id);
        Ok(true)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let mut tables = self.db.tables.lock().await;
        let ids: Vec<DbId> = E::table(&tables).rows.keys().copied().collect();
        E::table_mut(&mut tables).rows.clear();
        for &id in &ids {
            E::remove_children(&mut tables, id);
        }
        Ok(ids.len() as u64)
    }

    async fn swap_positions(&self, swap: PositionSwap) -> StoreResult<()> {
        let PositionSwap { moving, neighbor } = swap;
        let mut tables = self.db.tables.lock().await;
        let table = E::table_mut(&mut tables);

        let holds = |slot: Slot| {
            table
                .rows
                .get(&slot.id)
                .is_some_and(|row| row.position() == slot.position)
        };
        if !(holds(moving) && holds(neighbor)) {
            return Err(StoreError::Conflict(format!(
                "rows {} and {} changed position concurrently",
                moving.id, neighbor.id
            )));
        }

        for (id, position) in [
            (moving.id, neighbor.position),
            (neighbor.id, moving.position),
        ] {
            if let Some(row) = table.rows.get_mut(&id) {
                row.set_position(position);
            }
        }
        Ok(())
    }

    async fn assign_positions(&self, changes: &[PositionChange]) -> StoreResult<()> {
        let mut tables = self.db.tables.lock().await;
        let table = E::table_mut(&mut tables);

        for change in changes {
            let current = table.rows.get(&change.id).map(|row| row.position());
            if current != Some(change.from) {
                return Err(StoreError::Conflict(format!(
                    "row {} no longer holds position {}",
                    change.id, change.from
                )));
            }
        }

        // Checked as a whole before anything is written.
        let mut after: BTreeMap<DbId, (Scope, Position)> = table
            .rows
            .iter()
            .map(|(&id, row)| (id, (row.scope(), row.position())))
            .collect();
        for change in changes {
            if let Some(entry) = after.get_mut(&change.id) {
                entry.1 = change.to;
            }
        }
        let mut seen = HashSet::new();
        if let Some((scope, position)) = after.values().find(|&&key| !seen.insert(key)) {
            return Err(StoreError::Conflict(format!(
                "position {position} would be taken twice in {} ({scope})",
                E::KIND
            )));
        }

        for change in changes {
            if let Some(row) = table.rows.get_mut(&change.id) {
                row.set_position(change.to);
            }
        }
        Ok(())
    }
}

fn slot<E: CatalogEntity>(row: &E) -> Option<Slot> {
    row.id().map(|id| Slot {
        id,
        position: row.position(),
    })
}
