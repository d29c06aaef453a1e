//! The catalog: one [`CatalogService`] per entity type over a shared
//! storage backend and cache registry.

use std::sync::Arc;

use mediashelf_core::cache::CacheRegistry;
use mediashelf_core::entity::EntityKind;
use mediashelf_core::service::CatalogService;
use mediashelf_core::store::OrderedStore;

use crate::memory::{MemoryDatabase, MemoryEntity, MemoryStore};
use crate::models::{
    Book, BookCategory, Episode, Game, Genre, Movie, Music, Program, Season, Show, Song,
};
use crate::postgres::{PgEntity, PgStore};
use crate::DbPool;

/// Where the catalog keeps its rows.
#[derive(Debug, Clone)]
pub enum Backend {
    Postgres(DbPool),
    Memory(Arc<MemoryDatabase>),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Postgres(_) => "postgres",
            Backend::Memory(_) => "memory",
        }
    }

    fn store<E>(&self) -> Arc<dyn OrderedStore<E>>
    where
        E: PgEntity + MemoryEntity,
    {
        match self {
            Backend::Postgres(pool) => Arc::new(PgStore::<E>::new(pool.clone())),
            Backend::Memory(db) => Arc::new(MemoryStore::<E>::new(Arc::clone(db))),
        }
    }
}

/// Every catalog service, sharing one backend.
#[derive(Debug, Clone)]
pub struct Catalog {
    backend: Backend,
    pub genres: CatalogService<Genre>,
    pub movies: CatalogService<Movie>,
    pub shows: CatalogService<Show>,
    pub seasons: CatalogService<Season>,
    pub episodes: CatalogService<Episode>,
    pub music: CatalogService<Music>,
    pub songs: CatalogService<Song>,
    pub book_categories: CatalogService<BookCategory>,
    pub books: CatalogService<Book>,
    pub games: CatalogService<Game>,
    pub programs: CatalogService<Program>,
}

fn service<E>(backend: &Backend, caches: &CacheRegistry) -> CatalogService<E>
where
    E: PgEntity + MemoryEntity,
{
    CatalogService::new(backend.store::<E>(), caches.region_for(E::KIND))
}

impl Catalog {
    pub fn new(backend: Backend, caches: &CacheRegistry) -> Self {
        tracing::info!(backend = backend.name(), "Catalog services initialised");
        Self {
            genres: service(&backend, caches).with_dependents(vec![
                caches.region_for(EntityKind::Movie),
                caches.region_for(EntityKind::Show),
            ]),
            movies: service(&backend, caches),
            shows: service(&backend, caches),
            seasons: service(&backend, caches),
            episodes: service(&backend, caches),
            music: service(&backend, caches),
            songs: service(&backend, caches),
            book_categories: service(&backend, caches),
            books: service(&backend, caches),
            games: service(&backend, caches),
            programs: service(&backend, caches),
            backend,
        }
    }

    /// Catalog over a PostgreSQL pool.
    pub fn postgres(pool: DbPool, caches: &CacheRegistry) -> Self {
        Self::new(Backend::Postgres(pool), caches)
    }

    /// Catalog over a fresh, empty in-memory database.
    pub fn in_memory(caches: &CacheRegistry) -> Self {
        Self::new(Backend::Memory(Arc::new(MemoryDatabase::new())), caches)
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Whether the storage backend is reachable.
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        match &self.backend {
            Backend::Postgres(pool) => crate::health_check(pool).await,
            Backend::Memory(_) => Ok(()),
        }
    }
}
