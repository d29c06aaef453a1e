//! Binds each catalog entity type to its HTTP surface.
//!
//! The handlers in [`crate::handlers::catalog`] are written once over
//! [`Resource`]; this module says where each type lives in the URL space,
//! which service serves it and which referenced rows must exist before a
//! write is accepted.

use async_trait::async_trait;
use mediashelf_core::entity::CatalogEntity;
use mediashelf_core::error::CoreError;
use mediashelf_core::service::CatalogService;
use mediashelf_core::types::DbId;
use mediashelf_db::models::{
    Book, BookCategory, Episode, FromInput, Game, Genre, Movie, MovieInput, Music, Program,
    Season, Show, ShowInput, Song,
};
use mediashelf_db::Catalog;

/// An entity type exposed under `/api/v1`.
#[async_trait]
pub trait Resource: FromInput {
    /// Plural, kebab-case path segment.
    const PATH: &'static str;

    /// Path segment of the owning type. Scoped types are added under
    /// `/{PARENT_PATH}/{id}/{PATH}` instead of `/{PATH}`.
    const PARENT_PATH: Option<&'static str> = None;

    fn service(catalog: &Catalog) -> &CatalogService<Self>;

    /// Fails with not-found unless the owning row exists.
    async fn require_parent(_catalog: &Catalog, _parent_id: DbId) -> Result<(), CoreError> {
        Ok(())
    }

    /// Fails with not-found if the input points at rows that do not exist.
    async fn check_references(_catalog: &Catalog, _input: &Self::Input) -> Result<(), CoreError> {
        Ok(())
    }
}

async fn require_row<P: CatalogEntity>(
    service: &CatalogService<P>,
    id: DbId,
) -> Result<(), CoreError> {
    if service.exists(id).await? {
        Ok(())
    } else {
        Err(CoreError::NotFound {
            entity: P::KIND.name(),
            id,
        })
    }
}

async fn require_genres(catalog: &Catalog, genres: &[DbId]) -> Result<(), CoreError> {
    for &id in genres {
        require_row(&catalog.genres, id).await?;
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Global types
-------------------------------------------------------------------------- */

#[async_trait]
impl Resource for Genre {
    const PATH: &'static str = "genres";

    fn service(catalog: &Catalog) -> &CatalogService<Self> {
        &catalog.genres
    }
}

#[async_trait]
impl Resource for Movie {
    const PATH: &'static str = "movies";

    fn service(catalog: &Catalog) -> &CatalogService<Self> {
        &catalog.movies
    }

    async fn check_references(catalog: &Catalog, input: &MovieInput) -> Result<(), CoreError> {
        require_genres(catalog, &input.genres).await
    }
}

#[async_trait]
impl Resource for Show {
    const PATH: &'static str = "shows";

    fn service(catalog: &Catalog) -> &CatalogService<Self> {
        &catalog.shows
    }

    async fn check_references(catalog: &Catalog, input: &ShowInput) -> Result<(), CoreError> {
        require_genres(catalog, &input.genres).await
    }
}

#[async_trait]
impl Resource for Music {
    const PATH: &'static str = "music";

    fn service(catalog: &Catalog) -> &CatalogService<Self> {
        &catalog.music
    }
}

#[async_trait]
impl Resource for BookCategory {
    const PATH: &'static str = "book-categories";

    fn service(catalog: &Catalog) -> &CatalogService<Self> {
        &catalog.book_categories
    }
}

#[async_trait]
impl Resource for Game {
    const PATH: &'static str = "games";

    fn service(catalog: &Catalog) -> &CatalogService<Self> {
        &catalog.games
    }
}

#[async_trait]
impl Resource for Program {
    const PATH: &'static str = "programs";

    fn service(catalog: &Catalog) -> &CatalogService<Self> {
        &catalog.programs
    }
}

/* --------------------------------------------------------------------------
Scoped types
-------------------------------------------------------------------------- */

#[async_trait]
impl Resource for Season {
    const PATH: &'static str = "seasons";
    const PARENT_PATH: Option<&'static str> = Some(Show::PATH);

    fn service(catalog: &Catalog) -> &CatalogService<Self> {
        &catalog.seasons
    }

    async fn require_parent(catalog: &Catalog, show_id: DbId) -> Result<(), CoreError> {
        require_row(&catalog.shows, show_id).await
    }
}

#[async_trait]
impl Resource for Episode {
    const PATH: &'static str = "episodes";
    const PARENT_PATH: Option<&'static str> = Some(Season::PATH);

    fn service(catalog: &Catalog) -> &CatalogService<Self> {
        &catalog.episodes
    }

    async fn require_parent(catalog: &Catalog, season_id: DbId) -> Result<(), CoreError> {
        require_row(&catalog.seasons, season_id).await
    }
}

#[async_trait]
impl Resource for Song {
    const PATH: &'static str = "songs";
    const PARENT_PATH: Option<&'static str> = Some(Music::PATH);

    fn service(catalog: &Catalog) -> &CatalogService<Self> {
        &catalog.songs
    }

    async fn require_parent(catalog: &Catalog, music_id: DbId) -> Result<(), CoreError> {
        require_row(&catalog.music, music_id).await
    }
}

#[async_trait]
impl Resource for Book {
    const PATH: &'static str = "books";
    const PARENT_PATH: Option<&'static str> = Some(BookCategory::PATH);

    fn service(catalog: &Catalog) -> &CatalogService<Self> {
        &catalog.books
    }

    async fn require_parent(catalog: &Catalog, category_id: DbId) -> Result<(), CoreError> {
        require_row(&catalog.book_categories, category_id).await
    }
}

