//! PostgreSQL adapter tests.
//!
//! Each test gets a fresh database with the catalog migrations applied.
//! Ignored by default; run with `DATABASE_URL` set and `--ignored`.

mod common;

use assert_matches::assert_matches;
use common::*;
use mediashelf_core::cache::CacheRegistry;
use mediashelf_core::entity::{CatalogEntity, Scope};
use mediashelf_core::error::CoreError;
use mediashelf_core::ordering::{PositionSwap, Slot};
use mediashelf_core::store::{OrderedStore, StoreError};
use mediashelf_db::models::Game;
use mediashelf_db::postgres::PgStore;
use mediashelf_db::Catalog;
use sqlx::PgPool;

fn catalog(pool: PgPool) -> Catalog {
    Catalog::postgres(pool, &CacheRegistry::default())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_health_check(pool: PgPool) {
    mediashelf_db::health_check(&pool).await.unwrap();
    assert!(catalog(pool).health_check().await.is_ok());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_abc_ordering(pool: PgPool) {
    let catalog = catalog(pool);
    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        ids.push(id_of(&catalog.games.add(game(name)).await.unwrap()));
    }

    catalog.games.move_up(ids[2]).await.unwrap();
    assert_eq!(names(&catalog.games.list().await.unwrap()), ["A", "C", "B"]);
    assert_eq!(catalog.games.update_positions().await.unwrap(), 0);

    assert_matches!(
        catalog.games.move_up(ids[0]).await,
        Err(CoreError::Validation(_))
    );

    let d = catalog.games.add(game("D")).await.unwrap();
    assert_eq!(d.position(), 3);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_gap_then_compaction(pool: PgPool) {
    let catalog = catalog(pool);
    let mut ids = Vec::new();
    for name in ["A", "B", "C", "D"] {
        ids.push(id_of(&catalog.games.add(game(name)).await.unwrap()));
    }
    catalog.games.remove(ids[1]).await.unwrap();

    let e = catalog.games.add(game("E")).await.unwrap();
    assert_eq!(e.position(), 4);

    assert_eq!(catalog.games.update_positions().await.unwrap(), 3);
    let listed = catalog.games.list().await.unwrap();
    assert_eq!(names(&listed), ["A", "C", "D", "E"]);
    assert_eq!(positions(&listed), [0, 1, 2, 3]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_unique_position_is_enforced(pool: PgPool) {
    let store = PgStore::<Game>::new(pool);
    store.insert(game("A")).await.unwrap();
    assert_matches!(
        store.insert(game("B")).await,
        Err(StoreError::Conflict(_))
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_stale_swap_is_rolled_back(pool: PgPool) {
    let store = PgStore::<Game>::new(pool);
    let a = store.insert(game("A")).await.unwrap();
    let mut b = game("B");
    b.set_position(1);
    let b = store.insert(b).await.unwrap();

    let stale = PositionSwap {
        moving: Slot {
            id: id_of(&b),
            position: 5,
        },
        neighbor: Slot {
            id: id_of(&a),
            position: 0,
        },
    };
    assert_matches!(
        store.swap_positions(stale).await,
        Err(StoreError::Conflict(_))
    );
    assert_eq!(store.find_by_id(id_of(&a)).await.unwrap().unwrap().position(), 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_movie_children_round_trip(pool: PgPool) {
    let catalog = catalog(pool);
    let drama = id_of(&catalog.genres.add(genre("Drama")).await.unwrap());
    let scifi = id_of(&catalog.genres.add(genre("Sci-fi")).await.unwrap());
    let saved = catalog
        .movies
        .add(movie("Matrix", &[90, 46], vec![scifi, drama]))
        .await
        .unwrap();

    assert_eq!(saved.genres, vec![scifi, drama]);
    assert_eq!(saved.media.len(), 2);
    assert!(saved.media.iter().all(|m| m.id.is_some()));

    let copy = catalog.movies.duplicate(id_of(&saved)).await.unwrap();
    assert_eq!(copy.position(), 1);
    assert_eq!(copy.genres, saved.genres);
    assert_eq!(
        copy.media.iter().map(|m| m.length).collect::<Vec<_>>(),
        [90, 46]
    );

    catalog.genres.remove(drama).await.unwrap();
    let reloaded = catalog.movies.get(id_of(&saved)).await.unwrap().unwrap();
    assert_eq!(reloaded.genres, vec![scifi]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_show_duplicate_and_cascade(pool: PgPool) {
    let catalog = catalog(pool);
    let lost = id_of(&catalog.shows.add(show("Lost", vec![])).await.unwrap());
    let season_id = id_of(&catalog.seasons.add(season(lost, 1)).await.unwrap());
    catalog.episodes.add(episode(season_id, 1)).await.unwrap();
    catalog.episodes.add(episode(season_id, 2)).await.unwrap();

    let copy = id_of(&catalog.shows.duplicate(lost).await.unwrap());
    let copied_seasons = catalog
        .seasons
        .list_in_scope(Scope::Parent(copy))
        .await
        .unwrap();
    assert_eq!(copied_seasons.len(), 1);
    let copied_episodes = catalog
        .episodes
        .list_in_scope(Scope::Parent(id_of(&copied_seasons[0])))
        .await
        .unwrap();
    assert_eq!(positions(&copied_episodes), [0, 1]);

    catalog.shows.remove(lost).await.unwrap();
    assert!(!catalog.seasons.exists(season_id).await.unwrap());
    assert_eq!(catalog.episodes.list().await.unwrap().len(), 2);
}
