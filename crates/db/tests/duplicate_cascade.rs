//! Deep copies, cascades and cache coherence through the catalog services
//! (in-memory backend).

mod common;

use assert_matches::assert_matches;
use common::*;
use mediashelf_core::entity::{CatalogEntity, Scope};
use mediashelf_core::error::CoreError;
use mediashelf_db::models::{MovieStats, ShowStats};

// ---------------------------------------------------------------------------
// Duplicate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_movie_copies_fields_and_media() {
    let catalog = memory_catalog();
    let drama = id_of(&catalog.genres.add(genre("Drama")).await.unwrap());
    catalog.movies.add(movie("Alien", &[117], vec![])).await.unwrap();
    let source = catalog
        .movies
        .add(movie("Matrix", &[90, 46], vec![drama]))
        .await
        .unwrap();

    let copy = catalog.movies.duplicate(id_of(&source)).await.unwrap();

    assert_ne!(copy.id(), source.id());
    assert_eq!(copy.position(), 2);
    assert_eq!(copy.czech_name, source.czech_name);
    assert_eq!(copy.languages, source.languages);
    assert_eq!(copy.note, source.note);
    assert_eq!(copy.genres, vec![drama]);

    let lengths = |m: &mediashelf_db::models::Movie| {
        m.media.iter().map(|x| (x.number, x.length)).collect::<Vec<_>>()
    };
    assert_eq!(lengths(&copy), lengths(&source));
    for (copied, original) in copy.media.iter().zip(&source.media) {
        assert!(copied.id.is_some());
        assert_ne!(copied.id, original.id);
    }
}

#[tokio::test]
async fn duplicate_show_deep_copies_seasons_and_episodes() {
    let catalog = memory_catalog();
    let lost = id_of(&catalog.shows.add(show("Lost", vec![])).await.unwrap());
    for number in 1..=2 {
        let season_id = id_of(&catalog.seasons.add(season(lost, number)).await.unwrap());
        for episode_number in 1..=3 {
            catalog
                .episodes
                .add(episode(season_id, episode_number))
                .await
                .unwrap();
        }
    }

    let copy = catalog.shows.duplicate(lost).await.unwrap();
    let copy_id = id_of(&copy);
    assert_eq!(copy.position(), 1);

    let original_seasons = catalog.seasons.list_in_scope(Scope::Parent(lost)).await.unwrap();
    let copied_seasons = catalog
        .seasons
        .list_in_scope(Scope::Parent(copy_id))
        .await
        .unwrap();
    assert_eq!(copied_seasons.len(), 2);
    for (copied, original) in copied_seasons.iter().zip(&original_seasons) {
        assert_ne!(copied.id(), original.id());
        assert_eq!(copied.number, original.number);
        assert_eq!(copied.position(), original.position());

        let copied_episodes = catalog
            .episodes
            .list_in_scope(Scope::Parent(id_of(copied)))
            .await
            .unwrap();
        let original_episodes = catalog
            .episodes
            .list_in_scope(Scope::Parent(id_of(original)))
            .await
            .unwrap();
        assert_eq!(
            copied_episodes.iter().map(|e| &e.name).collect::<Vec<_>>(),
            original_episodes.iter().map(|e| &e.name).collect::<Vec<_>>()
        );
        assert!(copied_episodes
            .iter()
            .all(|e| original_episodes.iter().all(|o| o.id() != e.id())));
    }

    assert_eq!(catalog.episodes.list().await.unwrap().len(), 12);
}

#[tokio::test]
async fn duplicate_season_stays_with_its_show() {
    let catalog = memory_catalog();
    let lost = id_of(&catalog.shows.add(show("Lost", vec![])).await.unwrap());
    let first = id_of(&catalog.seasons.add(season(lost, 1)).await.unwrap());
    catalog.episodes.add(episode(first, 1)).await.unwrap();

    let copy = catalog.seasons.duplicate(first).await.unwrap();
    assert_eq!(copy.show_id, lost);
    assert_eq!(copy.position(), 1);
    let episodes = catalog
        .episodes
        .list_in_scope(Scope::Parent(id_of(&copy)))
        .await
        .unwrap();
    assert_eq!(episodes.len(), 1);
}

#[tokio::test]
async fn duplicate_album_copies_songs() {
    let catalog = memory_catalog();
    let album_id = id_of(&catalog.music.add(album("Abbey Road")).await.unwrap());
    catalog.songs.add(song(album_id, "Come Together", 259)).await.unwrap();
    catalog.songs.add(song(album_id, "Something", 182)).await.unwrap();

    let copy = catalog.music.duplicate(album_id).await.unwrap();
    let songs = catalog
        .songs
        .list_in_scope(Scope::Parent(id_of(&copy)))
        .await
        .unwrap();
    assert_eq!(
        songs.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
        ["Come Together", "Something"]
    );
    assert_eq!(positions(&songs), [0, 1]);
}

#[tokio::test]
async fn duplicate_of_missing_row_is_not_found() {
    let catalog = memory_catalog();
    assert_matches!(
        catalog.games.duplicate(7).await,
        Err(CoreError::NotFound { entity: "Game", id: 7 })
    );
}

// ---------------------------------------------------------------------------
// Cascades
// ---------------------------------------------------------------------------

#[tokio::test]
async fn removing_a_show_removes_its_seasons_and_episodes() {
    let catalog = memory_catalog();
    let lost = id_of(&catalog.shows.add(show("Lost", vec![])).await.unwrap());
    let season_id = id_of(&catalog.seasons.add(season(lost, 1)).await.unwrap());
    catalog.episodes.add(episode(season_id, 1)).await.unwrap();

    catalog.shows.remove(lost).await.unwrap();

    assert!(!catalog.seasons.exists(season_id).await.unwrap());
    assert!(catalog.episodes.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn removing_a_genre_unlinks_it() {
    let catalog = memory_catalog();
    let drama = id_of(&catalog.genres.add(genre("Drama")).await.unwrap());
    let scifi = id_of(&catalog.genres.add(genre("Sci-fi")).await.unwrap());
    let matrix = id_of(
        &catalog
            .movies
            .add(movie("Matrix", &[136], vec![drama, scifi]))
            .await
            .unwrap(),
    );

    // Warm the movie cache before the genre goes away.
    assert_eq!(
        catalog.movies.get(matrix).await.unwrap().unwrap().genres,
        vec![drama, scifi]
    );
    catalog.genres.remove(drama).await.unwrap();

    let matrix = catalog.movies.get(matrix).await.unwrap().unwrap();
    assert_eq!(matrix.genres, vec![scifi]);
}

#[tokio::test]
async fn adding_a_season_to_a_missing_show_conflicts() {
    let catalog = memory_catalog();
    assert_matches!(
        catalog.seasons.add(season(404, 1)).await,
        Err(CoreError::Conflict(_))
    );
}

#[tokio::test]
async fn clear_removes_every_row() {
    let (catalog, _) = catalog_with_abc().await;
    assert_eq!(catalog.games.clear().await.unwrap(), 3);
    assert!(catalog.games.list().await.unwrap().is_empty());

    let first = catalog.games.add(game("A")).await.unwrap();
    assert_eq!(first.position(), 0);
}

#[tokio::test]
async fn remove_of_missing_row_is_not_found() {
    let catalog = memory_catalog();
    assert_matches!(
        catalog.games.remove(1).await,
        Err(CoreError::NotFound { id: 1, .. })
    );
}

// ---------------------------------------------------------------------------
// Cache coherence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn child_write_refreshes_cached_family_listings() {
    let catalog = memory_catalog();
    let lost = id_of(&catalog.shows.add(show("Lost", vec![])).await.unwrap());
    assert!(catalog.seasons.list().await.unwrap().is_empty());

    catalog.seasons.add(season(lost, 1)).await.unwrap();
    assert_eq!(catalog.seasons.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn cached_get_sees_updates() {
    let (catalog, [a, _, _]) = catalog_with_abc().await;
    let mut cached = catalog.games.get(a).await.unwrap().unwrap();
    cached.name = "A2".into();
    catalog.games.update(cached).await.unwrap();

    assert_eq!(catalog.games.get(a).await.unwrap().unwrap().name, "A2");
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn statistics_follow_the_collection() {
    let catalog = memory_catalog();
    catalog.movies.add(movie("Alien", &[117], vec![])).await.unwrap();
    catalog.movies.add(movie("Kill Bill", &[111, 137], vec![])).await.unwrap();
    let movies = catalog.movies.list().await.unwrap();
    assert_eq!(
        MovieStats::compute(&movies),
        MovieStats {
            movies: 2,
            media: 3,
            total_length: 365,
        }
    );

    let lost = id_of(&catalog.shows.add(show("Lost", vec![])).await.unwrap());
    let season_id = id_of(&catalog.seasons.add(season(lost, 1)).await.unwrap());
    catalog.episodes.add(episode(season_id, 1)).await.unwrap();
    catalog.episodes.add(episode(season_id, 2)).await.unwrap();
    let stats = ShowStats::compute(
        &catalog.shows.list().await.unwrap(),
        &catalog.seasons.list().await.unwrap(),
        &catalog.episodes.list().await.unwrap(),
    );
    assert_eq!(stats.episodes, 2);
    assert_eq!(stats.total_length, 90);
}
