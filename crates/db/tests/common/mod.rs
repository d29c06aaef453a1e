//! Shared row builders for the catalog integration tests.

#![allow(dead_code)]

use mediashelf_core::cache::CacheRegistry;
use mediashelf_core::entity::{CatalogEntity, Scope};
use mediashelf_core::types::{DbId, Position};
use mediashelf_db::models::{
    Episode, EpisodeInput, FromInput, Game, GameInput, Genre, GenreInput, MediumInput, Movie,
    MovieInput, Season, SeasonInput, Show, ShowInput, Song, SongInput, Music, MusicInput,
};
use mediashelf_db::Catalog;

pub fn memory_catalog() -> Catalog {
    Catalog::in_memory(&CacheRegistry::default())
}

/// Names in display order, for asserting on a listing.
pub fn names(games: &[Game]) -> Vec<&str> {
    games.iter().map(|g| g.name.as_str()).collect()
}

pub fn positions<E: CatalogEntity>(rows: &[E]) -> Vec<Position> {
    rows.iter().map(|r| r.position()).collect()
}

pub fn id_of<E: CatalogEntity>(row: &E) -> DbId {
    row.id().expect("row was persisted")
}

pub fn game(name: &str) -> Game {
    let input = GameInput {
        name: name.to_string(),
        wiki_en: None,
        wiki_cz: None,
        media_count: 1,
        crack: false,
        serial_key: false,
        patch: false,
        trainer: false,
        trainer_data: false,
        editor: false,
        saves: false,
        other_data: None,
        note: None,
    };
    Game::from_input(input, Scope::Global).unwrap()
}

pub fn genre(name: &str) -> Genre {
    Genre::from_input(
        GenreInput {
            name: name.to_string(),
        },
        Scope::Global,
    )
    .unwrap()
}

pub fn movie(name: &str, lengths: &[i32], genres: Vec<DbId>) -> Movie {
    let input = MovieInput {
        czech_name: name.to_string(),
        original_name: name.to_string(),
        year: 1999,
        languages: vec!["en".into()],
        subtitles: vec!["cs".into()],
        media: lengths
            .iter()
            .map(|&length| MediumInput { length })
            .collect(),
        csfd: None,
        imdb_code: Some(133093),
        wiki_en: None,
        wiki_cz: None,
        picture: None,
        note: Some("director's cut".into()),
        genres,
    };
    Movie::from_input(input, Scope::Global).unwrap()
}

pub fn show(name: &str, genres: Vec<DbId>) -> Show {
    let input = ShowInput {
        czech_name: name.to_string(),
        original_name: name.to_string(),
        csfd: None,
        imdb_code: None,
        wiki_en: None,
        wiki_cz: None,
        picture: None,
        note: None,
        genres,
    };
    Show::from_input(input, Scope::Global).unwrap()
}

pub fn season(show_id: DbId, number: i32) -> Season {
    let input = SeasonInput {
        number,
        start_year: 2008,
        end_year: 2008,
        language: "en".into(),
        subtitles: vec![],
        note: None,
    };
    Season::from_input(input, Scope::Parent(show_id)).unwrap()
}

pub fn episode(season_id: DbId, number: i32) -> Episode {
    let input = EpisodeInput {
        number,
        name: format!("Episode {number}"),
        length: 45,
        note: None,
    };
    Episode::from_input(input, Scope::Parent(season_id)).unwrap()
}

pub fn album(name: &str) -> Music {
    let input = MusicInput {
        name: name.to_string(),
        wiki_en: None,
        wiki_cz: None,
        media_count: 1,
        note: None,
    };
    Music::from_input(input, Scope::Global).unwrap()
}

pub fn song(music_id: DbId, name: &str, length: i32) -> Song {
    let input = SongInput {
        name: name.to_string(),
        length,
        note: None,
    };
    Song::from_input(input, Scope::Parent(music_id)).unwrap()
}

/// Catalog holding games A, B and C at positions 0, 1 and 2.
pub async fn catalog_with_abc() -> (Catalog, [DbId; 3]) {
    let catalog = memory_catalog();
    let mut ids = [0; 3];
    for (slot, name) in ids.iter_mut().zip(["A", "B", "C"]) {
        *slot = id_of(&catalog.games.add(game(name)).await.unwrap());
    }
    (catalog, ids)
}
