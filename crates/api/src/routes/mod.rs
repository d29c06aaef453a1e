pub mod catalog;
pub mod health;

use axum::routing::get;
use axum::Router;
use mediashelf_db::models::{
    Book, BookCategory, Episode, Game, Genre, Movie, Music, Program, Season, Show, Song,
};

use crate::handlers::stats;
use crate::state::AppState;
use catalog::resource_router;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy (each type gets the set documented on
/// [`resource_router`]):
///
/// ```text
/// /genres
/// /movies
/// /movies/stats                                    movie, media, length totals
/// /shows
/// /shows/stats                                     show, season, episode totals
/// /shows/{id}/seasons                              seasons of a show
/// /seasons
/// /seasons/{id}/episodes                           episodes of a season
/// /episodes
/// /music
/// /music/stats                                     album, media, song totals
/// /music/{id}/songs                                songs of an album
/// /songs
/// /book-categories
/// /book-categories/{id}/books                      books of a category
/// /books
/// /games
/// /programs
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(resource_router::<Genre>())
        .merge(resource_router::<Movie>())
        .merge(resource_router::<Show>())
        .merge(resource_router::<Season>())
        .merge(resource_router::<Episode>())
        .merge(resource_router::<Music>())
        .merge(resource_router::<Song>())
        .merge(resource_router::<BookCategory>())
        .merge(resource_router::<Book>())
        .merge(resource_router::<Game>())
        .merge(resource_router::<Program>())
        .route("/movies/stats", get(stats::movie_stats))
        .route("/shows/stats", get(stats::show_stats))
        .route("/music/stats", get(stats::music_stats))
}
