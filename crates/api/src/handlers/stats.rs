//! Collection summaries computed from the catalog listings.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use mediashelf_db::models::{MovieStats, MusicStats, ShowStats};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/movies/stats
pub async fn movie_stats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let movies = state.catalog.movies.list().await?;
    Ok(Json(DataResponse {
        data: MovieStats::compute(&movies),
    }))
}

/// GET /api/v1/shows/stats
///
/// Total length is the sum of every episode's length, in minutes.
pub async fn show_stats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let catalog = &state.catalog;
    let shows = catalog.shows.list().await?;
    let seasons = catalog.seasons.list().await?;
    let episodes = catalog.episodes.list().await?;
    Ok(Json(DataResponse {
        data: ShowStats::compute(&shows, &seasons, &episodes),
    }))
}

/// GET /api/v1/music/stats
pub async fn music_stats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let music = state.catalog.music.list().await?;
    let songs = state.catalog.songs.list().await?;
    Ok(Json(DataResponse {
        data: MusicStats::compute(&music, &songs),
    }))
}
