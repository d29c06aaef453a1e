//! Generic CRUD and ordering handlers, instantiated once per [`Resource`].
//!
//! Every handler checks its arguments (positive ids), validates the input
//! and verifies referenced rows before delegating to the catalog service.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use mediashelf_core::entity::Scope;
use mediashelf_core::error::CoreError;
use mediashelf_core::types::DbId;
use mediashelf_core::validation::validate_id;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::resource::Resource;
use crate::response::{DataResponse, RowCount};
use crate::state::AppState;

fn not_found<R: Resource>(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: R::KIND.name(),
        id,
    }
}

/// Validate, cross-check and insert a new row in `scope`.
async fn create<R: Resource>(state: &AppState, scope: Scope, input: R::Input) -> AppResult<R> {
    R::validate(&input)?;
    R::check_references(&state.catalog, &input).await?;
    let row = R::from_input(input, scope)?;
    Ok(R::service(&state.catalog).add(row).await?)
}

// ---------------------------------------------------------------------------
// Collection endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/{type}
///
/// Every row of the type, in display order within each scope.
pub async fn list<R: Resource>(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let rows = R::service(&state.catalog).list().await?;
    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/v1/{type}
///
/// Append a new row of an unscoped type.
pub async fn add<R: Resource>(
    State(state): State<AppState>,
    AppJson(input): AppJson<R::Input>,
) -> AppResult<impl IntoResponse> {
    let saved = create::<R>(&state, Scope::Global, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: saved })))
}

/// DELETE /api/v1/{type}
///
/// Delete every row of the type, including owned children.
pub async fn clear<R: Resource>(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let rows = R::service(&state.catalog).clear().await?;
    Ok(Json(DataResponse {
        data: RowCount { rows },
    }))
}

/// POST /api/v1/{type}/positions
///
/// Close position gaps in every scope of the type.
pub async fn update_positions<R: Resource>(
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let rows = R::service(&state.catalog).update_positions().await?;
    Ok(Json(DataResponse {
        data: RowCount { rows: rows as u64 },
    }))
}

// ---------------------------------------------------------------------------
// Rows owned by a parent
// ---------------------------------------------------------------------------

/// GET /api/v1/{parent}/{id}/{type}
pub async fn list_in_parent<R: Resource>(
    State(state): State<AppState>,
    AppPath(parent_id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    validate_id(parent_id)?;
    R::require_parent(&state.catalog, parent_id).await?;

    let rows = R::service(&state.catalog)
        .list_in_scope(Scope::Parent(parent_id))
        .await?;
    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/v1/{parent}/{id}/{type}
///
/// Append a new row to the end of its parent's list.
pub async fn add_in_parent<R: Resource>(
    State(state): State<AppState>,
    AppPath(parent_id): AppPath<DbId>,
    AppJson(input): AppJson<R::Input>,
) -> AppResult<impl IntoResponse> {
    validate_id(parent_id)?;
    R::require_parent(&state.catalog, parent_id).await?;

    let saved = create::<R>(&state, Scope::Parent(parent_id), input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: saved })))
}

// ---------------------------------------------------------------------------
// Single-row endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/{type}/{id}
pub async fn get_one<R: Resource>(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    validate_id(id)?;
    let row = R::service(&state.catalog)
        .get(id)
        .await?
        .ok_or_else(|| not_found::<R>(id))?;
    Ok(Json(DataResponse { data: row }))
}

/// GET /api/v1/{type}/{id}/exists
pub async fn exists<R: Resource>(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    validate_id(id)?;
    let exists = R::service(&state.catalog).exists(id).await?;
    Ok(Json(DataResponse { data: exists }))
}

/// PUT /api/v1/{type}/{id}
///
/// Replace the editable fields of a row. Position and parent are kept.
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<R::Input>,
) -> AppResult<impl IntoResponse> {
    validate_id(id)?;
    R::validate(&input)?;

    let service = R::service(&state.catalog);
    let mut row = service.get(id).await?.ok_or_else(|| not_found::<R>(id))?;
    R::check_references(&state.catalog, &input).await?;
    row.apply_input(input);

    let saved = service.update(row).await?;
    Ok(Json(DataResponse { data: saved }))
}

/// DELETE /api/v1/{type}/{id}
///
/// Remaining siblings keep their positions until the next compaction.
pub async fn remove<R: Resource>(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    validate_id(id)?;
    R::service(&state.catalog).remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/{type}/{id}/duplicate
pub async fn duplicate<R: Resource>(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    validate_id(id)?;
    let copy = R::service(&state.catalog).duplicate(id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: copy })))
}

/// POST /api/v1/{type}/{id}/move-up
pub async fn move_up<R: Resource>(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    validate_id(id)?;
    let moved = R::service(&state.catalog).move_up(id).await?;
    Ok(Json(DataResponse { data: moved }))
}

/// POST /api/v1/{type}/{id}/move-down
pub async fn move_down<R: Resource>(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    validate_id(id)?;
    let moved = R::service(&state.catalog).move_down(id).await?;
    Ok(Json(DataResponse { data: moved }))
}
