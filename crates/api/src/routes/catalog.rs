//! Route set shared by every catalog entity type.

use axum::routing::{get, post, MethodRouter};
use axum::Router;

use crate::handlers::catalog;
use crate::resource::Resource;
use crate::state::AppState;

/// Routes for one entity type, mounted under `/api/v1`.
///
/// ```text
/// GET    /{type}                    -> list
/// POST   /{type}                    -> add (unscoped types only)
/// DELETE /{type}                    -> clear
/// POST   /{type}/positions          -> update_positions
/// GET    /{type}/{id}               -> get_one
/// PUT    /{type}/{id}               -> update
/// DELETE /{type}/{id}               -> remove
/// GET    /{type}/{id}/exists        -> exists
/// POST   /{type}/{id}/duplicate     -> duplicate
/// POST   /{type}/{id}/move-up       -> move_up
/// POST   /{type}/{id}/move-down     -> move_down
///
/// GET    /{parent}/{id}/{type}      -> list_in_parent (scoped types only)
/// POST   /{parent}/{id}/{type}      -> add_in_parent (scoped types only)
/// ```
pub fn resource_router<R: Resource>() -> Router<AppState> {
    let base = format!("/{}", R::PATH);

    let mut collection: MethodRouter<AppState> =
        get(catalog::list::<R>).delete(catalog::clear::<R>);
    if R::PARENT_PATH.is_none() {
        collection = collection.post(catalog::add::<R>);
    }

    let router = Router::new()
        .route(&base, collection)
        .route(
            &format!("{base}/positions"),
            post(catalog::update_positions::<R>),
        )
        .route(
            &format!("{base}/{{id}}"),
            get(catalog::get_one::<R>)
                .put(catalog::update::<R>)
                .delete(catalog::remove::<R>),
        )
        .route(&format!("{base}/{{id}}/exists"), get(catalog::exists::<R>))
        .route(
            &format!("{base}/{{id}}/duplicate"),
            post(catalog::duplicate::<R>),
        )
        .route(&format!("{base}/{{id}}/move-up"), post(catalog::move_up::<R>))
        .route(
            &format!("{base}/{{id}}/move-down"),
            post(catalog::move_down::<R>),
        );

    match R::PARENT_PATH {
        Some(parent) => router.route(
            &format!("/{parent}/{{id}}/{}", R::PATH),
            get(catalog::list_in_parent::<R>).post(catalog::add_in_parent::<R>),
        ),
        None => router,
    }
}
