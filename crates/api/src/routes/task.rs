//! Route definitions for the `/tasks` resource.
//!
//! `/tags` is registered before `/{id}`; axum prefers the static segment.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::task;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create
/// GET    /tags             -> list_tags
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update
/// DELETE /{id}             -> delete
/// POST   /{id}/done        -> mark_done
/// POST   /{id}/undo        -> undo
/// POST   /{id}/move-up     -> move_up
/// POST   /{id}/move-down   -> move_down
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(task::list).post(task::create))
        .route("/tags", get(task::list_tags))
        .route(
            "/{id}",
            get(task::get_by_id).put(task::update).delete(task::delete),
        )
        .route("/{id}/done", post(task::mark_done))
        .route("/{id}/undo", post(task::undo))
        .route("/{id}/move-up", post(task::move_up))
        .route("/{id}/move-down", post(task::move_down))
}
