pub mod health;
pub mod project;
pub mod task;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users                   list, create
/// /users/{id}              get, update, delete
///
/// /projects                list, create
/// /projects/{id}           get, update, delete (blocked while tasks exist)
///
/// /tasks                   list (filters, views, sort), create
/// /tasks/tags              distinct tags in use
/// /tasks/{id}              get, update, delete
/// /tasks/{id}/done         mark done (POST)
/// /tasks/{id}/undo         back to TODO (POST)
/// /tasks/{id}/move-up      swap with previous in group (POST)
/// /tasks/{id}/move-down    swap with next in group (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", user::router())
        .nest("/projects", project::router())
        .nest("/tasks", task::router())
}
