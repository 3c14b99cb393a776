//! Handlers for the `/projects` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use taskboard_core::error::CoreError;
use taskboard_core::types::DbId;
use taskboard_core::validation::{optional_text, require_text, MAX_PROJECT_NAME_LEN};
use taskboard_db::models::project::{CreateProject, Project, ProjectDeletion, UpdateProject};
use taskboard_db::repositories::ProjectRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Project",
        id,
    })
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateProject>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let input = CreateProject {
        name: require_text("name", &input.name, MAX_PROJECT_NAME_LEN)?,
        description: optional_text(input.description.as_deref()),
    };

    let project = ProjectRepo::create(&state.pool, &input).await?;
    tracing::info!(project_id = project.id, "Project created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = ProjectRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateProject>,
) -> AppResult<Json<DataResponse<Project>>> {
    let input = UpdateProject {
        name: input
            .name
            .as_deref()
            .map(|name| require_text("name", name, MAX_PROJECT_NAME_LEN))
            .transpose()?,
        description: input.description.map(|d| optional_text(d.as_deref())),
    };

    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(project_id = id, "Project updated");
    Ok(Json(DataResponse { data: project }))
}

/// DELETE /api/v1/projects/{id}
///
/// Refused with 409 while the project still has tasks.
pub async fn delete(State(state): State<AppState>, AppPath(id): AppPath<DbId>) -> AppResult<StatusCode> {
    match ProjectRepo::delete(&state.pool, id).await? {
        ProjectDeletion::Deleted => {
            tracing::info!(project_id = id, "Project deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        ProjectDeletion::NotFound => Err(not_found(id)),
        ProjectDeletion::HasTasks(count) => {
            tracing::info!(project_id = id, task_count = count, "Project delete blocked");
            Err(AppError::Core(CoreError::Conflict(format!(
                "Project {id} still has {count} task(s); delete or move them first"
            ))))
        }
    }
}
