//! Handlers for the `/tasks` resource.
//!
//! Every task in a response carries a `due_state` computed against the
//! server's local date, the same date the `today`/`week`/`overdue` views
//! filter on.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use sqlx::PgPool;
use taskboard_core::error::CoreError;
use taskboard_core::tags::normalize_tags;
use taskboard_core::task::{classify_due, validate_priority, validate_status, DueState};
use taskboard_core::types::{Date, DbId};
use taskboard_core::validation::{optional_text, require_text, MAX_TASK_TITLE_LEN};
use taskboard_db::models::task::{CreateTask, Task, TaskFilter, TaskListItem, UpdateTask};
use taskboard_db::repositories::{ProjectRepo, TaskRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::query::TaskListParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// A task as returned by the single-task endpoints.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    #[serde(flatten)]
    pub task: Task,
    pub due_state: DueState,
}

impl TaskResponse {
    fn new(task: Task, today: Date) -> Self {
        let due_state = classify_due(&task.status, task.due_date, today);
        Self { task, due_state }
    }
}

/// A row of the task list, with project and assignee names.
#[derive(Debug, Serialize)]
pub struct TaskCard {
    #[serde(flatten)]
    pub item: TaskListItem,
    pub due_state: DueState,
}

impl TaskCard {
    fn new(item: TaskListItem, today: Date) -> Self {
        let due_state = classify_due(&item.task.status, item.task.due_date, today);
        Self { item, due_state }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn today() -> Date {
    chrono::Local::now().date_naive()
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Task", id })
}

fn found(task: Option<Task>, id: DbId) -> AppResult<Json<DataResponse<TaskResponse>>> {
    let task = task.ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse {
        data: TaskResponse::new(task, today()),
    }))
}

/// Reject references to projects or users that do not exist.
async fn ensure_references(
    pool: &PgPool,
    project_id: Option<DbId>,
    assignee_user_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(project_id) = project_id {
        if !ProjectRepo::exists(pool, project_id).await? {
            return Err(AppError::Core(CoreError::Validation(format!(
                "project_id {project_id} does not reference an existing project"
            ))));
        }
    }
    if let Some(user_id) = assignee_user_id {
        if !UserRepo::exists(pool, user_id).await? {
            return Err(AppError::Core(CoreError::Validation(format!(
                "assignee_user_id {user_id} does not reference an existing user"
            ))));
        }
    }
    Ok(())
}

/// Trim and validate the free-text and vocabulary fields of a new task.
fn normalize_create(input: CreateTask) -> Result<CreateTask, CoreError> {
    let title = require_text("title", &input.title, MAX_TASK_TITLE_LEN)?;
    let status = optional_text(input.status.as_deref());
    if let Some(status) = &status {
        validate_status(status)?;
    }
    let priority = optional_text(input.priority.as_deref());
    if let Some(priority) = &priority {
        validate_priority(priority)?;
    }

    Ok(CreateTask {
        project_id: input.project_id,
        assignee_user_id: input.assignee_user_id,
        title,
        description: optional_text(input.description.as_deref()),
        status,
        priority,
        due_date: input.due_date,
        tags: input.tags.as_deref().and_then(normalize_tags),
    })
}

/// Same as [`normalize_create`] for a partial update. Explicit `null`s
/// pass through untouched; a blank description or tag list clears it.
/// Status and priority are trimmed like on create, and a blank value
/// leaves the field unchanged.
fn normalize_update(input: UpdateTask) -> Result<UpdateTask, CoreError> {
    let title = input
        .title
        .as_deref()
        .map(|title| require_text("title", title, MAX_TASK_TITLE_LEN))
        .transpose()?;
    let status = optional_text(input.status.as_deref());
    if let Some(status) = &status {
        validate_status(status)?;
    }
    let priority = optional_text(input.priority.as_deref());
    if let Some(priority) = &priority {
        validate_priority(priority)?;
    }

    Ok(UpdateTask {
        project_id: input.project_id,
        assignee_user_id: input.assignee_user_id,
        title,
        description: input.description.map(|d| optional_text(d.as_deref())),
        status,
        priority,
        due_date: input.due_date,
        tags: input.tags.map(|t| t.as_deref().and_then(normalize_tags)),
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateTask>,
) -> AppResult<(StatusCode, Json<DataResponse<TaskResponse>>)> {
    let input = normalize_create(input)?;
    ensure_references(&state.pool, input.project_id, input.assignee_user_id).await?;

    let task = TaskRepo::create(&state.pool, &input).await?;
    tracing::info!(
        task_id = task.id,
        project_id = ?task.project_id,
        status = %task.status,
        "Task created"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: TaskResponse::new(task, today()),
        }),
    ))
}

/// GET /api/v1/tasks
///
/// An empty `status`, `q` or `tag` parameter is treated as absent.
pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<TaskListParams>,
) -> AppResult<Json<DataResponse<Vec<TaskCard>>>> {
    let status = optional_text(params.status.as_deref());
    if let Some(status) = &status {
        validate_status(status)?;
    }

    let today = today();
    let filter = TaskFilter {
        project_id: params.project_id,
        assignee_user_id: params.assignee_user_id,
        status,
        view: params.view,
        q: optional_text(params.q.as_deref()),
        tag: optional_text(params.tag.as_deref()),
        sort: params.sort,
        today,
    };

    let items = TaskRepo::list(&state.pool, &filter).await?;
    let cards: Vec<TaskCard> = items
        .into_iter()
        .map(|item| TaskCard::new(item, today))
        .collect();
    Ok(Json(DataResponse { data: cards }))
}

/// GET /api/v1/tasks/tags
pub async fn list_tags(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let tags = TaskRepo::list_tags(&state.pool).await?;
    Ok(Json(DataResponse { data: tags }))
}

/// GET /api/v1/tasks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<TaskResponse>>> {
    found(TaskRepo::find_by_id(&state.pool, id).await?, id)
}

/// PUT /api/v1/tasks/{id}
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateTask>,
) -> AppResult<Json<DataResponse<TaskResponse>>> {
    let input = normalize_update(input)?;
    ensure_references(
        &state.pool,
        input.project_id.flatten(),
        input.assignee_user_id.flatten(),
    )
    .await?;

    let task = TaskRepo::update(&state.pool, id, &input).await?;
    if task.is_some() {
        tracing::info!(task_id = id, "Task updated");
    }
    found(task, id)
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete(State(state): State<AppState>, AppPath(id): AppPath<DbId>) -> AppResult<StatusCode> {
    if TaskRepo::delete(&state.pool, id).await? {
        tracing::info!(task_id = id, "Task deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/tasks/{id}/done
pub async fn mark_done(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<TaskResponse>>> {
    let task = TaskRepo::mark_done(&state.pool, id).await?;
    if task.is_some() {
        tracing::info!(task_id = id, "Task marked done");
    }
    found(task, id)
}

/// POST /api/v1/tasks/{id}/undo
pub async fn undo(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<TaskResponse>>> {
    let task = TaskRepo::undo(&state.pool, id).await?;
    if task.is_some() {
        tracing::info!(task_id = id, "Task reopened");
    }
    found(task, id)
}

/// POST /api/v1/tasks/{id}/move-up
pub async fn move_up(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<TaskResponse>>> {
    found(TaskRepo::move_up(&state.pool, id).await?, id)
}

/// POST /api/v1/tasks/{id}/move-down
pub async fn move_down(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<TaskResponse>>> {
    found(TaskRepo::move_down(&state.pool, id).await?, id)
}
