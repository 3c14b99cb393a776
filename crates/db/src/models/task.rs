//! Task entity model, list projection and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskboard_core::task::{TaskSort, TaskView};
use taskboard_core::types::{Date, DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A task row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: Option<DbId>,
    pub assignee_user_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub due_date: Option<Date>,
    /// Normalised, comma-separated tag list.
    pub tags: Option<String>,
    /// Position within the `(project_id, status)` group.
    pub sort_order: i32,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A task joined with the names of its project and assignee.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub task: Task,
    pub project_name: Option<String>,
    pub assignee_name: Option<String>,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for creating a new task.
///
/// `status` defaults to `TODO` and `priority` to `MID` when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub project_id: Option<DbId>,
    pub assignee_user_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<Date>,
    pub tags: Option<String>,
}

/// DTO for partially updating a task.
///
/// Omitted fields are left alone. Nullable columns accept an explicit
/// `null` to clear them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    #[serde(default, deserialize_with = "taskboard_core::patch::nullable")]
    pub project_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "taskboard_core::patch::nullable")]
    pub assignee_user_id: Option<Option<DbId>>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "taskboard_core::patch::nullable")]
    pub description: Option<Option<String>>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "taskboard_core::patch::nullable")]
    pub due_date: Option<Option<Date>>,
    #[serde(default, deserialize_with = "taskboard_core::patch::nullable")]
    pub tags: Option<Option<String>>,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filter and ordering for listing tasks. All filters are ANDed.
#[derive(Debug, Clone)]
pub struct TaskFilter {
    pub project_id: Option<DbId>,
    pub assignee_user_id: Option<DbId>,
    pub status: Option<String>,
    pub view: TaskView,
    /// Case-insensitive substring of title or description.
    pub q: Option<String>,
    /// Case-insensitive substring of the tag list.
    pub tag: Option<String>,
    pub sort: TaskSort,
    /// Reference date for the date-relative views.
    pub today: Date,
}

impl TaskFilter {
    /// A filter that matches every task, in fixed order.
    pub fn all(today: Date) -> Self {
        Self {
            project_id: None,
            assignee_user_id: None,
            status: None,
            view: TaskView::All,
            q: None,
            tag: None,
            sort: TaskSort::Order,
            today,
        }
    }
}
