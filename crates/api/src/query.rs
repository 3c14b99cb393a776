//! Query parameter types for list endpoints.

use serde::Deserialize;
use taskboard_core::task::{TaskSort, TaskView};
use taskboard_core::types::DbId;

/// Query parameters for `GET /tasks`.
///
/// `view` defaults to `all` and `sort` to `order`.
#[derive(Debug, Deserialize)]
pub struct TaskListParams {
    pub project_id: Option<DbId>,
    pub assignee_user_id: Option<DbId>,
    pub status: Option<String>,
    #[serde(default)]
    pub view: TaskView,
    pub q: Option<String>,
    pub tag: Option<String>,
    #[serde(default)]
    pub sort: TaskSort,
}
