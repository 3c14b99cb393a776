//! Task vocabularies, list views, sort modes and due-date classification.
//!
//! Status and priority are plain `TEXT` columns in the schema; the set of
//! accepted values is enforced here, at the API boundary.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Date;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Not started.
pub const STATUS_TODO: &str = "TODO";
/// In progress.
pub const STATUS_DOING: &str = "DOING";
/// Finished.
pub const STATUS_DONE: &str = "DONE";

/// All valid task statuses, in board order.
pub const VALID_STATUSES: &[&str] = &[STATUS_TODO, STATUS_DOING, STATUS_DONE];

/// Status given to new tasks when none is supplied.
pub const DEFAULT_STATUS: &str = STATUS_TODO;

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

pub const PRIORITY_LOW: &str = "LOW";
pub const PRIORITY_MID: &str = "MID";
pub const PRIORITY_HIGH: &str = "HIGH";

/// All valid task priorities, lowest first.
pub const VALID_PRIORITIES: &[&str] = &[PRIORITY_LOW, PRIORITY_MID, PRIORITY_HIGH];

/// Priority given to new tasks when none is supplied.
pub const DEFAULT_PRIORITY: &str = PRIORITY_MID;

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

/// Open tasks due within this many days of today are flagged as "soon".
pub const DUE_SOON_DAYS: i64 = 2;

/// The "week" view covers today plus this many following days.
pub const WEEK_VIEW_DAYS: i64 = 6;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that a status string is one of [`VALID_STATUSES`].
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown status: '{status}'. Valid statuses: {}",
            VALID_STATUSES.join(", ")
        )))
    }
}

/// Validate that a priority string is one of [`VALID_PRIORITIES`].
pub fn validate_priority(priority: &str) -> Result<(), CoreError> {
    if VALID_PRIORITIES.contains(&priority) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown priority: '{priority}'. Valid priorities: {}",
            VALID_PRIORITIES.join(", ")
        )))
    }
}

/// Returns `true` if the status counts as finished.
pub fn is_done(status: &str) -> bool {
    status == STATUS_DONE
}

/// Position for a task appended to a group whose largest `sort_order`
/// is `current_max` (`None` for an empty group).
pub fn next_sort_order(current_max: Option<i32>) -> i32 {
    current_max.unwrap_or(0) + 1
}

// ---------------------------------------------------------------------------
// List views
// ---------------------------------------------------------------------------

/// Preset task list views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskView {
    /// Every task.
    #[default]
    All,
    /// Open tasks due today.
    Today,
    /// Open tasks due between today and [`WEEK_VIEW_DAYS`] days from now.
    Week,
    /// Open tasks whose due date has passed.
    Overdue,
    /// Finished tasks.
    Done,
}

/// Inclusive due-date bounds; `None` on either side means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueWindow {
    pub from: Option<Date>,
    pub to: Option<Date>,
}

impl TaskView {
    /// Due-date range the view selects, relative to `today`.
    ///
    /// Views that do not filter on due date return `None`. Tasks without a
    /// due date never fall inside a window.
    pub fn due_window(self, today: Date) -> Option<DueWindow> {
        match self {
            TaskView::All | TaskView::Done => None,
            TaskView::Today => Some(DueWindow {
                from: Some(today),
                to: Some(today),
            }),
            TaskView::Week => Some(DueWindow {
                from: Some(today),
                to: Some(today + Duration::days(WEEK_VIEW_DAYS)),
            }),
            TaskView::Overdue => Some(DueWindow {
                from: None,
                to: Some(today - Duration::days(1)),
            }),
        }
    }

    /// Whether the view hides finished tasks.
    pub fn open_only(self) -> bool {
        matches!(self, TaskView::Today | TaskView::Week | TaskView::Overdue)
    }

    /// Whether the view shows only finished tasks.
    pub fn done_only(self) -> bool {
        self == TaskView::Done
    }
}

// ---------------------------------------------------------------------------
// Sort modes
// ---------------------------------------------------------------------------

/// Orderings offered by the task list. Every mode groups by status first
/// (TODO, DOING, DONE) except [`TaskSort::Created`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskSort {
    /// The user's fixed order (`sort_order`).
    #[default]
    Order,
    /// Earliest due date first.
    Due,
    /// Highest priority first.
    Priority,
    /// Newest first.
    Created,
}

// ---------------------------------------------------------------------------
// Due state
// ---------------------------------------------------------------------------

/// Urgency of an open task's due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DueState {
    /// Past due and not done.
    Overdue,
    /// Due within [`DUE_SOON_DAYS`] days and not done.
    Soon,
    /// No due date, done, or comfortably far away.
    None,
}

/// Classify a task's due date relative to `today`.
pub fn classify_due(status: &str, due_date: Option<Date>, today: Date) -> DueState {
    let Some(due) = due_date else {
        return DueState::None;
    };
    if is_done(status) {
        DueState::None
    } else if due < today {
        DueState::Overdue
    } else if due <= today + Duration::days(DUE_SOON_DAYS) {
        DueState::Soon
    } else {
        DueState::None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
