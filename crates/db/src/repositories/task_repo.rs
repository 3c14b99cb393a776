//! Repository for the `tasks` table.
//!
//! Every task has a `sort_order` inside its `(project_id, status)` group.
//! Inserts and group changes append to the end of the target group; the
//! move operations swap positions with the nearest neighbour.

use sqlx::{PgPool, Postgres, Transaction};
use taskboard_core::tags::collect_tags;
use taskboard_core::task::{
    is_done, next_sort_order, TaskSort, DEFAULT_PRIORITY, DEFAULT_STATUS, STATUS_DONE,
    STATUS_TODO,
};
use taskboard_core::types::{Date, DbId};

use crate::models::task::{CreateTask, Task, TaskFilter, TaskListItem, UpdateTask};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, project_id, assignee_user_id, title, description, status, priority, \
    due_date, tags, sort_order, completed_at, created_at, updated_at";

/// Column list for the joined list query (`t` = tasks, `p` = projects, `u` = users).
const LIST_COLUMNS: &str = "\
    t.id, t.project_id, t.assignee_user_id, t.title, t.description, t.status, \
    t.priority, t.due_date, t.tags, t.sort_order, t.completed_at, t.created_at, \
    t.updated_at, p.name AS project_name, u.display_name AS assignee_name";

/// Which neighbour a move swaps with.
#[derive(Debug, Clone, Copy)]
enum Direction {
    Up,
    Down,
}

// ---------------------------------------------------------------------------
// TaskRepo
// ---------------------------------------------------------------------------

/// Provides CRUD, listing and ordering operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task at the end of its group, returning the created row.
    ///
    /// Missing status/priority fall back to `TODO`/`MID`. A task created
    /// as `DONE` gets `completed_at` stamped immediately.
    pub async fn create(pool: &PgPool, input: &CreateTask) -> Result<Task, sqlx::Error> {
        let status = input.status.as_deref().unwrap_or(DEFAULT_STATUS);
        let priority = input.priority.as_deref().unwrap_or(DEFAULT_PRIORITY);

        let mut tx = pool.begin().await?;
        let sort_order = Self::next_position(&mut tx, input.project_id, status).await?;

        let query = format!(
            "INSERT INTO tasks \
                (project_id, assignee_user_id, title, description, status, priority, \
                 due_date, tags, sort_order, completed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, CASE WHEN $10 THEN NOW() END) \
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(input.project_id)
            .bind(input.assignee_user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(status)
            .bind(priority)
            .bind(input.due_date)
            .bind(&input.tags)
            .bind(sort_order)
            .bind(is_done(status))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(task)
    }

    /// Find a task by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tasks matching `filter`, joined with project and assignee names.
    pub async fn list(
        pool: &PgPool,
        filter: &TaskFilter,
    ) -> Result<Vec<TaskListItem>, sqlx::Error> {
        let (where_clause, bind_values) = build_task_filter(filter);
        let query = format!(
            "SELECT {LIST_COLUMNS} \
             FROM tasks t \
             LEFT JOIN projects p ON p.id = t.project_id \
             LEFT JOIN users u ON u.id = t.assignee_user_id \
             {where_clause} \
             ORDER BY {}",
            order_clause(filter.sort)
        );

        let mut q = sqlx::query_as::<_, TaskListItem>(&query);
        for val in &bind_values {
            q = match val {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Date(v) => q.bind(*v),
            };
        }
        q.fetch_all(pool).await
    }

    /// Distinct tags across all tasks, sorted.
    pub async fn list_tags(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        let lists: Vec<String> =
            sqlx::query_scalar("SELECT tags FROM tasks WHERE tags IS NOT NULL")
                .fetch_all(pool)
                .await?;
        Ok(collect_tags(lists.iter().map(String::as_str)))
    }

    /// Partially update a task.
    ///
    /// Moving the task to another project or status appends it to the end
    /// of the new group. `completed_at` is kept while the task stays `DONE`
    /// and cleared when it leaves `DONE`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(current) = Self::lock(&mut tx, id).await? else {
            return Ok(None);
        };

        let project_id = input.project_id.unwrap_or(current.project_id);
        let status = input.status.clone().unwrap_or(current.status.clone());
        let sort_order = if project_id != current.project_id || status != current.status {
            Self::next_position(&mut tx, project_id, &status).await?
        } else {
            current.sort_order
        };

        let query = format!(
            "UPDATE tasks SET \
                project_id = $2, \
                assignee_user_id = $3, \
                title = $4, \
                description = $5, \
                status = $6, \
                priority = $7, \
                due_date = $8, \
                tags = $9, \
                sort_order = $10, \
                completed_at = CASE WHEN $11 THEN COALESCE(completed_at, NOW()) ELSE NULL END, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(project_id)
            .bind(input.assignee_user_id.unwrap_or(current.assignee_user_id))
            .bind(input.title.clone().unwrap_or(current.title))
            .bind(input.description.clone().unwrap_or(current.description))
            .bind(&status)
            .bind(input.priority.clone().unwrap_or(current.priority))
            .bind(input.due_date.unwrap_or(current.due_date))
            .bind(input.tags.clone().unwrap_or(current.tags))
            .bind(sort_order)
            .bind(is_done(&status))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(task))
    }

    /// Mark a task `DONE`, stamping `completed_at` if it was not already set.
    pub async fn mark_done(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        Self::transition(pool, id, STATUS_DONE).await
    }

    /// Send a task back to `TODO`, clearing `completed_at`. The task is
    /// appended to the end of its project's `TODO` group.
    pub async fn undo(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        Self::transition(pool, id, STATUS_TODO).await
    }

    /// Swap a task with the one directly above it in its group.
    ///
    /// The first task of a group is returned unchanged.
    pub async fn move_up(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        Self::swap_with_neighbour(pool, id, Direction::Up).await
    }

    /// Swap a task with the one directly below it in its group.
    ///
    /// The last task of a group is returned unchanged.
    pub async fn move_down(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        Self::swap_with_neighbour(pool, id, Direction::Down).await
    }

    /// Delete a task by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -- internals -----------------------------------------------------------

    /// Fetch a task and lock its row for the rest of the transaction.
    async fn lock(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Serialise writers that append to or reorder a `(project_id, status)`
    /// group. Held until the transaction ends; the null-project group gets
    /// its own key.
    async fn lock_group(
        tx: &mut Transaction<'_, Postgres>,
        project_id: Option<DbId>,
        status: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "SELECT pg_advisory_xact_lock(\
                hashtext(COALESCE($1::BIGINT::TEXT, '-') || ':' || $2))",
        )
        .bind(project_id)
        .bind(status)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Next free position at the end of a `(project_id, status)` group.
    ///
    /// Takes the group lock first, so concurrent appends get distinct
    /// positions.
    async fn next_position(
        tx: &mut Transaction<'_, Postgres>,
        project_id: Option<DbId>,
        status: &str,
    ) -> Result<i32, sqlx::Error> {
        Self::lock_group(tx, project_id, status).await?;
        let current_max: Option<i32> = sqlx::query_scalar(
            "SELECT MAX(sort_order) FROM tasks \
             WHERE project_id IS NOT DISTINCT FROM $1 AND status = $2",
        )
        .bind(project_id)
        .bind(status)
        .fetch_one(&mut **tx)
        .await?;
        Ok(next_sort_order(current_max))
    }

    /// Renumber a group to `1..n` in list order, splitting any ties.
    async fn renumber_group(
        tx: &mut Transaction<'_, Postgres>,
        project_id: Option<DbId>,
        status: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE tasks t SET sort_order = r.position \
             FROM ( \
                 SELECT id, ROW_NUMBER() OVER (ORDER BY sort_order, id)::INT AS position \
                 FROM tasks \
                 WHERE project_id IS NOT DISTINCT FROM $1 AND status = $2 \
             ) r \
             WHERE t.id = r.id AND t.sort_order <> r.position",
        )
        .bind(project_id)
        .bind(status)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Current `sort_order` of a task inside the open transaction.
    async fn position_of(tx: &mut Transaction<'_, Postgres>, id: DbId) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar("SELECT sort_order FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Move a task to `target` status and append it to the end of that
    /// group. A task already `DONE` keeps its place when marked done again.
    async fn transition(
        pool: &PgPool,
        id: DbId,
        target: &str,
    ) -> Result<Option<Task>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(current) = Self::lock(&mut tx, id).await? else {
            return Ok(None);
        };

        let sort_order = if is_done(target) && current.status == target {
            current.sort_order
        } else {
            Self::next_position(&mut tx, current.project_id, target).await?
        };

        let query = format!(
            "UPDATE tasks SET \
                status = $2, \
                sort_order = $3, \
                completed_at = CASE WHEN $4 THEN COALESCE(completed_at, NOW()) ELSE NULL END, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(target)
            .bind(sort_order)
            .bind(is_done(target))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(task_id = id, status = target, sort_order, "Task status changed");
        Ok(Some(task))
    }

    /// Exchange `sort_order` with the nearest task above or below in the
    /// same group, in list order (`sort_order`, then `id`). Both rows are
    /// locked and updated in one transaction under the group lock. A group
    /// holding duplicate positions is renumbered before the swap.
    async fn swap_with_neighbour(
        pool: &PgPool,
        id: DbId,
        direction: Direction,
    ) -> Result<Option<Task>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(current) = Self::lock(&mut tx, id).await? else {
            return Ok(None);
        };

        Self::lock_group(&mut tx, current.project_id, &current.status).await?;

        let neighbour_query = match direction {
            Direction::Up => {
                "SELECT id, sort_order FROM tasks \
                 WHERE project_id IS NOT DISTINCT FROM $1 AND status = $2 \
                   AND (sort_order, id) < ($3, $4) \
                 ORDER BY sort_order DESC, id DESC \
                 LIMIT 1 FOR UPDATE"
            }
            Direction::Down => {
                "SELECT id, sort_order FROM tasks \
                 WHERE project_id IS NOT DISTINCT FROM $1 AND status = $2 \
                   AND (sort_order, id) > ($3, $4) \
                 ORDER BY sort_order ASC, id ASC \
                 LIMIT 1 FOR UPDATE"
            }
        };
        let neighbour: Option<(DbId, i32)> = sqlx::query_as(neighbour_query)
            .bind(current.project_id)
            .bind(&current.status)
            .bind(current.sort_order)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some((neighbour_id, mut neighbour_order)) = neighbour else {
            return Ok(Some(current));
        };

        let mut current_order = current.sort_order;
        if neighbour_order == current_order {
            Self::renumber_group(&mut tx, current.project_id, &current.status).await?;
            current_order = Self::position_of(&mut tx, id).await?;
            neighbour_order = Self::position_of(&mut tx, neighbour_id).await?;
        }

        sqlx::query("UPDATE tasks SET sort_order = $2, updated_at = NOW() WHERE id = $1")
            .bind(neighbour_id)
            .bind(current_order)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "UPDATE tasks SET sort_order = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(neighbour_order)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(task_id = id, neighbour_id, ?direction, "Task reordered");
        Ok(Some(task))
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for the dynamically-built list query.
enum BindValue {
    BigInt(i64),
    Text(String),
    Date(Date),
}

/// Build a WHERE clause and bind values from `TaskFilter`.
///
/// The clause is empty if no filters are active, or starts with `WHERE `.
fn build_task_filter(filter: &TaskFilter) -> (String, Vec<BindValue>) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_values: Vec<BindValue> = Vec::new();
    let mut bind_idx = 1u32;

    if let Some(project_id) = filter.project_id {
        conditions.push(format!("t.project_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(project_id));
    }

    if let Some(assignee) = filter.assignee_user_id {
        conditions.push(format!("t.assignee_user_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(assignee));
    }

    if let Some(ref status) = filter.status {
        conditions.push(format!("t.status = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(status.clone()));
    }

    if filter.view.open_only() {
        conditions.push(format!("t.status <> '{STATUS_DONE}'"));
    }
    if filter.view.done_only() {
        conditions.push(format!("t.status = '{STATUS_DONE}'"));
    }

    if let Some(window) = filter.view.due_window(filter.today) {
        if let Some(from) = window.from {
            conditions.push(format!("t.due_date >= ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Date(from));
        }
        if let Some(to) = window.to {
            conditions.push(format!("t.due_date <= ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Date(to));
        }
    }

    if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        conditions.push(format!(
            "(t.title ILIKE ${bind_idx} OR COALESCE(t.description, '') ILIKE ${bind_idx})"
        ));
        bind_idx += 1;
        bind_values.push(BindValue::Text(contains_pattern(q)));
    }

    if let Some(tag) = filter.tag.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        conditions.push(format!("COALESCE(t.tags, '') ILIKE ${bind_idx}"));
        bind_values.push(BindValue::Text(contains_pattern(tag)));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (where_clause, bind_values)
}

/// ORDER BY body for each sort mode. Every mode except `Created` ranks
/// TODO before DOING before DONE.
fn order_clause(sort: TaskSort) -> &'static str {
    match sort {
        TaskSort::Order => {
            "CASE t.status WHEN 'TODO' THEN 1 WHEN 'DOING' THEN 2 ELSE 3 END, \
             t.sort_order, t.id ASC"
        }
        TaskSort::Due => {
            "CASE t.status WHEN 'TODO' THEN 1 WHEN 'DOING' THEN 2 ELSE 3 END, \
             t.due_date NULLS LAST, t.sort_order, t.id DESC"
        }
        TaskSort::Priority => {
            "CASE t.status WHEN 'TODO' THEN 1 WHEN 'DOING' THEN 2 ELSE 3 END, \
             CASE t.priority WHEN 'HIGH' THEN 1 WHEN 'MID' THEN 2 ELSE 3 END, \
             t.sort_order, t.due_date NULLS LAST, t.id DESC"
        }
        TaskSort::Created => "t.id DESC",
    }
}

/// `%needle%` ILIKE pattern with `%`, `_` and `\` escaped.
fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
