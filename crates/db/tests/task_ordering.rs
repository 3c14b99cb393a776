//! Integration tests for fixed task ordering within (project, status) groups.

use sqlx::PgPool;
use taskboard_db::models::project::CreateProject;
use taskboard_db::models::task::{CreateTask, Task, UpdateTask};
use taskboard_db::repositories::{ProjectRepo, TaskRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn project(pool: &PgPool, name: &str) -> i64 {
    ProjectRepo::create(
        pool,
        &CreateProject {
            name: name.to_string(),
            description: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn task(pool: &PgPool, project_id: i64, title: &str) -> Task {
    TaskRepo::create(
        pool,
        &CreateTask {
            project_id: Some(project_id),
            assignee_user_id: None,
            title: title.to_string(),
            description: None,
            status: None,
            priority: None,
            due_date: None,
            tags: None,
        },
    )
    .await
    .unwrap()
}

async fn sort_order(pool: &PgPool, id: i64) -> i32 {
    TaskRepo::find_by_id(pool, id)
        .await
        .unwrap()
        .unwrap()
        .sort_order
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_new_tasks_append_per_group(pool: PgPool) {
    let math = project(&pool, "Math").await;
    let art = project(&pool, "Art").await;

    let m1 = task(&pool, math, "m1").await;
    let m2 = task(&pool, math, "m2").await;
    let a1 = task(&pool, art, "a1").await;

    assert_eq!(m1.sort_order, 1);
    assert_eq!(m2.sort_order, 2);
    // A different project is a different group.
    assert_eq!(a1.sort_order, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_move_up_swaps_with_previous(pool: PgPool) {
    let p = project(&pool, "P").await;
    let first = task(&pool, p, "first").await;
    let second = task(&pool, p, "second").await;

    let moved = TaskRepo::move_up(&pool, second.id).await.unwrap().unwrap();
    assert_eq!(moved.sort_order, 1);
    assert_eq!(sort_order(&pool, first.id).await, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_move_down_swaps_with_next(pool: PgPool) {
    let p = project(&pool, "P").await;
    let first = task(&pool, p, "first").await;
    let second = task(&pool, p, "second").await;
    let third = task(&pool, p, "third").await;

    let moved = TaskRepo::move_down(&pool, first.id).await.unwrap().unwrap();
    assert_eq!(moved.sort_order, 2);
    assert_eq!(sort_order(&pool, second.id).await, 1);
    assert_eq!(sort_order(&pool, third.id).await, 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_move_at_group_boundary_is_noop(pool: PgPool) {
    let p = project(&pool, "P").await;
    let first = task(&pool, p, "first").await;
    let last = task(&pool, p, "last").await;

    let unchanged = TaskRepo::move_up(&pool, first.id).await.unwrap().unwrap();
    assert_eq!(unchanged.sort_order, 1);

    let unchanged = TaskRepo::move_down(&pool, last.id).await.unwrap().unwrap();
    assert_eq!(unchanged.sort_order, 2);
    assert_eq!(sort_order(&pool, first.id).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_move_stays_within_status_group(pool: PgPool) {
    let p = project(&pool, "P").await;
    let todo = task(&pool, p, "todo").await;
    let doing = task(&pool, p, "doing").await;
    TaskRepo::update(
        &pool,
        doing.id,
        &UpdateTask {
            status: Some("DOING".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // `doing` is alone in its group, so moving it does nothing to `todo`.
    TaskRepo::move_up(&pool, doing.id).await.unwrap();
    assert_eq!(sort_order(&pool, todo.id).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_change_appends_to_new_group(pool: PgPool) {
    let p = project(&pool, "P").await;
    let a = task(&pool, p, "a").await;
    let b = task(&pool, p, "b").await;
    let c = task(&pool, p, "c").await;

    TaskRepo::update(
        &pool,
        a.id,
        &UpdateTask {
            status: Some("DOING".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let c_doing = TaskRepo::update(
        &pool,
        c.id,
        &UpdateTask {
            status: Some("DOING".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(sort_order(&pool, a.id).await, 1);
    assert_eq!(c_doing.sort_order, 2);
    // b keeps its slot in TODO.
    assert_eq!(sort_order(&pool, b.id).await, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_change_appends_to_new_group(pool: PgPool) {
    let from = project(&pool, "From").await;
    let to = project(&pool, "To").await;
    task(&pool, to, "existing 1").await;
    task(&pool, to, "existing 2").await;
    let moving = task(&pool, from, "moving").await;

    let moved = TaskRepo::update(
        &pool,
        moving.id,
        &UpdateTask {
            project_id: Some(Some(to)),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(moved.project_id, Some(to));
    assert_eq!(moved.sort_order, 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unchanged_group_keeps_position(pool: PgPool) {
    let p = project(&pool, "P").await;
    let a = task(&pool, p, "a").await;
    task(&pool, p, "b").await;

    let edited = TaskRepo::update(
        &pool,
        a.id,
        &UpdateTask {
            title: Some("a renamed".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(edited.sort_order, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_done_then_undo_reappends_to_todo(pool: PgPool) {
    let p = project(&pool, "P").await;
    let a = task(&pool, p, "a").await;
    task(&pool, p, "b").await;
    task(&pool, p, "c").await;

    let done = TaskRepo::mark_done(&pool, a.id).await.unwrap().unwrap();
    assert_eq!(done.status, "DONE");
    assert!(done.completed_at.is_some());
    assert_eq!(done.sort_order, 1);

    let undone = TaskRepo::undo(&pool, a.id).await.unwrap().unwrap();
    assert_eq!(undone.status, "TODO");
    assert!(undone.completed_at.is_none());
    assert_eq!(undone.sort_order, 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_done_twice_keeps_completion_time(pool: PgPool) {
    let p = project(&pool, "P").await;
    let a = task(&pool, p, "a").await;

    let first = TaskRepo::mark_done(&pool, a.id).await.unwrap().unwrap();
    let second = TaskRepo::mark_done(&pool, a.id).await.unwrap().unwrap();
    assert_eq!(first.completed_at, second.completed_at);
    assert_eq!(first.sort_order, second.sort_order);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tasks_without_project_form_their_own_group(pool: PgPool) {
    let loose = |title: &str| CreateTask {
        project_id: None,
        assignee_user_id: None,
        title: title.to_string(),
        description: None,
        status: None,
        priority: None,
        due_date: None,
        tags: None,
    };
    let a = TaskRepo::create(&pool, &loose("a")).await.unwrap();
    let b = TaskRepo::create(&pool, &loose("b")).await.unwrap();
    assert_eq!(a.sort_order, 1);
    assert_eq!(b.sort_order, 2);

    let moved = TaskRepo::move_up(&pool, b.id).await.unwrap().unwrap();
    assert_eq!(moved.sort_order, 1);
    assert_eq!(sort_order(&pool, a.id).await, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_undo_on_open_task_reappends_to_todo(pool: PgPool) {
    let p = project(&pool, "P").await;
    let a = task(&pool, p, "a").await;
    let b = task(&pool, p, "b").await;

    let undone = TaskRepo::undo(&pool, a.id).await.unwrap().unwrap();
    assert_eq!(undone.status, "TODO");
    assert_eq!(undone.sort_order, 3);
    assert_eq!(sort_order(&pool, b.id).await, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_creates_get_distinct_positions(pool: PgPool) {
    let p = project(&pool, "P").await;

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let pool = pool.clone();
            tokio::spawn(async move { task(&pool, p, &format!("t{i}")).await.sort_order })
        })
        .collect();

    let mut orders = Vec::new();
    for handle in handles {
        orders.push(handle.await.unwrap());
    }
    orders.sort_unstable();
    assert_eq!(orders, (1..=16).collect::<Vec<i32>>());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_move_splits_tied_positions(pool: PgPool) {
    let p = project(&pool, "P").await;
    let a = task(&pool, p, "a").await;
    let b = task(&pool, p, "b").await;
    let c = task(&pool, p, "c").await;

    // Leave a and b sharing a position; list order falls back to id.
    sqlx::query("UPDATE tasks SET sort_order = 1 WHERE id = $1")
        .bind(b.id)
        .execute(&pool)
        .await
        .unwrap();

    let moved = TaskRepo::move_up(&pool, b.id).await.unwrap().unwrap();
    assert_eq!(moved.sort_order, 1);
    assert_eq!(sort_order(&pool, a.id).await, 2);
    assert_eq!(sort_order(&pool, c.id).await, 3);

    let moved = TaskRepo::move_down(&pool, b.id).await.unwrap().unwrap();
    assert_eq!(moved.sort_order, 2);
    assert_eq!(sort_order(&pool, a.id).await, 1);
}
