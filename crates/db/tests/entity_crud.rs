//! Integration tests for user / project / task CRUD.
//!
//! Exercises the repository layer against a real database:
//! - Create and read back each entity
//! - Partial updates, including clearing nullable columns
//! - Foreign key violations
//! - Delete semantics for projects (blocked) and users (unassign)

use assert_matches::assert_matches;
use sqlx::PgPool;
use taskboard_db::models::project::{CreateProject, ProjectDeletion, UpdateProject};
use taskboard_db::models::task::{CreateTask, UpdateTask};
use taskboard_db::models::user::{CreateUser, UpdateUser};
use taskboard_db::repositories::{ProjectRepo, TaskRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_project(name: &str) -> CreateProject {
    CreateProject {
        name: name.to_string(),
        description: None,
    }
}

fn new_user(name: &str) -> CreateUser {
    CreateUser {
        display_name: name.to_string(),
        email: None,
    }
}

fn new_task(project_id: Option<i64>, title: &str) -> CreateTask {
    CreateTask {
        project_id,
        assignee_user_id: None,
        title: title.to_string(),
        description: None,
        status: None,
        priority: None,
        due_date: None,
        tags: None,
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_crud(pool: PgPool) {
    let user = UserRepo::create(
        &pool,
        &CreateUser {
            display_name: "Aki".to_string(),
            email: Some("aki@example.com".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(user.display_name, "Aki");

    let found = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(found.email.as_deref(), Some("aki@example.com"));

    // Clearing the email leaves the name alone.
    let updated = UserRepo::update(
        &pool,
        user.id,
        &UpdateUser {
            display_name: None,
            email: Some(None),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.display_name, "Aki");
    assert_eq!(updated.email, None);

    assert!(UserRepo::exists(&pool, user.id).await.unwrap());
    assert!(UserRepo::delete(&pool, user.id).await.unwrap());
    assert!(!UserRepo::exists(&pool, user.id).await.unwrap());
    assert!(!UserRepo::delete(&pool, user.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_missing_user_returns_none(pool: PgPool) {
    let result = UserRepo::update(&pool, 999_999, &UpdateUser::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_user_unassigns_tasks(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("Ren")).await.unwrap();
    let task = TaskRepo::create(
        &pool,
        &CreateTask {
            assignee_user_id: Some(user.id),
            ..new_task(None, "Assigned")
        },
    )
    .await
    .unwrap();
    assert_eq!(task.assignee_user_id, Some(user.id));

    assert!(UserRepo::delete(&pool, user.id).await.unwrap());

    let task = TaskRepo::find_by_id(&pool, task.id).await.unwrap().unwrap();
    assert_eq!(task.assignee_user_id, None);
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_crud(pool: PgPool) {
    let project = ProjectRepo::create(
        &pool,
        &CreateProject {
            name: "Thesis".to_string(),
            description: Some("Final year".to_string()),
        },
    )
    .await
    .unwrap();

    let updated = ProjectRepo::update(
        &pool,
        project.id,
        &UpdateProject {
            name: Some("Thesis 2".to_string()),
            description: None,
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.name, "Thesis 2");
    assert_eq!(updated.description.as_deref(), Some("Final year"));

    let projects = ProjectRepo::list(&pool).await.unwrap();
    assert_eq!(projects.len(), 1);

    assert_eq!(
        ProjectRepo::delete(&pool, project.id).await.unwrap(),
        ProjectDeletion::Deleted
    );
    assert!(ProjectRepo::find_by_id(&pool, project.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_missing_project(pool: PgPool) {
    assert_eq!(
        ProjectRepo::delete(&pool, 424_242).await.unwrap(),
        ProjectDeletion::NotFound
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_project_with_tasks_is_blocked(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Busy")).await.unwrap();
    let a = TaskRepo::create(&pool, &new_task(Some(project.id), "A"))
        .await
        .unwrap();
    let b = TaskRepo::create(&pool, &new_task(Some(project.id), "B"))
        .await
        .unwrap();

    assert_eq!(ProjectRepo::count_tasks(&pool, project.id).await.unwrap(), 2);
    assert_eq!(
        ProjectRepo::delete(&pool, project.id).await.unwrap(),
        ProjectDeletion::HasTasks(2)
    );

    // Nothing was removed.
    assert!(ProjectRepo::exists(&pool, project.id).await.unwrap());
    assert!(TaskRepo::find_by_id(&pool, a.id).await.unwrap().is_some());

    // Once the tasks are gone the project can go too.
    TaskRepo::delete(&pool, a.id).await.unwrap();
    TaskRepo::delete(&pool, b.id).await.unwrap();
    assert_eq!(
        ProjectRepo::delete(&pool, project.id).await.unwrap(),
        ProjectDeletion::Deleted
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_raw_project_delete_is_restricted_by_fk(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Guarded")).await.unwrap();
    TaskRepo::create(&pool, &new_task(Some(project.id), "Child"))
        .await
        .unwrap();

    let err = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(project.id)
        .execute(&pool)
        .await
        .unwrap_err();
    assert_matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23503"));
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_task_with_project_is_retrievable(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Math")).await.unwrap();
    let task = TaskRepo::create(&pool, &new_task(Some(project.id), "Problem set 3"))
        .await
        .unwrap();

    assert_eq!(task.status, "TODO");
    assert_eq!(task.priority, "MID");
    assert_eq!(task.sort_order, 1);
    assert!(task.completed_at.is_none());

    let found = TaskRepo::find_by_id(&pool, task.id).await.unwrap().unwrap();
    assert_eq!(found.title, "Problem set 3");
    assert_eq!(found.project_id, Some(project.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_task_with_missing_project_fails(pool: PgPool) {
    let err = TaskRepo::create(&pool, &new_task(Some(987_654), "Orphan"))
        .await
        .unwrap_err();
    assert_matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23503"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_done_task_stamps_completed_at(pool: PgPool) {
    let task = TaskRepo::create(
        &pool,
        &CreateTask {
            status: Some("DONE".to_string()),
            ..new_task(None, "Already finished")
        },
    )
    .await
    .unwrap();
    assert!(task.completed_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_status_bumps_updated_at(pool: PgPool) {
    let task = TaskRepo::create(&pool, &new_task(None, "Write intro"))
        .await
        .unwrap();

    // Push the timestamps into the past so the bump is observable.
    sqlx::query(
        "UPDATE tasks SET created_at = created_at - INTERVAL '1 hour', \
         updated_at = updated_at - INTERVAL '1 hour' WHERE id = $1",
    )
    .bind(task.id)
    .execute(&pool)
    .await
    .unwrap();
    let before = TaskRepo::find_by_id(&pool, task.id).await.unwrap().unwrap();

    let updated = TaskRepo::update(
        &pool,
        task.id,
        &UpdateTask {
            status: Some("DOING".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.status, "DOING");
    assert!(updated.updated_at > before.updated_at);
    assert_eq!(updated.created_at, before.created_at);

    let persisted = TaskRepo::find_by_id(&pool, task.id).await.unwrap().unwrap();
    assert_eq!(persisted.status, "DOING");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_partial_update_keeps_and_clears_fields(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Lab")).await.unwrap();
    let due = chrono::NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    let task = TaskRepo::create(
        &pool,
        &CreateTask {
            description: Some("measure twice".to_string()),
            due_date: Some(due),
            tags: Some("lab,report".to_string()),
            ..new_task(Some(project.id), "Experiment")
        },
    )
    .await
    .unwrap();

    let updated = TaskRepo::update(
        &pool,
        task.id,
        &UpdateTask {
            title: Some("Experiment 2".to_string()),
            due_date: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.title, "Experiment 2");
    assert_eq!(updated.due_date, None);
    assert_eq!(updated.description.as_deref(), Some("measure twice"));
    assert_eq!(updated.tags.as_deref(), Some("lab,report"));
    assert_eq!(updated.project_id, Some(project.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_to_done_and_back_manages_completed_at(pool: PgPool) {
    let task = TaskRepo::create(&pool, &new_task(None, "Toggle")).await.unwrap();

    let done = TaskRepo::update(
        &pool,
        task.id,
        &UpdateTask {
            status: Some("DONE".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    let completed_at = done.completed_at.expect("completed_at should be set");

    // Editing another field keeps the original completion time.
    let edited = TaskRepo::update(
        &pool,
        task.id,
        &UpdateTask {
            priority: Some("HIGH".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(edited.completed_at, Some(completed_at));

    let reopened = TaskRepo::update(
        &pool,
        task.id,
        &UpdateTask {
            status: Some("TODO".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(reopened.completed_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_and_delete_missing_task(pool: PgPool) {
    assert!(TaskRepo::update(&pool, 555, &UpdateTask::default())
        .await
        .unwrap()
        .is_none());
    assert!(!TaskRepo::delete(&pool, 555).await.unwrap());
    assert!(TaskRepo::mark_done(&pool, 555).await.unwrap().is_none());
    assert!(TaskRepo::move_up(&pool, 555).await.unwrap().is_none());
}
