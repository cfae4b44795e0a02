use chrono::TimeZone;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection};
use taskscribe_server::entities::task;
use taskscribe_server::task::{TaskService, TaskServiceError};

mod common;

pub struct TestContext {
    pub db: DatabaseConnection,
}

async fn setup() -> anyhow::Result<TestContext> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    let db = common::setup_db().await?;
    Ok(TestContext { db })
}

/// Test helper to insert a task with an explicit creation timestamp and
/// return its ID.
async fn insert_task_at(
    db: &DatabaseConnection,
    description: &str,
    created_at: chrono::DateTime<chrono::Utc>,
) -> i32 {
    let active_model = task::ActiveModel {
        description: ActiveValue::Set(description.to_string()),
        completed: ActiveValue::Set(false),
        created_at: ActiveValue::Set(created_at.into()),
        ..Default::default()
    };
    let created = active_model.insert(db).await.expect("Failed to insert task");
    created.id
}

#[tokio::test]
async fn can_create_task() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let created_task = task_service
        .create_task("Buy milk".to_string())
        .await
        .expect("Failed to create task");

    assert_eq!(created_task.description(), "Buy milk");
    assert!(!created_task.completed());
    assert!(created_task.id() > 0);
}

#[tokio::test]
async fn can_list_created_task() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let created_task = task_service
        .create_task("Water the plants".to_string())
        .await
        .expect("Failed to create task");

    let tasks = task_service
        .get_all_tasks()
        .await
        .expect("Failed to get all tasks");

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0], created_task);
}

#[tokio::test]
async fn can_handle_empty_task_list() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let tasks = task_service
        .get_all_tasks()
        .await
        .expect("Failed to get all tasks");

    assert!(tasks.is_empty());
}

#[tokio::test]
async fn can_toggle_task_twice_back_to_original() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let created_task = task_service
        .create_task("Practice scales".to_string())
        .await
        .expect("Failed to create task");
    assert!(!created_task.completed());

    let toggled_once = task_service
        .toggle_task_by_id(created_task.id())
        .await
        .expect("Failed to toggle task");
    assert!(toggled_once.completed());

    let toggled_twice = task_service
        .toggle_task_by_id(created_task.id())
        .await
        .expect("Failed to toggle task");
    assert!(!toggled_twice.completed());
    assert_eq!(toggled_twice, created_task);
}

#[tokio::test]
async fn can_update_description_without_touching_other_fields() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let created_task = task_service
        .create_task("Initial description".to_string())
        .await
        .expect("Failed to create task");

    let updated_task = task_service
        .update_task_by_id(created_task.id(), "Updated description".to_string())
        .await
        .expect("Failed to update task");

    assert_eq!(updated_task.description(), "Updated description");
    assert_eq!(updated_task.id(), created_task.id());
    assert_eq!(updated_task.completed(), created_task.completed());
    assert_eq!(updated_task.created_at(), created_task.created_at());
}

#[tokio::test]
async fn can_handle_toggle_when_task_not_found() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let result = task_service.toggle_task_by_id(404).await;

    assert!(matches!(result, Err(TaskServiceError::TaskNotFound(404))));
}

#[tokio::test]
async fn can_handle_update_when_task_not_found() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let created_task = task_service
        .create_task("Existing task".to_string())
        .await
        .expect("Failed to create task");

    let non_existent_id = created_task.id() + 1;
    let result = task_service
        .update_task_by_id(non_existent_id, "Another description".to_string())
        .await;

    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(
            e.to_string(),
            format!("Task with ID {} not found", non_existent_id)
        );
    }
}

#[tokio::test]
async fn can_delete_task_and_exclude_it_from_listing() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let kept_task = task_service
        .create_task("Keep me".to_string())
        .await
        .expect("Failed to create task");
    let doomed_task = task_service
        .create_task("Delete me".to_string())
        .await
        .expect("Failed to create task");

    let deleted_task = task_service
        .delete_task_by_id(doomed_task.id())
        .await
        .expect("Failed to delete task");
    assert_eq!(deleted_task, doomed_task);

    let tasks = task_service
        .get_all_tasks()
        .await
        .expect("Failed to get all tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0], kept_task);
}

#[tokio::test]
async fn can_handle_delete_when_task_not_found() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let result = task_service.delete_task_by_id(12345).await;

    assert!(matches!(result, Err(TaskServiceError::TaskNotFound(12345))));
}

#[tokio::test]
async fn can_list_tasks_newest_first() {
    let state = setup().await.expect("Failed to setup test context");

    let t1 = chrono::Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap();
    let t2 = chrono::Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap();
    let t3 = chrono::Utc.with_ymd_and_hms(2026, 8, 1, 11, 0, 0).unwrap();

    insert_task_at(&state.db, "first", t1).await;
    insert_task_at(&state.db, "second", t2).await;
    insert_task_at(&state.db, "third", t3).await;

    let task_service = TaskService::new(&state.db);
    let tasks = task_service
        .get_all_tasks()
        .await
        .expect("Failed to get all tasks");

    let descriptions: Vec<&str> = tasks.iter().map(|task| task.description()).collect();
    assert_eq!(descriptions, vec!["third", "second", "first"]);
}
