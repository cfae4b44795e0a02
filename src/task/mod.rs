use crate::entities::*;
use sea_orm::*;

pub mod api;

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    id: i32,
    description: String,
    completed: bool,
    created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl Task {
    pub fn new(
        id: i32,
        description: String,
        completed: bool,
        created_at: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Self {
            id,
            description,
            completed,
            created_at,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Returns the task description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns whether the task is completed.
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Returns the creation timestamp of the task.
    pub fn created_at(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.created_at
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task::new(
            model.id,
            model.description,
            model.completed,
            model.created_at,
        )
    }
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// Represents a task not found error.
    #[error("Task with ID {0} not found")]
    TaskNotFound(i32),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub struct TaskService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl TaskService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> TaskService {
        TaskService { db }
    }

    /// Creates a new task in the database.
    ///
    /// # Arguments
    ///
    /// * `description` - The description of the task. Must be non-empty;
    ///   callers validate before reaching the store.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, description: String) -> Result<Task, TaskServiceError> {
        let txn = self.db.begin().await?;
        let active_model = task::ActiveModel {
            description: ActiveValue::Set(description),
            completed: ActiveValue::Set(false),
            created_at: ActiveValue::Set(chrono::Utc::now().into()),
            ..Default::default()
        };
        let created_model = active_model.insert(&txn).await?;
        txn.commit().await?;
        Ok(Task::from(created_model))
    }

    /// Retrieves all tasks from the database, newest first.
    ///
    /// # Returns
    ///
    /// A `Result` containing a vector of `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_tasks(&self) -> Result<Vec<Task>, TaskServiceError> {
        let tasks = task::Entity::find()
            .order_by_desc(task::Column::CreatedAt)
            .order_by_desc(task::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    /// Flips the completion status of a task by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to toggle.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_task_by_id(&self, id: i32) -> Result<Task, TaskServiceError> {
        let txn = self.db.begin().await?;
        let task_to_toggle = task::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))?;

        let completed = task_to_toggle.completed;
        let mut active_model: task::ActiveModel = task_to_toggle.into();
        active_model.completed = ActiveValue::Set(!completed);
        let updated_model = active_model.update(&txn).await?;
        txn.commit().await?;

        Ok(Task::from(updated_model))
    }

    /// Replaces the description of a task by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to update.
    /// * `new_description` - The new description for the task.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn update_task_by_id(
        &self,
        id: i32,
        new_description: String,
    ) -> Result<Task, TaskServiceError> {
        let txn = self.db.begin().await?;
        let task_to_update = task::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))?;

        let mut active_model: task::ActiveModel = task_to_update.into();
        active_model.description = ActiveValue::Set(new_description);
        let updated_model = active_model.update(&txn).await?;
        txn.commit().await?;

        Ok(Task::from(updated_model))
    }

    /// Deletes a task by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to delete.
    ///
    /// # Returns
    ///
    /// A `Result` containing the deleted `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task_by_id(&self, id: i32) -> Result<Task, TaskServiceError> {
        let txn = self.db.begin().await?;
        let task_to_delete = task::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))?;

        let task_copy = Task::from(task_to_delete.clone());
        task::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(task_copy)
    }
}
