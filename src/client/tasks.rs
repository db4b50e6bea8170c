use crate::client::{ClientError, TodoGateway, TodoSetInput};
use crate::dto::Todo;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

/// How urgent a task is. Only the frontend knows about this; the gateway never sees it and
/// reloaded tasks always come back as [Priority::Normal].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Normal,
}

/// A todo as the UI shows it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    #[serde(flatten)]
    pub todo: Todo,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
}

/// The frontend's working copy of the todo list
#[derive(Debug, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    /// Fetches every todo from the gateway. All of them start out with normal priority.
    pub async fn load(gateway: &impl TodoGateway) -> Result<TaskList, ClientError> {
        let todos = gateway.todos().await.inspect_err(|err| {
            error!("Failed to fetch tasks: {err}");
        })?;
        info!(count = todos.len(), "Loaded tasks");

        Ok(TaskList {
            tasks: todos
                .into_iter()
                .map(|todo| Task {
                    todo,
                    priority: Priority::Normal,
                })
                .collect(),
        })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Creates the todo through the gateway and appends it with the requested priority
    pub async fn add_task(
        &mut self,
        task: NewTask,
        gateway: &impl TodoGateway,
    ) -> Result<&Task, ClientError> {
        let todo = gateway
            .create_todo(&task.title, task.description.as_deref())
            .await
            .inspect_err(|err| error!("Failed to add task: {err}"))?;

        self.tasks.push(Task {
            todo,
            priority: task.priority,
        });
        let added = self.tasks.len() - 1;

        Ok(&self.tasks[added])
    }

    /// Sets a task's completion through the gateway. The task keeps its local priority.
    pub async fn toggle_task(
        &mut self,
        id: Uuid,
        completed: bool,
        gateway: &impl TodoGateway,
    ) -> Result<&Task, ClientError> {
        let position = self.position_of(id)?;
        let updated = gateway
            .update_todo(id, &TodoSetInput::completed(completed))
            .await
            .inspect_err(|err| error!("Failed to toggle task: {err}"))?;

        let task = &mut self.tasks[position];
        task.todo.completed = updated.completed;

        Ok(task)
    }

    /// Deletes a task through the gateway and drops it from the list
    pub async fn remove_task(
        &mut self,
        id: Uuid,
        gateway: &impl TodoGateway,
    ) -> Result<Task, ClientError> {
        let position = self.position_of(id)?;
        gateway
            .delete_todo(id)
            .await
            .inspect_err(|err| error!("Failed to remove task: {err}"))?;

        Ok(self.tasks.remove(position))
    }

    fn position_of(&self, id: Uuid) -> Result<usize, ClientError> {
        self.tasks
            .iter()
            .position(|task| task.todo.id == id)
            .ok_or(ClientError::UnknownTask(id))
    }
}
