use crate::domain;
use crate::domain::todo::{NewTodo, Todo, TodoPatch};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, query, query_as};
use uuid::Uuid;

const TODO_COLUMNS: &str = r#"id, title, description, completed, "createdAt""#;

#[derive(FromRow)]
struct TodoRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    completed: bool,
    #[sqlx(rename = "createdAt")]
    created_at: DateTime<Utc>,
}

impl From<TodoRow> for domain::todo::Todo {
    fn from(value: TodoRow) -> Self {
        Todo {
            id: value.id,
            title: value.title,
            description: value.description,
            completed: value.completed,
            created_at: value.created_at,
        }
    }
}

pub struct DbTodoReader;

impl domain::todo::driven_ports::TodoReader for DbTodoReader {
    async fn all_todos(&self, ext_cxn: &mut impl ExternalConnectivity) -> Result<Vec<Todo>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let todos: Vec<Todo> = query_as::<_, TodoRow>(&format!(
            r#"SELECT {TODO_COLUMNS} FROM todos ORDER BY "createdAt", id"#
        ))
        .fetch_all(cxn.borrow_connection())
        .await
        .context("trying to fetch all todos")?
        .into_iter()
        .map(Todo::from)
        .collect();

        Ok(todos)
    }

    async fn todo_by_id(
        &self,
        id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Todo>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let todo = query_as::<_, TodoRow>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to fetch a todo by ID")?
        .map(Todo::from);

        Ok(todo)
    }
}

pub struct DbTodoWriter;

impl domain::todo::driven_ports::TodoWriter for DbTodoWriter {
    async fn create_todo(
        &self,
        new_todo: &NewTodo,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Todo, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let created = query_as::<_, TodoRow>(&format!(
            "INSERT INTO todos(title, description, completed) VALUES ($1, $2, $3) RETURNING {TODO_COLUMNS}"
        ))
        .bind(&new_todo.title)
        .bind(&new_todo.description)
        .bind(new_todo.completed)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new todo into the database")?;

        Ok(created.into())
    }

    async fn update_todo(
        &self,
        id: Uuid,
        patch: &TodoPatch,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Todo>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        // $3 says whether the description was part of the patch, since NULL is a legal new value
        let updated = query_as::<_, TodoRow>(&format!(
            "UPDATE todos SET \
                title = COALESCE($2, title), \
                description = CASE WHEN $3 THEN $4 ELSE description END, \
                completed = COALESCE($5, completed) \
            WHERE id = $1 RETURNING {TODO_COLUMNS}"
        ))
        .bind(id)
        .bind(&patch.title)
        .bind(patch.description.is_some())
        .bind(patch.description.clone().flatten())
        .bind(patch.completed)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to update a todo in the database")?
        .map(Todo::from);

        Ok(updated)
    }

    async fn delete_todo(
        &self,
        id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Todo>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let removed = query_as::<_, TodoRow>(&format!(
            "DELETE FROM todos WHERE id = $1 RETURNING {TODO_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to remove a todo from the database")?
        .map(Todo::from);

        Ok(removed)
    }

    async fn clear_todos(&self, ext_cxn: &mut impl ExternalConnectivity) -> Result<u64, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let result = query("DELETE FROM todos")
            .execute(cxn.borrow_connection())
            .await
            .context("trying to clear the todos table")?;

        Ok(result.rows_affected())
    }
}
