use crate::domain::todo::NewTodo;
use crate::retry::{FixedRetry, RetriesExhausted, with_fixed_retry};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, query, query_scalar};
use std::time::Duration;
use tracing::info;

/// DDL for the only table in the system. The gateway exposes the same table, so column names
/// must stay in sync with the permissions declared in [crate::gateway].
const CREATE_TODOS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS todos (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    title TEXT NOT NULL,
    description TEXT,
    completed BOOLEAN NOT NULL DEFAULT false,
    "createdAt" TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

/// Builds a connection pool for the given connection options. Fails if the first connection
/// can't be established.
pub async fn connect_pool(options: PgConnectOptions) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(2))
        .connect_with(options)
        .await
}

/// Keeps trying to build a connection pool while the database starts up
pub async fn connect_with_retry(
    options: &PgConnectOptions,
    policy: FixedRetry,
) -> Result<PgPool, RetriesExhausted<sqlx::Error>> {
    with_fixed_retry("database connection", policy, || {
        connect_pool(options.clone())
    })
    .await
}

/// Builds a connection pool from a PostgreSQL URL
pub async fn connect_sqlx(db_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(2))
        .connect(db_url)
        .await
}

/// Creates the todos table if it doesn't exist yet. Returns true if the table had to be created.
pub async fn ensure_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let table_exists: bool =
        query_scalar("SELECT to_regclass('public.todos') IS NOT NULL")
            .fetch_one(pool)
            .await?;
    info!(table_exists, "checked for the todos table");

    if table_exists {
        return Ok(false);
    }

    query(CREATE_TODOS_TABLE).execute(pool).await?;
    info!("created the todos table");

    Ok(true)
}

/// The todos init-db seeds a fresh environment with
pub fn sample_todos() -> Vec<NewTodo> {
    [
        (
            "Complete Project Setup",
            "Set up the development environment and install necessary dependencies",
            false,
        ),
        (
            "Implement Todo Features",
            "Add CRUD operations and implement the todo list functionality",
            false,
        ),
        (
            "Add Description Field",
            "Update the database schema and UI to support todo descriptions",
            true,
        ),
        (
            "Style the Application",
            "Apply Tailwind CSS and shadcn/ui components for a better user experience",
            false,
        ),
    ]
    .into_iter()
    .map(|(title, description, completed)| NewTodo {
        title: title.to_owned(),
        description: Some(description.to_owned()),
        completed,
    })
    .collect()
}
