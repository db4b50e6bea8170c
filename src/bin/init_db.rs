use anyhow::Context;
use dotenv::dotenv;
use todo_app::config::{self, DatabaseConfig};
use todo_app::domain::todo::TodoService;
use todo_app::domain::todo::driving_ports::TodoPort;
use todo_app::persistence::ExternalConnectivity;
use todo_app::persistence::db_todo_driven_ports::DbTodoWriter;
use todo_app::retry::FixedRetry;
use todo_app::{db, logging};
use tracing::info;

/// Creates the todos table and, unless disabled, replaces its contents with the sample todos
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();
    logging::init_from_env("init-db")?;

    let db_config = DatabaseConfig::from_env()?;
    let connect_options = db_config.connect_options()?;
    info!(
        host = db_config.host,
        database = db_config.database,
        "Connecting to the database"
    );
    let pool = db::connect_with_retry(&connect_options, FixedRetry::default())
        .await
        .context("connecting to the database")?;

    db::ensure_schema(&pool)
        .await
        .context("ensuring the todos table exists")?;

    if !config::seed_sample_todos()? {
        info!("Sample todos disabled, leaving the table as it is");
        return Ok(());
    }

    let samples = db::sample_todos();
    let ext_cxn = ExternalConnectivity::new(pool.clone());
    let seeded = TodoService
        .replace_all_todos(&samples, &ext_cxn, &DbTodoWriter)
        .await
        .context("seeding sample todos")?;
    info!(count = seeded.len(), "Seeded sample todos");

    pool.close().await;
    Ok(())
}
