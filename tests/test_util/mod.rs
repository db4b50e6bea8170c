use dotenv::dotenv;
use lazy_static::lazy_static;
use rand::{Rng, thread_rng};
use sqlx::{Connection, PgConnection, PgPool};
use std::env;
use std::future::Future;
use todo_app::db;
use tokio::runtime::Runtime;

lazy_static! {
    static ref TOKIO_RT: Runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Tokio runtime failed to initialize");
}

/// A throwaway database which is dropped again once the test finishes
struct TestDatabase {
    base_url: String,
    db_name: String,
}

impl TestDatabase {
    async fn create(base_url: &str) -> Result<Self, sqlx::Error> {
        let mut rng = thread_rng();
        let db_id: u32 = rng.gen_range(10_000..99_999);
        let db_name = format!("test_db_{db_id}");
        let mut conn = PgConnection::connect(base_url).await?;

        let result = sqlx::query(format!("CREATE DATABASE {db_name}").as_str())
            .execute(&mut conn)
            .await;
        let _ = conn.close().await;
        result?;

        Ok(TestDatabase {
            base_url: base_url.to_owned(),
            db_name,
        })
    }

    fn url(&self) -> String {
        format!("{}/{}", self.base_url, self.db_name)
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        let db_to_drop = self.db_name.clone();
        let conn_str = self.base_url.clone();

        TOKIO_RT.block_on(async move {
            let mut conn = match PgConnection::connect(&conn_str).await {
                Ok(cxn) => cxn,
                Err(conn_err) => {
                    println!(
                        "Failed to reconnect to drop test database {db_to_drop}, please remove it manually. Error: {conn_err}"
                    );
                    return;
                }
            };

            let drop_result =
                sqlx::query(format!("DROP DATABASE IF EXISTS {db_to_drop} WITH (FORCE)").as_str())
                    .execute(&mut conn)
                    .await;
            if let Err(db_err) = drop_result {
                println!(
                    "Failed to drop test database {db_to_drop}, please remove it manually. Error: {db_err}"
                );
            }
            let _ = conn.close().await;
        });
    }
}

/// Creates a temp database with the todos table for a test, hands the test a pool connected
/// to it, and drops the database afterwards.
///
/// Expects that the TEST_DB_URL environment variable is populated
pub fn prepare_db_and_test<F, R>(test_fn: F)
where
    R: Future<Output = ()>,
    F: FnOnce(PgPool) -> R,
{
    if dotenv().is_err() {
        println!("Test is running without .env file.");
    }

    let base_url = env::var("TEST_DB_URL").expect(
        "You must provide the TEST_DB_URL environment variable as the base postgres connection string",
    );
    let test_db = match TOKIO_RT.block_on(TestDatabase::create(&base_url)) {
        Ok(tdb) => tdb,
        Err(db_err) => panic!("Failed to start test database: {db_err}"),
    };

    // The database gets dropped outside the runtime, even when the test panics
    TOKIO_RT.block_on(async {
        let pool = db::connect_sqlx(&test_db.url())
            .await
            .expect("Could not connect to the test database");
        db::ensure_schema(&pool)
            .await
            .expect("Could not create the todos table");

        test_fn(pool.clone()).await;
        pool.close().await;
    });
}
