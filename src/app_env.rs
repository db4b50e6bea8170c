/// URL for accessing the PostgreSQL database. When set, it takes precedence over the individual
/// DB_* variables below.
pub const DB_URL: &str = "DATABASE_URL";
/// Hostname of the PostgreSQL server. Defaults to "postgres".
pub const DB_HOST: &str = "DB_HOST";
/// Port of the PostgreSQL server. Defaults to 5432.
pub const DB_PORT: &str = "DB_PORT";
/// User to log into PostgreSQL with. Defaults to "postgres".
pub const DB_USERNAME: &str = "DB_USERNAME";
/// Password for [DB_USERNAME]. Defaults to "postgrespassword".
pub const DB_PASSWORD: &str = "DB_PASSWORD";
/// Name of the database holding the todos table. Defaults to "todo-app".
pub const DB_DATABASE: &str = "DB_DATABASE";
/// Log level configuration for the application. For formatting info, see [tracing_subscriber's documentation](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// OpenTelemetry span export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";

/// Port the REST backend listens on. Defaults to 3001.
pub const SERVER_PORT: &str = "SERVER_PORT";
/// Whether init-db should wipe the todos table and insert sample data. Defaults to true.
pub const SEED_SAMPLE_TODOS: &str = "SEED_SAMPLE_TODOS";

/// Base URL of the GraphQL gateway, without the /v1/... suffix
pub const GATEWAY_ENDPOINT: &str = "GATEWAY_ENDPOINT";
/// Admin secret sent to the gateway's metadata API
pub const GATEWAY_ADMIN_SECRET: &str = "GATEWAY_ADMIN_SECRET";
/// Older name for [GATEWAY_ENDPOINT], read when the new one is unset
pub const LEGACY_GATEWAY_ENDPOINT: &str = "HASURA_ENDPOINT";
/// Older name for [GATEWAY_ADMIN_SECRET], read when the new one is unset
pub const LEGACY_GATEWAY_ADMIN_SECRET: &str = "HASURA_ADMIN_SECRET";
/// Role the gateway assigns to unauthenticated requests
pub const GATEWAY_PUBLIC_ROLE: &str = "GATEWAY_PUBLIC_ROLE";
/// How many times to poll the gateway's health check before giving up
pub const GATEWAY_WAIT_ATTEMPTS: &str = "GATEWAY_WAIT_ATTEMPTS";
/// Delay between gateway health check polls, in milliseconds
pub const GATEWAY_WAIT_DELAY_MS: &str = "GATEWAY_WAIT_DELAY_MS";

/// URL of the REST backend that the frontend proxy forwards to
pub const BACKEND_URL: &str = "BACKEND_URL";
/// Port the frontend proxy listens on. Defaults to 3000.
pub const FRONTEND_PORT: &str = "FRONTEND_PORT";

