use crate::app_env;
use sqlx::postgres::PgConnectOptions;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {var} has an invalid value: {value:?}")]
    InvalidValue { var: &'static str, value: String },
    #[error("the database URL could not be parsed: {0}")]
    InvalidDatabaseUrl(#[source] sqlx::Error),
}

/// Reads a variable from the process environment, treating non-unicode values as unset
pub fn env_lookup(var: &str) -> Option<String> {
    env::var(var).ok()
}

fn string_or(lookup: &impl Fn(&str) -> Option<String>, var: &str, default: &str) -> String {
    lookup(var).unwrap_or_else(|| default.to_owned())
}

/// Like [string_or], but falls back to [legacy_var] before using the default
fn string_or_legacy(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    legacy_var: &str,
    default: &str,
) -> String {
    lookup(var)
        .or_else(|| lookup(legacy_var))
        .unwrap_or_else(|| default.to_owned())
}

fn parsed_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}

/// Connection settings for the PostgreSQL database holding the todos table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(DatabaseConfig {
            url: lookup(app_env::DB_URL),
            host: string_or(&lookup, app_env::DB_HOST, "postgres"),
            port: parsed_or(&lookup, app_env::DB_PORT, 5432)?,
            username: string_or(&lookup, app_env::DB_USERNAME, "postgres"),
            password: string_or(&lookup, app_env::DB_PASSWORD, "postgrespassword"),
            database: string_or(&lookup, app_env::DB_DATABASE, "todo-app"),
        })
    }

    /// Builds sqlx connection options, preferring the full URL when one was configured
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        if let Some(ref url) = self.url {
            return PgConnectOptions::from_str(url).map_err(ConfigError::InvalidDatabaseUrl);
        }

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database))
    }
}

/// Settings for talking to the GraphQL gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub endpoint: String,
    pub admin_secret: String,
    pub public_role: String,
    pub wait_attempts: u32,
    pub wait_delay: Duration,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let endpoint = string_or_legacy(
            &lookup,
            app_env::GATEWAY_ENDPOINT,
            app_env::LEGACY_GATEWAY_ENDPOINT,
            "http://hasura:8080",
        );
        let wait_attempts = parsed_or(&lookup, app_env::GATEWAY_WAIT_ATTEMPTS, 5u32)?;
        if wait_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                var: app_env::GATEWAY_WAIT_ATTEMPTS,
                value: "0".into(),
            });
        }

        Ok(GatewayConfig {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            admin_secret: string_or_legacy(
                &lookup,
                app_env::GATEWAY_ADMIN_SECRET,
                app_env::LEGACY_GATEWAY_ADMIN_SECRET,
                "myadminsecretkey",
            ),
            public_role: string_or(&lookup, app_env::GATEWAY_PUBLIC_ROLE, "public"),
            wait_attempts,
            wait_delay: Duration::from_millis(parsed_or(
                &lookup,
                app_env::GATEWAY_WAIT_DELAY_MS,
                5000u64,
            )?),
        })
    }

    /// URL of the gateway's GraphQL endpoint
    pub fn graphql_url(&self) -> String {
        format!("{}/v1/graphql", self.endpoint)
    }
}

/// Port the backend listens on
pub fn server_port() -> Result<u16, ConfigError> {
    parsed_or(&env_lookup, app_env::SERVER_PORT, 3001)
}

/// Whether init-db should replace the table's contents with sample todos
pub fn seed_sample_todos() -> Result<bool, ConfigError> {
    parsed_or(&env_lookup, app_env::SEED_SAMPLE_TODOS, true)
}

/// Settings for the frontend proxy server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendConfig {
    pub port: u16,
    pub backend_url: String,
}

impl FrontendConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(FrontendConfig {
            port: parsed_or(&lookup, app_env::FRONTEND_PORT, 3000)?,
            backend_url: string_or(&lookup, app_env::BACKEND_URL, "http://localhost:3001")
                .trim_end_matches('/')
                .to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    mod database_config {
        use super::*;

        #[test]
        fn uses_documented_defaults() {
            let config = DatabaseConfig::from_lookup(lookup_from(&[]));
            assert_that!(config).is_ok_containing(DatabaseConfig {
                url: None,
                host: "postgres".into(),
                port: 5432,
                username: "postgres".into(),
                password: "postgrespassword".into(),
                database: "todo-app".into(),
            });
        }

        #[test]
        fn rejects_a_non_numeric_port() {
            let config = DatabaseConfig::from_lookup(lookup_from(&[(app_env::DB_PORT, "abc")]));
            let Err(ConfigError::InvalidValue { var, value }) = config else {
                panic!("Expected an invalid value error, got {config:?}");
            };
            assert_eq!(app_env::DB_PORT, var);
            assert_eq!("abc", value);
        }

        #[test]
        fn rejects_a_malformed_url() {
            let config =
                DatabaseConfig::from_lookup(lookup_from(&[(app_env::DB_URL, "not a url")]))
                    .expect("config should load");
            assert_that!(config.connect_options()).is_err();
        }
    }

    mod gateway_config {
        use super::*;

        #[test]
        fn uses_documented_defaults() {
            let config = GatewayConfig::from_lookup(lookup_from(&[])).expect("config should load");
            assert_eq!("http://hasura:8080", config.endpoint);
            assert_eq!("myadminsecretkey", config.admin_secret);
            assert_eq!("public", config.public_role);
            assert_eq!(5, config.wait_attempts);
            assert_eq!(Duration::from_secs(5), config.wait_delay);
        }

        #[test]
        fn strips_trailing_slash_from_endpoint() {
            let config = GatewayConfig::from_lookup(lookup_from(&[(
                app_env::GATEWAY_ENDPOINT,
                "http://localhost:8080/",
            )]))
            .expect("config should load");
            assert_eq!("http://localhost:8080/v1/graphql", config.graphql_url());
        }

        #[test]
        fn falls_back_to_hasura_variable_names() {
            let config = GatewayConfig::from_lookup(lookup_from(&[
                (app_env::LEGACY_GATEWAY_ENDPOINT, "http://graphql-engine:8080"),
                (app_env::LEGACY_GATEWAY_ADMIN_SECRET, "from-old-env-file"),
            ]))
            .expect("config should load");
            assert_eq!("http://graphql-engine:8080", config.endpoint);
            assert_eq!("from-old-env-file", config.admin_secret);
        }

        #[test]
        fn new_variable_names_win_over_hasura_ones() {
            let config = GatewayConfig::from_lookup(lookup_from(&[
                (app_env::GATEWAY_ENDPOINT, "http://gateway:8080"),
                (app_env::LEGACY_GATEWAY_ENDPOINT, "http://graphql-engine:8080"),
                (app_env::GATEWAY_ADMIN_SECRET, "current"),
                (app_env::LEGACY_GATEWAY_ADMIN_SECRET, "from-old-env-file"),
            ]))
            .expect("config should load");
            assert_eq!("http://gateway:8080", config.endpoint);
            assert_eq!("current", config.admin_secret);
        }

        #[test]
        fn rejects_zero_attempts() {
            let config = GatewayConfig::from_lookup(lookup_from(&[(
                app_env::GATEWAY_WAIT_ATTEMPTS,
                "0",
            )]));
            assert_that!(config).is_err();
        }
    }
}
