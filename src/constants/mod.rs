use std::str::FromStr;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set in .env file or environment variable")]
    Missing(&'static str),
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid { name: &'static str, expected: &'static str, value: String },
}

pub struct Env {
    pub database_url: String,
    pub max_connections: u32,
    pub operation_timeout_ms: u64,
    pub max_retries: u32,
}

impl Env {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let max_connections = parse_or("DB_MAX_CONNECTIONS", 5, "u32 integer")?;
        let operation_timeout_ms = parse_or("STORE_OPERATION_TIMEOUT_MS", 5000, "u64 integer")?;
        let max_retries = parse_or("STORE_MAX_RETRIES", 5, "u32 integer")?;

        Ok(Env { database_url, max_connections, operation_timeout_ms, max_retries })
    }
}

fn parse_or<T: FromStr>(
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value.parse::<T>().map_err(|_| ConfigError::Invalid { name, expected, value }),
        Err(_) => Ok(default),
    }
}
