use std::{net::SocketAddr, path::PathBuf};

use anyhow::{Context, Result};

pub const DEFAULT_BOOKS_SOURCE: &str =
    "https://raw.githubusercontent.com/zygmuntz/goodbooks-10k/refs/heads/master/samples/books.csv";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub students_csv: PathBuf,
    pub books_source: String,
    pub mongo: MongoConfig,
    pub clickhouse: ClickHouseConfig,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub url: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct ClickHouseConfig {
    pub url: String,
    pub username: String,
    pub password: String,
}

impl AppConfig {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let bind_addr = env_string("CLASSROOM_BIND_ADDR", "127.0.0.1:8000")
            .parse::<SocketAddr>()
            .context("CLASSROOM_BIND_ADDR must be a valid host:port")?;

        let students_csv = PathBuf::from(env_string("CLASSROOM_STUDENTS_CSV", "students.csv"));
        let books_source = env_string("CLASSROOM_BOOKS_SOURCE", DEFAULT_BOOKS_SOURCE);

        let mongo = MongoConfig {
            url: env_string("MONGO_URL", "mongodb://localhost:27017"),
            database: env_string("MONGO_DB", "school"),
        };

        let clickhouse = ClickHouseConfig {
            url: env_string("CLICKHOUSE_URL", "http://localhost:8123"),
            username: env_string("CLICKHOUSE_USER", "default"),
            password: env_string("CLICKHOUSE_PASSWORD", ""),
        };

        Ok(Self {
            bind_addr,
            students_csv,
            books_source,
            mongo,
            clickhouse,
        })
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
