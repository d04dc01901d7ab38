use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    /// Shared secret for edit and delete. `None` leaves them open.
    pub admin_token: Option<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/comments.db".to_string())
                .into(),
            admin_token: env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3200".to_string())
                .parse()?,
        })
    }

    /// Configuration for tests and embedding: in-memory defaults, given secret.
    pub fn with_admin_token(admin_token: Option<&str>) -> Self {
        Self {
            database_path: PathBuf::from(":memory:"),
            admin_token: admin_token.map(str::to_string),
            port: 0,
        }
    }
}
