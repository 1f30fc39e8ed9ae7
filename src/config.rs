use std::env;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub bind_addr: String,
    pub template_dir: String,
    pub static_dir: String,
    pub session_secure: bool,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.into())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // A missing .env file is fine; real environment variables still apply.
        dotenvy::dotenv().ok();

        let session_secure = var_or("SESSION_SECURE", "false")
            .parse()
            .context("SESSION_SECURE must be true or false")?;

        Ok(Self {
            database_url: var_or("DATABASE_URL", "sqlite://volunteer_hub.db?mode=rwc"),
            rust_log: var_or("RUST_LOG", "info"),
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000"),
            template_dir: var_or("TEMPLATE_DIR", "templates"),
            static_dir: var_or("STATIC_DIR", "static"),
            session_secure,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            rust_log: "info".into(),
            bind_addr: "127.0.0.1:3000".into(),
            template_dir: "templates".into(),
            static_dir: "static".into(),
            session_secure: false,
        }
    }
}
