use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use budgetbook_core::aggregates::AtomicityMode;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub aggregate_mode: AtomicityMode,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("BB_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid BB_LISTEN_ADDR")?;
        let db_path = std::env::var("BB_DB_PATH").unwrap_or_else(|_| "./db/app.db".into());
        let cors_allow = std::env::var("BB_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("BB_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        let aggregate_mode = match std::env::var("BB_AGGREGATE_MODE") {
            Ok(raw) => raw
                .parse::<AtomicityMode>()
                .context("Invalid BB_AGGREGATE_MODE")?,
            Err(_) => AtomicityMode::default(),
        };
        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            aggregate_mode,
        })
    }
}
