use crate::error::{Error, Result};
use std::str::FromStr;
use std::{net::SocketAddr, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("text") {
            Ok(LogFormat::Text)
        } else if s.eq_ignore_ascii_case("json") {
            Ok(LogFormat::Json)
        } else {
            Err(Error::Config(format!("unknown log format '{}'", s)))
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub request_timeout: Duration,
    pub log_format: LogFormat,
}

impl Config {
    /// Reads `BUDGET_*` variables, loading `.env` first if present
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let listen_addr = lookup("BUDGET_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .map_err(|e| Error::Config(format!("BUDGET_LISTEN_ADDR: {}", e)))?;
        let db_path = lookup("BUDGET_DB_PATH").unwrap_or_else(|| "./budget.db".into());
        let timeout_ms: u64 = lookup("BUDGET_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| "30000".into())
            .parse()
            .map_err(|e| Error::Config(format!("BUDGET_REQUEST_TIMEOUT_MS: {}", e)))?;
        let log_format = lookup("BUDGET_LOG_FORMAT")
            .unwrap_or_else(|| "text".into())
            .parse()?;

        Ok(Self {
            listen_addr,
            db_path,
            request_timeout: Duration::from_millis(timeout_ms),
            log_format,
        })
    }
}
