use std::env;
use std::time::Duration;

use anyhow::Context;

const DEFAULT_LOG_FILTER: &str = "loan_eval_client=info,tower_http=debug,axum::rejection=info";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Base URL of the evaluator, without the `/evaluate` path.
    pub evaluator_url: String,
    pub evaluator_timeout_secs: u64,
    /// How long an idle browser session keeps its result display.
    pub session_idle_secs: u64,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: match env::var("PORT") {
                Ok(port) => port.parse().context("PORT must be a valid number")?,
                Err(_) => defaults.port,
            },
            evaluator_url: env::var("EVALUATOR_URL").unwrap_or(defaults.evaluator_url),
            evaluator_timeout_secs: match env::var("EVALUATOR_TIMEOUT_SECS") {
                Ok(secs) => secs
                    .parse()
                    .context("EVALUATOR_TIMEOUT_SECS must be a whole number of seconds")?,
                Err(_) => defaults.evaluator_timeout_secs,
            },
            session_idle_secs: match env::var("SESSION_IDLE_SECS") {
                Ok(secs) => secs
                    .parse()
                    .context("SESSION_IDLE_SECS must be a whole number of seconds")?,
                Err(_) => defaults.session_idle_secs,
            },
            log_level: env::var("RUST_LOG").unwrap_or(defaults.log_level),
        })
    }

    pub fn with_evaluator_url(mut self, url: impl Into<String>) -> Self {
        self.evaluator_url = url.into();
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn evaluate_url(&self) -> String {
        format!("{}/evaluate", self.evaluator_base())
    }

    pub fn schemes_url(&self) -> String {
        format!("{}/schemes", self.evaluator_base())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.evaluator_timeout_secs)
    }

    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    fn evaluator_base(&self) -> &str {
        self.evaluator_url.trim_end_matches('/')
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            evaluator_url: "http://localhost:5000".to_string(),
            evaluator_timeout_secs: 30,
            session_idle_secs: 1800,
            log_level: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
