use std::time::Duration;

use sketchmap_core::error::CoreError;

/// Addresses of the external task runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Base URL where work is submitted.
    pub broker_url: String,
    /// Base URL where job state and results are read.
    pub result_backend_url: String,
    /// Per-call HTTP timeout towards the runtime.
    pub timeout: Duration,
}

impl RuntimeConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                  |
    /// |------------------------|--------------------------|
    /// | `BROKER_URL`           | `http://localhost:5555`  |
    /// | `RESULT_BACKEND_URL`   | value of `BROKER_URL`    |
    /// | `RUNTIME_TIMEOUT_SECS` | `10`                     |
    pub fn from_env() -> Result<Self, CoreError> {
        let broker_url = std::env::var("BROKER_URL")
            .unwrap_or_else(|_| "http://localhost:5555".into());

        let result_backend_url =
            std::env::var("RESULT_BACKEND_URL").unwrap_or_else(|_| broker_url.clone());

        let timeout_secs: u64 = std::env::var("RUNTIME_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .map_err(|_| CoreError::Internal("RUNTIME_TIMEOUT_SECS must be a valid u64".into()))?;

        Ok(Self {
            broker_url: trim_base(broker_url),
            result_backend_url: trim_base(result_backend_url),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
