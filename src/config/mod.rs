use std::env;
use std::path::PathBuf;

use crate::error::AppError;

/// Smallest accepted polling interval.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Console configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub state: StateConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
    pub polling: PollingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

/// Persisted client state configuration
#[derive(Debug, Clone)]
pub struct StateConfig {
    pub path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
}

/// Task list polling configuration
#[derive(Debug, Clone)]
pub struct PollingConfig {
    pub interval_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = env::var("CONSOLE_API_BASE_URL")
            .unwrap_or_else(|_| ApiConfig::default().base_url);
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AppError::Config {
                message: format!("CONSOLE_API_BASE_URL must be an http(s) URL, got {}", base_url),
            });
        }
        let api = ApiConfig { base_url };

        let state = StateConfig {
            path: env::var("CONSOLE_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| StateConfig::default().path),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(RequestConfig::default().timeout_ms),
        };

        let polling = PollingConfig {
            interval_ms: env::var("POLL_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(PollingConfig::default().interval_ms)
                .max(MIN_POLL_INTERVAL_MS),
        };

        Ok(Config {
            api,
            state,
            logging,
            request,
            polling,
        })
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/console-state.db"),
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        // Long-running task endpoints share this client.
        Self { timeout_ms: 300_000 }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_ms: 3000 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(ApiConfig::default().base_url, "http://localhost:8000/api");
        assert_eq!(RequestConfig::default().timeout_ms, 300_000);
        assert_eq!(PollingConfig::default().interval_ms, 3000);
        assert_eq!(
            StateConfig::default().path,
            PathBuf::from("./data/console-state.db")
        );
    }
}
