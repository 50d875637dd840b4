use std::path::PathBuf;
use std::time::Duration;

use candor_inference::api::DEFAULT_TIMEOUT;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the database URL and JWT secret have defaults suitable
/// for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT validation configuration.
    pub jwt: JwtConfig,
    /// Full URL of the emotion scorer's predict endpoint.
    pub emotion_api_url: String,
    /// Hard bound on one predict call, in seconds (default: `10`).
    pub emotion_api_timeout_secs: u64,
    /// Durable directory for uploaded interview videos.
    pub media_dir: PathBuf,
    /// Scratch directory for frames staged during scoring.
    pub scratch_dir: PathBuf,
    /// Period of the pending-cascade sweep, in seconds (default: `60`).
    pub cascade_sweep_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                         |
    /// |-------------------------------|---------------------------------|
    /// | `HOST`                        | `0.0.0.0`                       |
    /// | `PORT`                        | `5000`                          |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`         |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                            |
    /// | `EMOTION_API_URL`             | `http://localhost:8000/predict` |
    /// | `EMOTION_API_TIMEOUT_SECS`    | `10`                            |
    /// | `MEDIA_DIR`                   | `storage/videos`                |
    /// | `SCRATCH_DIR`                 | `temp`                          |
    /// | `CASCADE_SWEEP_INTERVAL_SECS` | `60`                            |
    ///
    /// `JWT_SECRET` is read by [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on unparseable numeric values or a missing `JWT_SECRET`.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let emotion_api_url = std::env::var("EMOTION_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000/predict".into());

        let emotion_api_timeout_secs: u64 = std::env::var("EMOTION_API_TIMEOUT_SECS")
            .map(|v| v.parse().expect("EMOTION_API_TIMEOUT_SECS must be a valid u64"))
            .unwrap_or(DEFAULT_TIMEOUT.as_secs());

        let media_dir = std::env::var("MEDIA_DIR")
            .unwrap_or_else(|_| "storage/videos".into())
            .into();

        let scratch_dir = std::env::var("SCRATCH_DIR")
            .unwrap_or_else(|_| "temp".into())
            .into();

        let cascade_sweep_interval_secs: u64 = std::env::var("CASCADE_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("CASCADE_SWEEP_INTERVAL_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            emotion_api_url,
            emotion_api_timeout_secs,
            media_dir,
            scratch_dir,
            cascade_sweep_interval_secs,
        }
    }

    pub fn emotion_api_timeout(&self) -> Duration {
        Duration::from_secs(self.emotion_api_timeout_secs)
    }

    pub fn cascade_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cascade_sweep_interval_secs.max(1))
    }
}
