use std::env;
use std::time::Duration;

use snap_core::{PositionPolicy, UploadPolicy};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/analyze";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
    pub upload_field: String,
    pub max_file_mb: u64,
    pub copy_confirm: Duration,
    pub strict_positions: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(60),
            upload_field: "file".to_string(),
            max_file_mb: 12,
            copy_confirm: snap_core::COPY_CONFIRM_WINDOW,
            strict_positions: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: env::var("SNAP_API_URL").unwrap_or(defaults.api_url),
            timeout: env::var("SNAP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            upload_field: env::var("SNAP_UPLOAD_FIELD").unwrap_or(defaults.upload_field),
            max_file_mb: env::var("SNAP_MAX_FILE_MB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_file_mb),
            copy_confirm: env::var("SNAP_COPY_CONFIRM_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.copy_confirm),
            strict_positions: env::var("SNAP_STRICT_POSITIONS")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.strict_positions),
        }
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::default().with_max_megabytes(self.max_file_mb)
    }

    pub fn position_policy(&self) -> PositionPolicy {
        PositionPolicy {
            require_legal: self.strict_positions,
        }
    }
}
