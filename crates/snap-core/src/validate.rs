//! Upload policy checks run before anything touches the network.

use crate::error::ValidationError;
use crate::ingest::CandidateFile;

pub const DEFAULT_ALLOWED_TYPES: &[&str] = &["image/jpeg", "image/png"];
pub const DEFAULT_MAX_BYTES: u64 = 12 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub allowed_types: Vec<String>,
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_types: DEFAULT_ALLOWED_TYPES.iter().map(|s| s.to_string()).collect(),
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl UploadPolicy {
    pub fn with_max_megabytes(mut self, megabytes: u64) -> Self {
        self.max_bytes = megabytes * 1024 * 1024;
        self
    }

    pub fn allows(&self, mime: &str) -> bool {
        self.allowed_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime.trim()))
    }
}

/// Check a candidate against the policy. Format is checked before size.
pub fn validate(file: &CandidateFile, policy: &UploadPolicy) -> Result<(), ValidationError> {
    if !policy.allows(&file.mime) {
        return Err(ValidationError::UnsupportedFormat {
            mime: file.mime.clone(),
        });
    }

    if file.size > policy.max_bytes {
        return Err(ValidationError::TooLarge {
            size: file.size,
            max: policy.max_bytes,
        });
    }

    Ok(())
}
