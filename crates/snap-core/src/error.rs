//! Error types shown to the user.
//!
//! Three origins stay separate: local rejection ([`ValidationError`],
//! [`IngestError`]), the analysis round-trip ([`AnalysisError`]) and a
//! position the server got wrong ([`InvalidPosition`]). `Display` is the
//! user-facing text for all of them.

use thiserror::Error;

pub const UNSUPPORTED_FORMAT: &str = "Unsupported file type. Please upload a JPEG or PNG image.";
pub const ANALYSIS_FAILED: &str = "Analysis failed. Please try again.";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

fn megabytes(bytes: &u64) -> f64 {
    *bytes as f64 / BYTES_PER_MB
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{}", UNSUPPORTED_FORMAT)]
    UnsupportedFormat { mime: String },

    #[error(
        "File is too large ({:.1} MB). Maximum size is {:.1} MB.",
        megabytes(.size),
        megabytes(.max)
    )]
    TooLarge { size: u64, max: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("Could not accept multiple files. Please provide a single image.")]
    MultipleFiles { count: usize },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Failures of a single analysis request, in the order they are checked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("The image could not be processed. Try a photo with the full board visible.")]
    Unprocessable,

    #[error("The image is larger than the analysis service accepts. Please upload a smaller image.")]
    PayloadTooLarge,

    #[error("{}", UNSUPPORTED_FORMAT)]
    UnsupportedMediaType,

    #[error("Too many requests. Please wait a moment and try again.")]
    RateLimited,

    #[error("The analysis service is having trouble. Please try again later.")]
    Server { status: u16 },

    #[error("The analysis timed out. Please try again.")]
    Timeout,

    #[error("Could not reach the analysis service from {origin}. Check your connection and the service's CORS settings.")]
    Network { origin: String },

    #[error("{}", .message.as_deref().unwrap_or(ANALYSIS_FAILED))]
    Application { message: Option<String> },

    #[error("Upload failed. Please try again.")]
    Other,
}

impl AnalysisError {
    /// Map a non-2xx HTTP status onto the taxonomy.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => AnalysisError::Unprocessable,
            413 => AnalysisError::PayloadTooLarge,
            415 => AnalysisError::UnsupportedMediaType,
            429 => AnalysisError::RateLimited,
            500..=599 => AnalysisError::Server { status },
            _ => AnalysisError::Other,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("The server returned an invalid position.")]
pub struct InvalidPosition {
    pub position: String,
    pub reason: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreviewError {
    #[error("Unknown preview reference: {0}")]
    UnknownHandle(String),

    #[error("Preview reference already released: {0}")]
    AlreadyReleased(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversize_message_formats_megabytes() {
        let err = ValidationError::TooLarge {
            size: 15 * 1024 * 1024,
            max: 12 * 1024 * 1024,
        };
        assert_eq!(
            err.to_string(),
            "File is too large (15.0 MB). Maximum size is 12.0 MB."
        );
    }

    #[test]
    fn test_server_unsupported_matches_local_message() {
        let local = ValidationError::UnsupportedFormat {
            mime: "image/gif".into(),
        };
        assert_eq!(
            AnalysisError::UnsupportedMediaType.to_string(),
            local.to_string()
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AnalysisError::from_status(400), AnalysisError::Unprocessable);
        assert_eq!(AnalysisError::from_status(422), AnalysisError::Unprocessable);
        assert_eq!(AnalysisError::from_status(413), AnalysisError::PayloadTooLarge);
        assert_eq!(
            AnalysisError::from_status(415),
            AnalysisError::UnsupportedMediaType
        );
        assert_eq!(AnalysisError::from_status(429), AnalysisError::RateLimited);
        assert_eq!(
            AnalysisError::from_status(503),
            AnalysisError::Server { status: 503 }
        );
        assert_eq!(AnalysisError::from_status(404), AnalysisError::Other);
    }

    #[test]
    fn test_application_message_fallback() {
        let with = AnalysisError::Application {
            message: Some("No board found".into()),
        };
        let without = AnalysisError::Application { message: None };
        assert_eq!(with.to_string(), "No board found");
        assert_eq!(without.to_string(), ANALYSIS_FAILED);
    }

    #[test]
    fn test_network_message_names_origin() {
        let err = AnalysisError::Network {
            origin: "http://localhost:8000".into(),
        };
        assert!(err.to_string().contains("http://localhost:8000"));
    }
}
