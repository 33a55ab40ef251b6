//! Client for the remote board-recognition service.

use std::future::Future;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{info, warn};

use snap_core::{AnalysisError, AnalysisResult, CandidateFile};

use crate::config::Config;
use crate::error::AppError;

/// Something that can turn an image into a position. The session only
/// talks to this trait so tests can script timing and outcomes.
pub trait Analyzer: Send + Sync + 'static {
    fn analyze(
        &self,
        file: CandidateFile,
    ) -> impl Future<Output = Result<AnalysisResult, AnalysisError>> + Send;
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    data: Option<EnvelopeData>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeData {
    fen: String,
    cropped_image: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AnalysisClient {
    client: Client,
    endpoint: Url,
    origin: String,
    field: String,
}

impl AnalysisClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let endpoint = Url::parse(&config.api_url)
            .map_err(|e| AppError::Config(format!("invalid analysis URL {}: {e}", config.api_url)))?;

        let client = Client::builder()
            .user_agent("BoardSnap/1.0")
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            origin: endpoint.origin().ascii_serialization(),
            endpoint,
            field: config.upload_field.clone(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Upload one image and return the recognised position.
    pub async fn analyze_file(&self, file: &CandidateFile) -> Result<AnalysisResult, AnalysisError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(upload_file_name(&file.mime))
            .mime_str(&file.mime)
            .map_err(|e| {
                warn!(mime = %file.mime, "Could not build upload part: {e}");
                AnalysisError::Other
            })?;
        let form = Form::new().part(self.field.clone(), part);

        info!(endpoint = %self.endpoint, size = file.size, mime = %file.mime, "Uploading image for analysis");

        let resp = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message);
            warn!(status = status.as_u16(), message = ?message, "Analysis service rejected upload");
            return Err(AnalysisError::from_status(status.as_u16()));
        }

        let envelope: Envelope = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                AnalysisError::Timeout
            } else {
                warn!("Unreadable analysis response: {e}");
                AnalysisError::Other
            }
        })?;

        if envelope.status != "success" {
            return Err(AnalysisError::Application {
                message: envelope.message.filter(|m| !m.trim().is_empty()),
            });
        }

        let data = envelope.data.ok_or_else(|| {
            warn!("Analysis response reported success without data");
            AnalysisError::Other
        })?;

        Ok(AnalysisResult {
            position: data.fen,
            cropped_preview_url: data.cropped_image,
        })
    }

    fn transport_error(&self, e: &reqwest::Error) -> AnalysisError {
        if e.is_timeout() {
            AnalysisError::Timeout
        } else if e.is_connect() || e.is_request() {
            warn!(origin = %self.origin, "No response from analysis service: {e}");
            AnalysisError::Network {
                origin: self.origin.clone(),
            }
        } else {
            warn!("Upload failed: {e}");
            AnalysisError::Other
        }
    }
}

impl Analyzer for AnalysisClient {
    async fn analyze(&self, file: CandidateFile) -> Result<AnalysisResult, AnalysisError> {
        self.analyze_file(&file).await
    }
}

fn upload_file_name(mime: &str) -> &'static str {
    match mime {
        "image/png" => "board.png",
        "image/jpeg" => "board.jpg",
        _ => "board",
    }
}
