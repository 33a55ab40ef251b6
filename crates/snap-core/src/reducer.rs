//! Pure state transitions. Side effects are returned as [`Effect`]s for
//! the caller to perform.

use std::time::Duration;

use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::ingest::CandidateFile;
use crate::position::normalize_and_validate;
use crate::preview::PreviewUrl;
use crate::state::{AnalysisResult, AppState, ImageId, RequestId, UploadedImage};

pub const COPY_CONFIRM_WINDOW: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ImageAccepted(UploadedImage),
    ImageRejected(String),
    AnalysisSettled {
        request: RequestId,
        outcome: Result<AnalysisResult, AnalysisError>,
    },
    PreviewRendered(ImageId),
    ToggleOrientation,
    CopyRequested,
    CopyWindowElapsed { token: u64 },
    SessionEnded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartAnalysis {
        request: RequestId,
        file: CandidateFile,
    },
    ReleasePreview(PreviewUrl),
    WriteClipboard(String),
    ScheduleCopyReset {
        token: u64,
        after: Duration,
    },
}

pub fn reduce(state: &mut AppState, event: Event) -> Vec<Effect> {
    match event {
        Event::ImageAccepted(image) => begin_analysis(state, image),
        Event::ImageRejected(reason) => {
            // A rejected offer leaves the current image and results alone.
            if let Some(abandoned) = state.pending_request.take() {
                debug!(request = abandoned.0, "Rejected offer abandons in-flight analysis");
            }
            state.is_analyzing = false;
            state.error_message = reason;
            Vec::new()
        }
        Event::AnalysisSettled { request, outcome } => {
            settle_analysis(state, request, outcome);
            Vec::new()
        }
        Event::PreviewRendered(id) => match state.uploaded_image.as_mut() {
            Some(image) if image.id() == id => {
                image.take_preview().map(Effect::ReleasePreview).into_iter().collect()
            }
            _ => Vec::new(),
        },
        Event::ToggleOrientation => {
            state.orientation = state.orientation.flipped();
            Vec::new()
        }
        Event::CopyRequested => {
            if state.position.is_empty() {
                return Vec::new();
            }
            state.copy_confirmed = true;
            state.copy_token += 1;
            vec![
                Effect::WriteClipboard(state.position.clone()),
                Effect::ScheduleCopyReset {
                    token: state.copy_token,
                    after: COPY_CONFIRM_WINDOW,
                },
            ]
        }
        Event::CopyWindowElapsed { token } => {
            // A newer copy restarted the window.
            if token == state.copy_token {
                state.copy_confirmed = false;
            }
            Vec::new()
        }
        Event::SessionEnded => {
            state.pending_request = None;
            state.is_analyzing = false;
            state
                .uploaded_image
                .as_mut()
                .and_then(UploadedImage::take_preview)
                .map(Effect::ReleasePreview)
                .into_iter()
                .collect()
        }
    }
}

fn begin_analysis(state: &mut AppState, image: UploadedImage) -> Vec<Effect> {
    let mut effects = Vec::new();

    if let Some(previous) = state.uploaded_image.as_mut() {
        if let Some(url) = previous.take_preview() {
            effects.push(Effect::ReleasePreview(url));
        }
    }

    state.next_request += 1;
    let request = RequestId(state.next_request);
    if let Some(superseded) = state.pending_request.replace(request) {
        debug!(superseded = superseded.0, request = request.0, "Superseding in-flight analysis");
    }

    state.is_analyzing = true;
    state.error_message.clear();
    state.cropped_preview_url = None;
    state.position.clear();

    let file = image.file().clone();
    state.uploaded_image = Some(image);

    effects.push(Effect::StartAnalysis { request, file });
    effects
}

fn settle_analysis(
    state: &mut AppState,
    request: RequestId,
    outcome: Result<AnalysisResult, AnalysisError>,
) {
    if state.pending_request != Some(request) {
        debug!(
            request = request.0,
            pending = ?state.pending_request.map(|r| r.0),
            "Discarding stale analysis result"
        );
        return;
    }

    state.pending_request = None;
    state.is_analyzing = false;

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            info!(request = request.0, "Analysis failed: {e:?}");
            state.error_message = e.to_string();
            return;
        }
    };

    match normalize_and_validate(&result.position, state.position_policy) {
        Ok(position) => {
            info!(request = request.0, %position, "Analysis succeeded");
            state.position = position;
            state.cropped_preview_url = Some(result.cropped_preview_url);
            state.error_message.clear();
        }
        Err(e) => {
            info!(request = request.0, raw = %result.position, reason = %e.reason, "Rejected returned position");
            state.error_message = e.to_string();
        }
    }
}
