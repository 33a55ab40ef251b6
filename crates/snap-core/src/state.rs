//! Application state and the view derived from it.

use serde::Serialize;

use crate::ingest::CandidateFile;
use crate::links::OutboundLinks;
use crate::position::PositionPolicy;
use crate::preview::PreviewUrl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ImageId(pub u64);

/// Generation number of an analysis request. Only the latest one may
/// commit its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    White,
    Black,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::White => Orientation::Black,
            Orientation::Black => Orientation::White,
        }
    }
}

/// A validated image together with its preview reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    id: ImageId,
    file: CandidateFile,
    preview: PreviewUrl,
    preview_released: bool,
}

impl UploadedImage {
    pub fn new(id: ImageId, file: CandidateFile, preview: PreviewUrl) -> Self {
        Self {
            id,
            file,
            preview,
            preview_released: false,
        }
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn file(&self) -> &CandidateFile {
        &self.file
    }

    pub fn preview(&self) -> &PreviewUrl {
        &self.preview
    }

    pub fn preview_released(&self) -> bool {
        self.preview_released
    }

    /// Marks the preview released and hands back the reference, once.
    pub(crate) fn take_preview(&mut self) -> Option<PreviewUrl> {
        if self.preview_released {
            None
        } else {
            self.preview_released = true;
            Some(self.preview.clone())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub position: String,
    pub cropped_preview_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub uploaded_image: Option<UploadedImage>,
    pub cropped_preview_url: Option<String>,
    pub position: String,
    pub orientation: Orientation,
    pub is_analyzing: bool,
    pub error_message: String,
    pub copy_confirmed: bool,
    pub(crate) next_request: u64,
    pub(crate) pending_request: Option<RequestId>,
    pub(crate) copy_token: u64,
    pub(crate) position_policy: PositionPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Analyzing,
    Success,
    Failed,
}

/// Inputs for the board-rendering collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    pub position: String,
    pub orientation: Orientation,
    pub view_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub phase: Phase,
    pub preview_url: Option<String>,
    pub cropped_preview_url: Option<String>,
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub position: Option<String>,
    pub orientation: Orientation,
    pub copy_confirmed: bool,
    pub board: Option<BoardView>,
    pub links: Option<OutboundLinks>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position_policy(mut self, policy: PositionPolicy) -> Self {
        self.position_policy = policy;
        self
    }

    /// Request whose result the reducer is currently waiting for.
    pub fn pending_request(&self) -> Option<RequestId> {
        self.pending_request
    }

    pub fn phase(&self) -> Phase {
        if self.is_analyzing {
            Phase::Analyzing
        } else if !self.error_message.is_empty() {
            Phase::Failed
        } else if !self.position.is_empty() {
            Phase::Success
        } else {
            Phase::Idle
        }
    }

    pub fn view(&self) -> ViewState {
        let position = (!self.position.is_empty()).then(|| self.position.clone());

        ViewState {
            phase: self.phase(),
            preview_url: self
                .uploaded_image
                .as_ref()
                .map(|image| image.preview().to_string()),
            cropped_preview_url: self.cropped_preview_url.clone(),
            is_loading: self.is_analyzing,
            error_message: (!self.error_message.is_empty()).then(|| self.error_message.clone()),
            orientation: self.orientation,
            copy_confirmed: self.copy_confirmed,
            board: position.as_ref().map(|position| BoardView {
                position: position.clone(),
                orientation: self.orientation,
                view_only: true,
            }),
            links: position.as_deref().map(OutboundLinks::for_position),
            position,
        }
    }
}
