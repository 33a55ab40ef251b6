//! Core state machine for turning a chessboard photo into a position.
//!
//! Everything here is synchronous: validation, ingestion, position
//! normalization and the view-state reducer. The async shell (HTTP client,
//! timers, clipboard) lives in the `board-snap` crate and drives this one
//! through [`reducer::reduce`].

pub mod error;
pub mod ingest;
pub mod links;
pub mod position;
pub mod preview;
pub mod reducer;
pub mod state;
pub mod validate;

pub use error::{AnalysisError, IngestError, InvalidPosition, PreviewError, ValidationError};
pub use ingest::{CandidateFile, Channel, ClipboardItem, IngestionRouter};
pub use links::OutboundLinks;
pub use position::{normalize, validate_position, PositionPolicy, DEFAULT_STATE_SUFFIX};
pub use preview::{MemoryPreviewStore, PreviewStore, PreviewUrl};
pub use reducer::{reduce, Effect, Event, COPY_CONFIRM_WINDOW};
pub use state::{
    AnalysisResult, AppState, BoardView, ImageId, Orientation, Phase, RequestId, UploadedImage,
    ViewState,
};
pub use validate::{validate, UploadPolicy};
