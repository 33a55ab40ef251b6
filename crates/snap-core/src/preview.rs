//! Locally generated preview references for uploaded images.
//!
//! A reference is acquired when an image is accepted and must be released
//! exactly once: after the preview first renders, when a newer upload
//! supersedes it, or when the session ends.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::PreviewError;
use crate::ingest::CandidateFile;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PreviewUrl(String);

impl PreviewUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait PreviewStore {
    fn create(&mut self, file: &CandidateFile) -> PreviewUrl;
    fn release(&mut self, url: &PreviewUrl) -> Result<(), PreviewError>;
}

/// In-process store. Keeps released references around so a second release
/// is reported instead of silently ignored.
#[derive(Debug, Default)]
pub struct MemoryPreviewStore {
    next_id: u64,
    handles: HashMap<PreviewUrl, Handle>,
}

#[derive(Debug)]
enum Handle {
    Live { bytes: usize },
    Released,
}

impl MemoryPreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.handles
            .values()
            .filter(|h| matches!(h, Handle::Live { .. }))
            .count()
    }

    pub fn is_live(&self, url: &PreviewUrl) -> bool {
        matches!(self.handles.get(url), Some(Handle::Live { .. }))
    }

    /// Bytes held by references that have not been released yet.
    pub fn live_bytes(&self) -> usize {
        self.handles
            .values()
            .map(|h| match h {
                Handle::Live { bytes } => *bytes,
                Handle::Released => 0,
            })
            .sum()
    }
}

impl PreviewStore for MemoryPreviewStore {
    fn create(&mut self, file: &CandidateFile) -> PreviewUrl {
        self.next_id += 1;
        let url = PreviewUrl(format!("blob:board-snap/{}", self.next_id));
        self.handles.insert(
            url.clone(),
            Handle::Live {
                bytes: file.bytes.len(),
            },
        );
        url
    }

    fn release(&mut self, url: &PreviewUrl) -> Result<(), PreviewError> {
        match self.handles.get_mut(url) {
            None => Err(PreviewError::UnknownHandle(url.to_string())),
            Some(Handle::Released) => Err(PreviewError::AlreadyReleased(url.to_string())),
            Some(handle) => {
                *handle = Handle::Released;
                Ok(())
            }
        }
    }
}
