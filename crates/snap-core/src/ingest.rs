//! Ingestion router: drag-and-drop, file picker and clipboard paste all
//! end up as a single accepted or rejected image event.

use serde::Serialize;
use tracing::debug;

use crate::error::IngestError;
use crate::preview::{PreviewStore, PreviewUrl};
use crate::reducer::Event;
use crate::state::{ImageId, UploadedImage};
use crate::validate::{validate, UploadPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Drop,
    Picker,
    Paste,
}

/// A file offered by the user, not yet validated.
#[derive(Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub bytes: Vec<u8>,
    pub mime: String,
    /// Declared size in bytes; the policy checks this, not `bytes.len()`.
    pub size: u64,
    pub channel: Channel,
}

impl CandidateFile {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>, channel: Channel) -> Self {
        let size = bytes.len() as u64;
        Self {
            bytes,
            mime: mime.into(),
            size,
            channel,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }
}

impl std::fmt::Debug for CandidateFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateFile")
            .field("mime", &self.mime)
            .field("size", &self.size)
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

/// One entry of a clipboard payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardItem {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ClipboardItem {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime.trim().to_ascii_lowercase().starts_with("image/")
    }
}

/// First clipboard item that claims to be an image, as a candidate file.
pub fn select_pasted_image(items: Vec<ClipboardItem>) -> Option<CandidateFile> {
    items
        .into_iter()
        .find(ClipboardItem::is_image)
        .map(|item| CandidateFile::new(item.bytes, item.mime, Channel::Paste))
}

pub struct IngestionRouter<P> {
    policy: UploadPolicy,
    previews: P,
    next_image: u64,
}

impl<P: PreviewStore> IngestionRouter<P> {
    pub fn new(policy: UploadPolicy, previews: P) -> Self {
        Self {
            policy,
            previews,
            next_image: 0,
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn previews(&self) -> &P {
        &self.previews
    }

    pub fn release_preview(&mut self, url: &PreviewUrl) -> Result<(), crate::PreviewError> {
        self.previews.release(url)
    }

    /// Drag-and-drop and file-picker channel. An empty offer is ignored.
    pub fn offer_files(&mut self, files: Vec<CandidateFile>, channel: Channel) -> Option<Event> {
        match files.len() {
            0 => None,
            1 => {
                let mut files = files;
                let mut file = files.remove(0);
                file.channel = channel;
                Some(self.offer(file))
            }
            count => Some(Event::ImageRejected(
                IngestError::MultipleFiles { count }.to_string(),
            )),
        }
    }

    /// Clipboard channel. A payload without any image produces no event.
    pub fn offer_paste(&mut self, items: Vec<ClipboardItem>) -> Option<Event> {
        let total = items.len();
        match select_pasted_image(items) {
            Some(file) => Some(self.offer(file)),
            None => {
                debug!(items = total, "Paste carried no image, ignoring");
                None
            }
        }
    }

    /// Validate a single file and, on success, acquire its preview reference.
    pub fn offer(&mut self, file: CandidateFile) -> Event {
        if let Err(e) = validate(&file, &self.policy) {
            debug!(channel = ?file.channel, mime = %file.mime, size = file.size, "Rejected upload: {e}");
            return Event::ImageRejected(IngestError::from(e).to_string());
        }

        self.next_image += 1;
        let preview = self.previews.create(&file);
        Event::ImageAccepted(UploadedImage::new(ImageId(self.next_image), file, preview))
    }
}
