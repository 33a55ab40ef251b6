//! Loading image files from disk as upload candidates.

use std::path::Path;

use snap_core::{CandidateFile, Channel};

use crate::error::AppError;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SIGNATURE: &[u8] = b"\xff\xd8\xff";

/// Content type from magic bytes, falling back to the file extension.
pub fn sniff_mime(path: &Path, bytes: &[u8]) -> String {
    if bytes.starts_with(PNG_SIGNATURE) {
        return "image/png".to_string();
    }
    if bytes.starts_with(JPEG_SIGNATURE) {
        return "image/jpeg".to_string();
    }
    if bytes.starts_with(b"GIF8") {
        return "image/gif".to_string();
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return "image/webp".to_string();
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
    .to_string()
}

pub async fn load_candidate(path: &Path, channel: Channel) -> Result<CandidateFile, AppError> {
    let bytes = tokio::fs::read(path).await?;
    let mime = sniff_mime(path, &bytes);
    Ok(CandidateFile::new(bytes, mime, channel))
}
