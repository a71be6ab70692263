//! Progress and completion events.

use std::path::Path;

/// Where the current video sits in the run. A standalone video is 1 of 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPosition {
    /// 1-based.
    pub ordinal: usize,
    pub total: usize,
    pub video_id: String,
}

impl MemberPosition {
    pub fn new(ordinal: usize, total: usize, video_id: impl Into<String>) -> Self {
        Self {
            ordinal,
            total,
            video_id: video_id.into(),
        }
    }

    /// Position for a download outside any playlist.
    pub fn standalone(video_id: impl Into<String>) -> Self {
        Self::new(1, 1, video_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent<'a> {
    pub transferred: u64,
    pub total: Option<u64>,
    pub position: &'a MemberPosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionEvent<'a> {
    pub path: &'a Path,
    /// Size of the file on disk.
    pub file_size: u64,
    /// Size the server declared for the transfer, if any.
    pub declared_size: Option<u64>,
    pub position: &'a MemberPosition,
}

/// Callbacks invoked on the download control flow. Implementations must
/// return promptly and must not do further network I/O.
pub trait DownloadHooks: Send + Sync {
    fn on_progress(&self, _event: &ProgressEvent<'_>) {}

    fn on_complete(&self, _event: &CompletionEvent<'_>) {}

    /// Called once the media file (and any caption file) is in place.
    fn on_finalized(&self, _event: &CompletionEvent<'_>) {}
}

/// Hooks that ignore every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl DownloadHooks for NoopHooks {}
