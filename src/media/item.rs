//! Resolved video metadata and stream descriptors.

use std::fmt;

/// Which descriptor list a stream came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Audio and video in one stream, fetched with a single request.
    Combined,
    /// Audio or video alone, fetched with ranged requests up to a declared size.
    Split,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Combined => write!(f, "combined"),
            StreamKind::Split => write!(f, "split"),
        }
    }
}

/// One downloadable encoding of a video.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDescriptor {
    pub itag: u32,
    pub mime_type: String,
    /// Playable URL. Never carries the ciphered signature parameter.
    pub url: String,
    /// Target file name: sanitized title plus extension.
    pub file_name: String,
    pub extension: String,
    /// Declared size in bytes. Present for split streams.
    pub content_length: Option<u64>,
    pub quality: Option<String>,
    /// Set when the entry carried a ciphered signature that could not be
    /// decrypted. Such a stream is listed but cannot be downloaded.
    pub needs_decryption: bool,
}

impl StreamDescriptor {
    /// Whether the URL is usable as-is.
    pub fn is_playable(&self) -> bool {
        !self.needs_decryption
    }
}

/// One caption track offered for a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    /// Lookup key: language code, variant tag, or positional index.
    pub key: String,
    pub language_code: Option<String>,
    pub name: String,
    pub url: String,
}

/// Fully resolved metadata for one video.
#[derive(Debug, Clone, Default)]
pub struct VideoMetadata {
    pub video_id: String,
    pub title: String,
    /// Sanitized base name shared by every stream's target file.
    pub file_base_name: String,
    pub author: Option<String>,
    pub duration_seconds: f64,
    pub view_count: u64,
    pub rating: f64,
    pub is_live: bool,
    /// Live playback URL, only set for live videos.
    pub stream_url: Option<String>,
    pub thumbnails: Vec<String>,
    pub formats: Vec<StreamDescriptor>,
    pub adaptive_formats: Vec<StreamDescriptor>,
    /// Caption tracks in service order.
    pub captions: Vec<CaptionTrack>,
}

impl VideoMetadata {
    /// Whether neither descriptor list has any entry.
    pub fn has_no_formats(&self) -> bool {
        self.formats.is_empty() && self.adaptive_formats.is_empty()
    }

    /// Find a caption track by exact key, falling back to the first track.
    pub fn caption_track(&self, language: &str) -> Option<&CaptionTrack> {
        self.captions
            .iter()
            .find(|track| track.key == language)
            .or_else(|| self.captions.first())
    }
}
