//! API response type definitions.

use serde::Deserialize;

use crate::media::VideoMetadata;

/// Playlist listing response.
#[derive(Debug, Deserialize)]
pub struct PlaylistResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub video: Option<Vec<PlaylistVideo>>,
}

/// One entry of a playlist listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistVideo {
    pub encrypted_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub length_seconds: Option<f64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

/// A resolved playlist.
#[derive(Debug, Clone, Default)]
pub struct PlaylistInfo {
    pub playlist_id: String,
    pub title: String,
    pub author: Option<String>,
    pub members: Vec<PlaylistMember>,
}

impl PlaylistInfo {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// One playlist member, positioned by its 1-based ordinal.
#[derive(Debug, Clone)]
pub struct PlaylistMember {
    pub ordinal: usize,
    pub video_id: String,
    pub title: Option<String>,
    pub duration_seconds: Option<f64>,
    pub thumbnail: Option<String>,
    /// Full metadata, present when the listing was enriched.
    pub metadata: Option<VideoMetadata>,
}
