//! Playlist listing.

use url::Url;

use crate::api::types::{PlaylistInfo, PlaylistMember, PlaylistResponse};
use crate::api::youtube::{endpoints, YoutubeApi};
use crate::error::{Error, Result};

impl YoutubeApi {
    /// Fetch a playlist listing. With `enrich`, every member's full
    /// metadata is resolved too, one member at a time.
    pub async fn get_playlist(&self, playlist_id: &str, enrich: bool) -> Result<PlaylistInfo> {
        let url = playlist_url(playlist_id)?;
        let text = self.transport().get_text(url.as_str()).await?;
        tracing::debug!("Playlist response length: {} bytes", text.len());

        let response: PlaylistResponse = serde_json::from_str(&text).map_err(|e| {
            tracing::debug!(
                "Unparsable playlist listing: {}",
                text.chars().take(200).collect::<String>()
            );
            Error::unavailable(
                format!("Playlist {} listing could not be parsed: {}", playlist_id, e),
                None,
            )
        })?;

        let videos = response
            .video
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::unavailable(format!("Playlist {} not found or empty", playlist_id), None))?;

        let mut members: Vec<PlaylistMember> = videos
            .into_iter()
            .enumerate()
            .map(|(index, video)| PlaylistMember {
                ordinal: index + 1,
                video_id: video.encrypted_id,
                title: video.title,
                duration_seconds: video.length_seconds,
                thumbnail: video.thumbnail,
                metadata: None,
            })
            .collect();

        if enrich {
            for member in &mut members {
                tracing::debug!("Enriching playlist member {}: {}", member.ordinal, member.video_id);
                member.metadata = Some(self.get_video_info(&member.video_id, true).await?);
            }
        }

        Ok(PlaylistInfo {
            playlist_id: playlist_id.to_string(),
            title: response.title.unwrap_or_else(|| playlist_id.to_string()),
            author: response.author,
            members,
        })
    }
}

pub(crate) fn playlist_url(playlist_id: &str) -> Result<Url> {
    Ok(Url::parse_with_params(
        endpoints::PLAYLIST_LISTING,
        &[
            ("style", "json"),
            ("action_get_list", "1"),
            ("list", playlist_id),
        ],
    )?)
}
