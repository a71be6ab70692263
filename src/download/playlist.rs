//! Sequential playlist downloading.

use crate::api::{PlaylistInfo, PlaylistMember, YoutubeApi};
use crate::download::events::{DownloadHooks, MemberPosition};
use crate::download::video::{download_resolved, DownloadRequest, VideoDownload};
use crate::error::{Error, Result};

/// The member that stopped a playlist run.
#[derive(Debug)]
pub struct MemberFailure {
    pub position: MemberPosition,
    pub error: Error,
}

/// Outcome of a playlist run.
#[derive(Debug)]
pub struct PlaylistReport {
    pub playlist_id: String,
    pub total: usize,
    pub completed: Vec<VideoDownload>,
    pub failure: Option<MemberFailure>,
}

impl PlaylistReport {
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn failed_count(&self) -> usize {
        usize::from(self.failure.is_some())
    }

    /// Members never attempted because an earlier one failed.
    pub fn skipped_count(&self) -> usize {
        self.total - self.completed_count() - self.failed_count()
    }

    /// Surface the failing member's error, if any.
    pub fn into_result(mut self) -> Result<Self> {
        match self.failure.take() {
            Some(failure) => Err(failure.error),
            None => Ok(self),
        }
    }
}

impl YoutubeApi {
    /// Download every member of a playlist, one after another. The run
    /// stops at the first member that fails.
    pub async fn download_playlist(
        &self,
        playlist: &PlaylistInfo,
        request: &DownloadRequest,
        hooks: &dyn DownloadHooks,
    ) -> PlaylistReport {
        let total = playlist.members.len();
        let mut report = PlaylistReport {
            playlist_id: playlist.playlist_id.clone(),
            total,
            completed: Vec::with_capacity(total),
            failure: None,
        };

        for member in &playlist.members {
            let position = MemberPosition::new(member.ordinal, total, &member.video_id);
            tracing::info!(
                "[{}/{}] {}",
                position.ordinal,
                position.total,
                member.title.as_deref().unwrap_or(&member.video_id)
            );

            let result = self.download_member(member, request, hooks, &position).await;

            match result {
                Ok(download) => report.completed.push(download),
                Err(error) => {
                    tracing::warn!(
                        "Playlist member {} ({}) failed: {}",
                        position.ordinal,
                        position.video_id,
                        error
                    );
                    report.failure = Some(MemberFailure { position, error });
                    break;
                }
            }
        }

        report
    }

    async fn download_member(
        &self,
        member: &PlaylistMember,
        request: &DownloadRequest,
        hooks: &dyn DownloadHooks,
        position: &MemberPosition,
    ) -> Result<VideoDownload> {
        let fetched;
        let meta = match &member.metadata {
            Some(meta) => meta,
            None => {
                fetched = self.get_video_info(&member.video_id, true).await?;
                &fetched
            }
        };

        download_resolved(self.transport(), meta, request, hooks, position).await
    }
}
