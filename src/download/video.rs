//! Per-video pipeline: select a stream, transfer it, write captions.

use std::path::{Path, PathBuf};

use crate::api::client::Transport;
use crate::api::YoutubeApi;
use crate::captions::{convert, fetch_cues, CaptionFormat, DEFAULT_FPS};
use crate::config::Config;
use crate::download::engine::{DownloadEngine, DownloadSession};
use crate::download::events::{CompletionEvent, DownloadHooks, MemberPosition};
use crate::error::{Error, Result};
use crate::fs::{ensure_dir, media_path, sibling_path};
use crate::media::{select_format, StreamKind, VideoMetadata};

/// What to download for each video.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub itag: Option<u32>,
    /// Caption language to write alongside the media. `None` skips captions.
    pub caption_language: Option<String>,
    pub caption_format: CaptionFormat,
    pub caption_fps: u32,
    pub output_dir: PathBuf,
    pub resume: bool,
}

impl Default for DownloadRequest {
    fn default() -> Self {
        Self {
            itag: None,
            caption_language: None,
            caption_format: CaptionFormat::default(),
            caption_fps: DEFAULT_FPS,
            output_dir: PathBuf::from("videos"),
            resume: false,
        }
    }
}

impl DownloadRequest {
    pub fn from_config(config: &Config) -> Self {
        Self {
            itag: config.options.itag,
            caption_language: config
                .captions
                .enabled
                .then(|| config.captions.language.clone()),
            caption_format: config.captions.caption_format(),
            caption_fps: config.captions.fps,
            output_dir: config.options.output_directory.clone(),
            resume: config.options.resume,
        }
    }
}

/// Result of one video's pipeline.
#[derive(Debug, Clone)]
pub struct VideoDownload {
    pub video_id: String,
    pub itag: u32,
    pub kind: StreamKind,
    pub session: DownloadSession,
    pub caption_path: Option<PathBuf>,
}

impl VideoDownload {
    pub fn media_path(&self) -> &Path {
        &self.session.path
    }
}

impl YoutubeApi {
    /// Resolve and download a single video.
    pub async fn download_video(
        &self,
        video_id: &str,
        request: &DownloadRequest,
        hooks: &dyn DownloadHooks,
    ) -> Result<VideoDownload> {
        let meta = self.get_video_info(video_id, true).await?;
        download_resolved(
            self.transport(),
            &meta,
            request,
            hooks,
            &MemberPosition::standalone(video_id),
        )
        .await
    }
}

/// Run the pipeline for already resolved metadata.
pub async fn download_resolved(
    transport: &dyn Transport,
    meta: &VideoMetadata,
    request: &DownloadRequest,
    hooks: &dyn DownloadHooks,
    position: &MemberPosition,
) -> Result<VideoDownload> {
    if meta.is_live {
        return Err(Error::Download(format!(
            "{} is a live stream and cannot be downloaded as a file",
            meta.video_id
        )));
    }

    let (kind, descriptor) = select_format(meta, request.itag)?;
    if descriptor.needs_decryption {
        return Err(Error::Decryption(format!(
            "Stream {} of {} has an undecryptable signature",
            descriptor.itag, meta.video_id
        )));
    }
    tracing::debug!(
        "Selected itag {} ({}, {})",
        descriptor.itag,
        kind,
        descriptor.mime_type
    );

    ensure_dir(&request.output_dir).await?;
    let path = media_path(&request.output_dir, &descriptor.file_name)?;

    let session = DownloadEngine::new(transport, hooks)
        .download(kind, descriptor, &path, request.resume, position)
        .await?;

    let caption_path = match &request.caption_language {
        Some(language) => {
            download_captions(
                transport,
                meta,
                language,
                &request.caption_format,
                request.caption_fps,
                &path,
            )
            .await?
        }
        None => None,
    };

    let file_size = tokio::fs::metadata(&path).await?.len();
    hooks.on_finalized(&CompletionEvent {
        path: &path,
        file_size,
        declared_size: descriptor.content_length.or(session.expected_total),
        position,
    });

    Ok(VideoDownload {
        video_id: meta.video_id.clone(),
        itag: descriptor.itag,
        kind,
        session,
        caption_path,
    })
}

/// Fetch the caption track for `language` (or the first track when that
/// language is missing), convert it and write it next to the media file.
/// Returns `None` when the video has no captions.
pub async fn download_captions(
    transport: &dyn Transport,
    meta: &VideoMetadata,
    language: &str,
    format: &CaptionFormat,
    fps: u32,
    media_path: &Path,
) -> Result<Option<PathBuf>> {
    let Some(track) = meta.caption_track(language) else {
        tracing::warn!("No captions available for {}", meta.video_id);
        return Ok(None);
    };
    if track.key != language {
        tracing::info!(
            "No '{}' captions for {}, using '{}'",
            language,
            meta.video_id,
            track.key
        );
    }

    let cues = fetch_cues(transport, track).await?;
    let converted = convert(&cues, format, fps);
    let path = sibling_path(media_path, converted.extension)?;
    tokio::fs::write(&path, converted.text).await?;
    tracing::debug!("Wrote {} cues to {}", cues.len(), path.display());

    Ok(Some(path))
}
