//! Resumable transfer of one stream to disk.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::api::client::{ByteRange, ByteStream, Transport};
use crate::download::events::{CompletionEvent, DownloadHooks, MemberPosition, ProgressEvent};
use crate::error::{Error, Result};
use crate::media::{StreamDescriptor, StreamKind};

/// State of one descriptor's transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSession {
    pub path: PathBuf,
    /// Bytes already on disk when the session started.
    pub resume_offset: u64,
    /// Declared total size. Unknown for combined streams.
    pub expected_total: Option<u64>,
    /// Bytes received during this session.
    pub transferred: u64,
}

impl DownloadSession {
    /// Bytes on disk so far.
    pub fn position(&self) -> u64 {
        self.resume_offset + self.transferred
    }
}

/// Transfers streams with the strategy matching their descriptor list.
pub struct DownloadEngine<'a> {
    transport: &'a dyn Transport,
    hooks: &'a dyn DownloadHooks,
}

impl<'a> DownloadEngine<'a> {
    pub fn new(transport: &'a dyn Transport, hooks: &'a dyn DownloadHooks) -> Self {
        Self { transport, hooks }
    }

    /// Download `descriptor` to `path`. With `resume`, bytes already in the
    /// file are kept and only the remainder is requested.
    pub async fn download(
        &self,
        kind: StreamKind,
        descriptor: &StreamDescriptor,
        path: &Path,
        resume: bool,
        position: &MemberPosition,
    ) -> Result<DownloadSession> {
        tracing::info!(
            "Downloading itag {} ({}) to {}",
            descriptor.itag,
            kind,
            path.display()
        );

        match kind {
            StreamKind::Combined => {
                self.download_combined(&descriptor.url, path, resume, position)
                    .await
            }
            StreamKind::Split => {
                let total = descriptor.content_length.ok_or_else(|| {
                    Error::Download(format!(
                        "Stream {} has no declared size",
                        descriptor.itag
                    ))
                })?;
                self.download_split(&descriptor.url, total, path, resume, position)
                    .await
            }
        }
    }

    /// One streaming GET, open-ended from the resume offset.
    pub async fn download_combined(
        &self,
        url: &str,
        path: &Path,
        resume: bool,
        position: &MemberPosition,
    ) -> Result<DownloadSession> {
        let offset = prepare_target(path, resume).await?;
        let range = (offset > 0).then(|| ByteRange::from(offset));
        if offset > 0 {
            tracing::debug!("Resuming {} from byte {}", path.display(), offset);
        }

        let response = self.transport.get_stream(url, range).await?;
        let declared = response.content_length;
        let mut session = DownloadSession {
            path: path.to_path_buf(),
            resume_offset: offset,
            expected_total: None,
            transferred: 0,
        };

        let mut file = open_append(path).await?;
        let total = declared.map(|remaining| offset + remaining);
        self.pump(&mut file, response.body, &mut session, None, total, position)
            .await?;
        file.flush().await?;

        let file_size = tokio::fs::metadata(path).await?.len();
        self.hooks.on_complete(&CompletionEvent {
            path,
            file_size,
            declared_size: declared,
            position,
        });

        Ok(session)
    }

    /// Ranged GETs from the current offset until `total` bytes are on disk.
    pub async fn download_split(
        &self,
        url: &str,
        total: u64,
        path: &Path,
        resume: bool,
        position: &MemberPosition,
    ) -> Result<DownloadSession> {
        let offset = prepare_target(path, resume).await?;
        let mut session = DownloadSession {
            path: path.to_path_buf(),
            resume_offset: offset,
            expected_total: Some(total),
            transferred: 0,
        };

        let mut file = open_append(path).await?;
        while session.position() < total {
            let range = ByteRange::until(session.position(), total);
            tracing::debug!("Requesting {} of {}", range.header_value(), total);

            let response = self.transport.get_stream(url, Some(range)).await?;
            let received = self
                .pump(
                    &mut file,
                    response.body,
                    &mut session,
                    Some(total),
                    Some(total),
                    position,
                )
                .await?;

            if received == 0 {
                return Err(Error::Download(format!(
                    "Empty response for {} of {}",
                    range.header_value(),
                    url
                )));
            }
        }
        file.flush().await?;

        let file_size = tokio::fs::metadata(path).await?.len();
        tracing::debug!("Split download finished at {} bytes", file_size);
        self.hooks.on_complete(&CompletionEvent {
            path,
            file_size,
            declared_size: Some(total),
            position,
        });

        Ok(session)
    }

    /// Copy one response body into the file. Bytes past `limit` are
    /// dropped. Returns the number of bytes written.
    async fn pump(
        &self,
        file: &mut File,
        mut body: ByteStream,
        session: &mut DownloadSession,
        limit: Option<u64>,
        total: Option<u64>,
        position: &MemberPosition,
    ) -> Result<u64> {
        let mut written = 0u64;
        let mut last_reported = None;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            let take = match limit {
                Some(limit) => (chunk.len() as u64).min(limit.saturating_sub(session.position())),
                None => chunk.len() as u64,
            };

            if take > 0 {
                file.write_all(&chunk[..take as usize]).await?;
                session.transferred += take;
                written += take;
            }

            let transferred = session.position();
            if last_reported != Some(transferred) {
                last_reported = Some(transferred);
                self.hooks.on_progress(&ProgressEvent {
                    transferred,
                    total,
                    position,
                });
            }

            if limit.is_some_and(|limit| session.position() >= limit) {
                break;
            }
        }

        Ok(written)
    }
}

/// Resolve the starting offset: the on-disk size when resuming, otherwise
/// zero after removing any existing file.
async fn prepare_target(path: &Path, resume: bool) -> Result<u64> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if resume => Ok(meta.len()),
        Ok(_) => {
            tokio::fs::remove_file(path).await?;
            Ok(0)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e.into()),
    }
}

async fn open_append(path: &Path) -> Result<File> {
    Ok(OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::api::client::testing::MockTransport;
    use crate::download::events::testing::{Recorded, RecordingHooks};

    const URL: &str = "https://media.example/videoplayback?id=1";

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn transport(len: usize) -> MockTransport {
        MockTransport::new().with_blob(URL, payload(len))
    }

    #[tokio::test]
    async fn test_combined_fresh_download() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip.mp4");
        let mut transport = transport(10);
        transport.piece_size = 4;
        let hooks = RecordingHooks::default();
        let engine = DownloadEngine::new(&transport, &hooks);

        let session = engine
            .download_combined(URL, &path, false, &MemberPosition::standalone("abc"))
            .await
            .unwrap();

        assert_eq!(session.transferred, 10);
        assert_eq!(std::fs::read(&path).unwrap(), payload(10));
        assert_eq!(transport.ranges(), vec![None]);
        assert_eq!(hooks.progress(), vec![4, 8, 10]);
        assert_eq!(
            hooks.completions(),
            vec![Recorded::Complete {
                path: path.clone(),
                file_size: 10,
                declared_size: Some(10),
                ordinal: 1,
                count: 1,
            }]
        );
    }

    #[tokio::test]
    async fn test_combined_without_resume_replaces_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"stale bytes from before").unwrap();
        let transport = transport(8);
        let hooks = RecordingHooks::default();

        DownloadEngine::new(&transport, &hooks)
            .download_combined(URL, &path, false, &MemberPosition::standalone("abc"))
            .await
            .unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), payload(8));
    }

    #[tokio::test]
    async fn test_combined_resume_requests_only_the_rest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, &payload(10)[..4]).unwrap();
        let transport = transport(10);
        let hooks = RecordingHooks::default();

        let session = DownloadEngine::new(&transport, &hooks)
            .download_combined(URL, &path, true, &MemberPosition::standalone("abc"))
            .await
            .unwrap();

        assert_eq!(session.resume_offset, 4);
        assert_eq!(session.transferred, 6);
        assert_eq!(transport.ranges(), vec![Some(ByteRange::from(4))]);
        assert_eq!(std::fs::read(&path).unwrap(), payload(10));
    }

    #[tokio::test]
    async fn test_split_loops_until_total() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audio.webm");
        let mut transport = transport(10);
        transport.max_chunk = 4;
        let hooks = RecordingHooks::default();

        let session = DownloadEngine::new(&transport, &hooks)
            .download_split(URL, 10, &path, false, &MemberPosition::new(2, 5, "abc"))
            .await
            .unwrap();

        assert_eq!(session.position(), 10);
        assert_eq!(
            transport.ranges(),
            vec![
                Some(ByteRange::until(0, 10)),
                Some(ByteRange::until(4, 10)),
                Some(ByteRange::until(8, 10)),
            ]
        );
        assert_eq!(hooks.progress(), vec![4, 8, 10]);
        assert_eq!(
            hooks.completions(),
            vec![Recorded::Complete {
                path: path.clone(),
                file_size: 10,
                declared_size: Some(10),
                ordinal: 2,
                count: 5,
            }]
        );
        assert_eq!(std::fs::read(&path).unwrap(), payload(10));
    }

    #[tokio::test]
    async fn test_split_resume_never_requests_existing_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audio.webm");
        std::fs::write(&path, &payload(12)[..7]).unwrap();
        let mut transport = transport(12);
        transport.max_chunk = 3;
        let hooks = RecordingHooks::default();

        DownloadEngine::new(&transport, &hooks)
            .download_split(URL, 12, &path, true, &MemberPosition::standalone("abc"))
            .await
            .unwrap();

        let ranges = transport.ranges();
        assert_eq!(ranges.len(), 2);
        assert!(ranges.iter().flatten().all(|r| r.start >= 7));
        assert_eq!(std::fs::read(&path).unwrap(), payload(12));
    }

    #[tokio::test]
    async fn test_split_already_complete_makes_no_request() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audio.webm");
        std::fs::write(&path, payload(6)).unwrap();
        let transport = transport(6);
        let hooks = RecordingHooks::default();

        let session = DownloadEngine::new(&transport, &hooks)
            .download_split(URL, 6, &path, true, &MemberPosition::standalone("abc"))
            .await
            .unwrap();

        assert_eq!(session.transferred, 0);
        assert!(transport.ranges().is_empty());
        assert_eq!(hooks.completions().len(), 1);
    }

    #[tokio::test]
    async fn test_split_empty_response_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audio.webm");
        let transport = transport(5);
        let hooks = RecordingHooks::default();

        let result = DownloadEngine::new(&transport, &hooks)
            .download_split(URL, 9, &path, false, &MemberPosition::standalone("abc"))
            .await;

        assert!(matches!(result, Err(Error::Download(_))));
        assert_eq!(transport.ranges().len(), 2);
        assert!(hooks.completions().is_empty());
    }

    #[tokio::test]
    async fn test_split_drops_bytes_past_total() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audio.webm");
        // The server ignores Range and sends 12 bytes for a 10 byte stream.
        let transport =
            MockTransport::new().with_scripted(URL, vec![payload(6), Vec::new(), payload(6)]);
        let hooks = RecordingHooks::default();

        let session = DownloadEngine::new(&transport, &hooks)
            .download_split(URL, 10, &path, false, &MemberPosition::standalone("abc"))
            .await
            .unwrap();

        assert_eq!(session.position(), 10);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 10);
        assert_eq!(transport.ranges(), vec![Some(ByteRange::until(0, 10))]);
        assert_eq!(hooks.progress(), vec![6, 10]);
        assert_eq!(hooks.completions().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_chunk_reports_no_progress() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip.mp4");
        let transport = MockTransport::new().with_scripted(
            URL,
            vec![payload(4), Vec::new(), Vec::new(), payload(4)],
        );
        let hooks = RecordingHooks::default();

        let session = DownloadEngine::new(&transport, &hooks)
            .download_combined(URL, &path, false, &MemberPosition::standalone("abc"))
            .await
            .unwrap();

        assert_eq!(session.transferred, 8);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 8);
        assert_eq!(hooks.progress(), vec![4, 8]);
    }

    #[tokio::test]
    async fn test_split_without_declared_size_is_rejected() {
        let dir = TempDir::new().unwrap();
        let transport = transport(5);
        let hooks = RecordingHooks::default();
        let descriptor = StreamDescriptor {
            itag: 140,
            mime_type: "audio/mp4".into(),
            url: URL.into(),
            file_name: "a.mp4".into(),
            extension: "mp4".into(),
            content_length: None,
            quality: None,
            needs_decryption: false,
        };

        let result = DownloadEngine::new(&transport, &hooks)
            .download(
                StreamKind::Split,
                &descriptor,
                &dir.path().join("a.mp4"),
                false,
                &MemberPosition::standalone("abc"),
            )
            .await;

        assert!(matches!(result, Err(Error::Download(_))));
        assert!(transport.ranges().is_empty());
    }
}
