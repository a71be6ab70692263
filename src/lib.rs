//! YouTube Downloader - resolve and download YouTube videos and playlists.
//!
//! This library provides functionality for downloading videos, playlists and
//! captions from YouTube.
//!
//! # Features
//!
//! - Video and playlist id extraction from every common URL shape
//! - Video info with a watch-page fallback for ciphered signatures
//! - Signature decryption from the player script, cached per player version
//! - Combined and adaptive (split) stream downloads with resume support
//! - Captions converted to SRT, SUB or ASS
//! - Sequential playlist downloads
//!
//! # Example
//!
//! ```no_run
//! use youtube_downloader::{Config, DownloadRequest, NoopHooks, YoutubeApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let api = YoutubeApi::from_config(&config)?;
//!
//!     let meta = api.get_video_info("dQw4w9WgXcQ", false).await?;
//!     println!("{} ({} formats)", meta.title, meta.formats.len());
//!
//!     let request = DownloadRequest::from_config(&config);
//!     api.download_video(&meta.video_id, &request, &NoopHooks).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod captions;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod media;
pub mod output;
pub mod signature;

// Re-exports for convenience
pub use api::{PlaylistInfo, YoutubeApi};
pub use config::Config;
pub use download::{DownloadHooks, DownloadRequest, NoopHooks, PlaylistReport};
pub use error::{Error, Result};
pub use media::{Identifier, StreamDescriptor, StreamKind, VideoMetadata};
