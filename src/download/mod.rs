//! Download module.
//!
//! This module provides:
//! - The transfer engine (single-request and ranged strategies)
//! - Progress and completion hooks
//! - The per-video pipeline with optional captions
//! - Sequential playlist downloading

pub mod engine;
pub mod events;
pub mod playlist;
pub mod video;

pub use engine::{DownloadEngine, DownloadSession};
pub use events::{CompletionEvent, DownloadHooks, MemberPosition, NoopHooks, ProgressEvent};
pub use playlist::{MemberFailure, PlaylistReport};
pub use video::{download_captions, download_resolved, DownloadRequest, VideoDownload};
