//! YouTube API module.
//!
//! This module provides:
//! - Transport seam over HTTP (and an in-memory one for tests)
//! - Video info fetching with the watch-page fallback
//! - Player config extraction from watch pages
//! - Playlist listing

pub mod client;
pub mod info;
pub mod playlist;
pub mod types;
pub mod watch_page;
pub mod youtube;

pub use client::{ByteRange, ByteStream, HttpTransport, StreamResponse, Transport};
pub use types::*;
pub use watch_page::{scan_watch_page, PlayerConfig, WatchPage};
pub use youtube::YoutubeApi;
