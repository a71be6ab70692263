//! Media module: identifiers, metadata and the format catalog.

pub mod formats;
pub mod identifier;
pub mod item;

pub use formats::{build_catalog, extension_for_mime, select_format};
pub use identifier::{resolve_playlist_id, resolve_video_id, Identifier};
pub use item::{CaptionTrack, StreamDescriptor, StreamKind, VideoMetadata};
