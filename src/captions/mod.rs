//! Caption pipeline.
//!
//! Provides:
//! - Caption track index parsing
//! - Timed-text fetch and cue parsing
//! - Conversion to srt, sub and ass

pub mod convert;
pub mod track;

pub use convert::{convert, CaptionFormat, ConvertedCaption, DEFAULT_FPS};
pub use track::{decode_entities, fetch_cues, parse_caption_tracks, parse_timed_text, CaptionCue};
