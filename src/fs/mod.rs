//! Filesystem module.
//!
//! Provides:
//! - Filename sanitizing and transliteration
//! - Output path and directory management

pub mod naming;
pub mod paths;

pub use naming::{validate_file_name, with_extension, FileNameSanitizer, Transliterator};
pub use paths::{ensure_dir, media_path, sibling_path};
