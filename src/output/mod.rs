//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output
//! - Progress bars driven by download hooks
//! - Metadata and playlist summaries

pub mod console;
pub mod progress;
pub mod stats;

pub use console::{
    print_banner, print_config_summary, print_error, print_info, print_success,
    print_warning,
};
pub use progress::{create_byte_counter, create_download_bar, create_spinner, ProgressHooks};
pub use stats::{format_duration, print_playlist_info, print_playlist_report, print_video_info};
