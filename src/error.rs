//! Error types for the youtube-downloader application.

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // Input errors
    #[error("Invalid video or playlist identifier: {0}")]
    InvalidIdentifier(String),

    // Service errors
    #[error("Network error: {0}")]
    Network(String),

    #[error("Video info unavailable: {reason}{}", format_code(.code))]
    InfoUnavailable { reason: String, code: Option<i64> },

    #[error("Live stream has ended and no playback URL is available")]
    LiveStreamEnded,

    #[error("No downloadable format found")]
    NoDownloadableFormat,

    #[error("Signature decryption failed: {0}")]
    Decryption(String),

    // Download errors
    #[error("Download failed: {0}")]
    Download(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

fn format_code(code: &Option<i64>) -> String {
    code.map(|c| format!(" (code {})", c)).unwrap_or_default()
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build an `InfoUnavailable` error from a service reason and optional code.
    pub fn unavailable(reason: impl Into<String>, code: Option<i64>) -> Self {
        Error::InfoUnavailable {
            reason: reason.into(),
            code,
        }
    }
}

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const INPUT_ERROR: i32 = 1;
    pub const NETWORK_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const DOWNLOAD_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
    pub const UNAVAILABLE: i32 = 6;
}
