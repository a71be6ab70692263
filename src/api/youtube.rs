//! YouTube API handle shared by metadata, playlist and download operations.

use std::sync::Arc;
use std::time::Duration;

use crate::api::client::{HttpTransport, Transport};
use crate::config::Config;
use crate::error::Result;
use crate::fs::{FileNameSanitizer, Transliterator};
use crate::signature::SignatureResolver;

/// Service endpoints.
pub mod endpoints {
    pub const VIDEO_INFO: &str = "https://www.youtube.com/get_video_info";
    pub const WATCH: &str = "https://www.youtube.com/watch";
    pub const EMBED_REFERRER: &str = "https://youtube.googleapis.com/v/";
    pub const PLAYLIST_LISTING: &str = "https://www.youtube.com/list_ajax";
}

/// YouTube client: transport, signature cache and filename sanitizer.
pub struct YoutubeApi {
    transport: Arc<dyn Transport>,
    signatures: SignatureResolver,
    sanitizer: Arc<dyn FileNameSanitizer>,
}

impl YoutubeApi {
    /// Create a client over an arbitrary transport and sanitizer.
    pub fn new(transport: Arc<dyn Transport>, sanitizer: Arc<dyn FileNameSanitizer>) -> Self {
        Self {
            transport,
            signatures: SignatureResolver::new(),
            sanitizer,
        }
    }

    /// Create an HTTP client using the configured user agent, connect
    /// timeout and transliteration language.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(
            &config.network.user_agent,
            Duration::from_secs(config.network.connect_timeout_seconds),
        )?;
        let sanitizer = Transliterator::for_language(&config.options.file_name_language);

        Ok(Self::new(Arc::new(transport), Arc::new(sanitizer)))
    }

    /// Replace the filename sanitizer.
    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn FileNameSanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn sanitizer(&self) -> &dyn FileNameSanitizer {
        self.sanitizer.as_ref()
    }

    pub fn signatures(&self) -> &SignatureResolver {
        &self.signatures
    }
}
