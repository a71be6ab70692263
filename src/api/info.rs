//! Video metadata resolution, including the cipher fallback.

use std::collections::HashMap;
use std::sync::Arc;

use url::{form_urlencoded, Url};

use crate::api::watch_page::scan_watch_page;
use crate::api::youtube::{endpoints, YoutubeApi};
use crate::captions::parse_caption_tracks;
use crate::error::{Error, Result};
use crate::media::formats::build_catalog;
use crate::media::VideoMetadata;
use crate::signature::SignatureProgram;

/// Error code that means "signatures are ciphered, use the watch page".
const CIPHER_FALLBACK_CODE: i64 = 150;

/// Fields whose truthiness marks a live video.
const LIVE_INDICATORS: [&str; 3] = ["live_playback", "livestream", "live_default_broadcast"];

/// Live playback (HLS) URL field.
const LIVE_PLAYBACK_URL: &str = "hlsvp";

const CAPTION_TRACKS: &str = "caption_tracks";

const THUMBNAIL_KEYS: [&str; 6] = [
    "thumbnail_url",
    "iurl",
    "iurlmq",
    "iurlhq",
    "iurlsd",
    "iurlmaxres",
];

/// Working key/value map assembled from the info response and watch page.
type InfoMap = HashMap<String, String>;

/// Cipher state of a decoded info response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InfoStatus {
    Ok,
    /// The response is usable only after the watch-page fallback.
    NeedsCipherFallback { failure: Option<(String, i64)> },
}

impl YoutubeApi {
    /// Resolve metadata for a video id.
    ///
    /// With `detailed`, the player asset is fetched (or taken from the
    /// cache) so ciphered signatures can be decrypted.
    pub async fn get_video_info(&self, video_id: &str, detailed: bool) -> Result<VideoMetadata> {
        let url = info_url(video_id)?;
        tracing::debug!("Fetching video info for {}", video_id);

        let body = self.transport().get_text(url.as_str()).await?;
        let mut info: InfoMap = form_urlencoded::parse(body.as_bytes()).into_owned().collect();

        let mut asset_url = None;
        if let InfoStatus::NeedsCipherFallback { failure } = classify_info(&info)? {
            tracing::info!("Signatures are ciphered for {}, using watch page", video_id);
            asset_url = self.merge_watch_page(video_id, &mut info, failure).await?;
        }

        let program = match (detailed, asset_url) {
            (true, Some(asset_url)) => self.transform_for(&asset_url).await,
            _ => None,
        };

        self.compose_metadata(video_id, &info, program.as_deref())
    }

    /// Fetch the watch page, merge its player arguments into `info` and
    /// return the player asset URL.
    async fn merge_watch_page(
        &self,
        video_id: &str,
        info: &mut InfoMap,
        failure: Option<(String, i64)>,
    ) -> Result<Option<String>> {
        let url = Url::parse_with_params(endpoints::WATCH, &[("v", video_id), ("hl", "en")])?;
        let html = self.transport().get_text(url.as_str()).await?;

        match scan_watch_page(&html)?.into_config()? {
            Some(config) => {
                info.extend(config.args);
                Ok(config.asset_url)
            }
            None => match failure {
                Some((reason, code)) => Err(Error::unavailable(reason, Some(code))),
                None => {
                    tracing::warn!("No player config on watch page for {}", video_id);
                    Ok(None)
                }
            },
        }
    }

    /// Build a transform handle. Failures only disable decryption.
    async fn transform_for(&self, asset_url: &str) -> Option<Arc<SignatureProgram>> {
        match self
            .signatures()
            .program_for(self.transport(), asset_url)
            .await
        {
            Ok(program) => Some(program),
            Err(e) => {
                tracing::warn!("Signature transform unavailable ({}): {}", asset_url, e);
                None
            }
        }
    }

    fn compose_metadata(
        &self,
        video_id: &str,
        info: &InfoMap,
        program: Option<&SignatureProgram>,
    ) -> Result<VideoMetadata> {
        let title = info
            .get("title")
            .cloned()
            .unwrap_or_else(|| video_id.to_string());
        let file_base_name = self.sanitizer().sanitize(&title);

        let mut meta = VideoMetadata {
            video_id: video_id.to_string(),
            file_base_name,
            author: info.get("author").cloned(),
            duration_seconds: parse_or_default(info, "length_seconds"),
            view_count: parse_or_default(info, "view_count"),
            rating: parse_or_default(info, "avg_rating"),
            thumbnails: THUMBNAIL_KEYS
                .iter()
                .filter_map(|key| info.get(*key).filter(|v| !v.is_empty()).cloned())
                .collect(),
            title,
            ..Default::default()
        };

        if LIVE_INDICATORS.iter().any(|key| is_truthy(info.get(*key))) {
            let stream_url = info
                .get(LIVE_PLAYBACK_URL)
                .filter(|v| !v.is_empty())
                .ok_or(Error::LiveStreamEnded)?;
            meta.is_live = true;
            meta.stream_url = Some(stream_url.clone());
            return Ok(meta);
        }

        let (formats, adaptive_formats) = build_catalog(info, &meta.file_base_name, program);
        meta.formats = formats;
        meta.adaptive_formats = adaptive_formats;

        if let Some(tracks) = info.get(CAPTION_TRACKS) {
            meta.captions = parse_caption_tracks(tracks);
        }

        tracing::debug!(
            "Resolved {}: {} combined, {} split, {} caption tracks",
            video_id,
            meta.formats.len(),
            meta.adaptive_formats.len(),
            meta.captions.len()
        );

        Ok(meta)
    }
}

fn info_url(video_id: &str) -> Result<Url> {
    let eurl = format!("{}{}", endpoints::EMBED_REFERRER, video_id);
    Ok(Url::parse_with_params(
        endpoints::VIDEO_INFO,
        &[("video_id", video_id), ("eurl", eurl.as_str())],
    )?)
}

/// Decide between direct use, cipher fallback and hard failure.
pub(crate) fn classify_info(info: &InfoMap) -> Result<InfoStatus> {
    if info.get("status").map(String::as_str) == Some("fail") {
        let code = info.get("errorcode").and_then(|c| c.parse::<i64>().ok());
        let reason = info
            .get("reason")
            .cloned()
            .unwrap_or_else(|| "unknown reason".to_string());

        return match code {
            Some(CIPHER_FALLBACK_CODE) => Ok(InfoStatus::NeedsCipherFallback {
                failure: Some((reason, CIPHER_FALLBACK_CODE)),
            }),
            _ => Err(Error::unavailable(reason, code)),
        };
    }

    let cipher_flag = info
        .get("use_cipher_signature")
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));
    let signed_probe = info
        .get("probe_url")
        .is_some_and(|v| v.contains("signature="));
    let reload_flag = info
        .get("fflags")
        .is_some_and(|v| v.contains("html5_signature_reload=true"));

    if cipher_flag || signed_probe || reload_flag {
        return Ok(InfoStatus::NeedsCipherFallback { failure: None });
    }

    Ok(InfoStatus::Ok)
}

fn is_truthy(value: Option<&String>) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) => !(v.is_empty() || v == "0" || v == "false"),
        None => false,
    }
}

fn parse_or_default<T: std::str::FromStr + Default>(info: &InfoMap, key: &str) -> T {
    info.get(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default()
}
