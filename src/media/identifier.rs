//! Extraction of video and playlist ids from user input.

use url::Url;

use crate::error::{Error, Result};

/// Host serving short links of the form `youtu.be/<id>`.
const SHORT_LINK_HOST: &str = "youtu.be";

/// A resolved identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Video(String),
    Playlist(String),
}

impl Identifier {
    /// Classify raw input as a video or a playlist.
    ///
    /// Video URL shapes win over playlist query keys, so a watch URL that
    /// also carries `list=` resolves to the video. Bare input is a video id.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::InvalidIdentifier("empty input".into()));
        }

        let Some(url) = parse_url(input) else {
            return Ok(Identifier::Video(input.to_string()));
        };

        if let Some(id) = video_id_from_url(&url)? {
            return Ok(Identifier::Video(id));
        }
        if let Some(id) = playlist_id_from_url(&url) {
            return Ok(Identifier::Playlist(id));
        }

        Ok(Identifier::Video(input.to_string()))
    }
}

/// Extract a video id from a URL or return the input as a direct id.
pub fn resolve_video_id(input: &str) -> Result<String> {
    let input = input.trim();
    match parse_url(input) {
        Some(url) => Ok(video_id_from_url(&url)?.unwrap_or_else(|| input.to_string())),
        None => Ok(input.to_string()),
    }
}

/// Extract a playlist id from `list` (or legacy `p`) or return the input as is.
pub fn resolve_playlist_id(input: &str) -> String {
    let input = input.trim();
    parse_url(input)
        .and_then(|url| playlist_id_from_url(&url))
        .unwrap_or_else(|| input.to_string())
}

/// Parse input as a URL, accepting scheme-less links like `youtu.be/abc`.
fn parse_url(input: &str) -> Option<Url> {
    if let Ok(url) = Url::parse(input) {
        if url.has_host() {
            return Some(url);
        }
        return None;
    }

    if input.contains('/') || input.contains('?') {
        return Url::parse(&format!("https://{}", input.trim_start_matches('/')))
            .ok()
            .filter(|url| url.has_host());
    }

    None
}

fn video_id_from_url(url: &Url) -> Result<Option<String>> {
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    if url.host_str() == Some(SHORT_LINK_HOST) {
        if let Some(id) = segments.first() {
            return Ok(Some((*id).to_string()));
        }
    }

    for window in segments.windows(2) {
        if window[0] == "embed" || window[0] == "v" {
            return Ok(Some(window[1].to_string()));
        }
    }

    if segments.first() == Some(&"watch") {
        if let Some(id) = query_value(url, "v") {
            return Ok(Some(id));
        }
        if playlist_id_from_url(url).is_none() {
            return Err(Error::InvalidIdentifier(format!(
                "watch URL without a 'v' parameter: {}",
                url
            )));
        }
    }

    Ok(None)
}

fn playlist_id_from_url(url: &Url) -> Option<String> {
    query_value(url, "list").or_else(|| query_value(url, "p"))
}

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, v)| k == key && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_short_link() {
        assert_eq!(resolve_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap(), "dQw4w9WgXcQ");
        assert_eq!(resolve_video_id("youtu.be/dQw4w9WgXcQ").unwrap(), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_resolve_embed_and_v_paths() {
        assert_eq!(
            resolve_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            resolve_video_id("https://www.youtube.com/v/dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_resolve_watch_url() {
        assert_eq!(
            resolve_video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_resolve_bare_id() {
        assert_eq!(resolve_video_id("dQw4w9WgXcQ").unwrap(), "dQw4w9WgXcQ");
        assert_eq!(resolve_video_id("  dQw4w9WgXcQ ").unwrap(), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_watch_without_v_is_invalid() {
        assert!(resolve_video_id("https://www.youtube.com/watch?feature=share").is_err());
    }

    #[test]
    fn test_resolve_playlist_ids() {
        assert_eq!(
            resolve_playlist_id("https://www.youtube.com/playlist?list=ABC"),
            "ABC"
        );
        assert_eq!(
            resolve_playlist_id("https://www.youtube.com/view_play_list?p=XYZ"),
            "XYZ"
        );
        assert_eq!(resolve_playlist_id("PL123"), "PL123");
    }

    #[test]
    fn test_identifier_parse() {
        assert_eq!(
            Identifier::parse("https://www.youtube.com/watch?v=abc&list=PL1").unwrap(),
            Identifier::Video("abc".into())
        );
        assert_eq!(
            Identifier::parse("https://www.youtube.com/watch?list=PL1").unwrap(),
            Identifier::Playlist("PL1".into())
        );
        assert_eq!(
            Identifier::parse("https://www.youtube.com/playlist?list=PL1").unwrap(),
            Identifier::Playlist("PL1".into())
        );
        assert_eq!(
            Identifier::parse("abc").unwrap(),
            Identifier::Video("abc".into())
        );
        assert!(Identifier::parse("   ").is_err());
    }
}
