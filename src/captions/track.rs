//! Caption track indexing and timed-text parsing.

use std::sync::LazyLock;

use regex::Regex;
use url::form_urlencoded;

use crate::api::client::Transport;
use crate::error::Result;
use crate::media::item::CaptionTrack;

/// Variant tags starting with this marker are unnamed auto tracks.
const UNNAMED_VARIANT_MARKER: char = '.';

/// Cue duration used when the service omits one.
const DEFAULT_CUE_DURATION: f64 = 1.0;

static TEXT_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<text\b([^>]*?)(?:/>|>([\s\S]*?)</text>)"#).unwrap());

static ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([a-zA-Z_:-]+)\s*=\s*"([^"]*)""#).unwrap());

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);"#).unwrap());

/// One timed caption line.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionCue {
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
    pub text: String,
}

impl CaptionCue {
    pub fn new(start: f64, duration: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            duration: duration.max(0.0),
            text: text.into(),
        }
    }

    /// End time in seconds, never before `start`.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Parse the comma-delimited caption track list.
pub fn parse_caption_tracks(list: &str) -> Vec<CaptionTrack> {
    list.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .enumerate()
        .filter_map(|(index, entry)| {
            let mut url = None;
            let mut language_code = None;
            let mut name = None;
            let mut variant = None;

            for (key, value) in form_urlencoded::parse(entry.as_bytes()) {
                match key.as_ref() {
                    "u" => url = Some(value.into_owned()),
                    "lc" if !value.is_empty() => language_code = Some(value.into_owned()),
                    "n" => name = Some(value.into_owned()),
                    "v" if !value.is_empty() => variant = Some(value.into_owned()),
                    _ => {}
                }
            }

            let url = url?;
            let key = language_code
                .clone()
                .or_else(|| variant.filter(|v| !v.starts_with(UNNAMED_VARIANT_MARKER)))
                .unwrap_or_else(|| index.to_string());

            Some(CaptionTrack {
                name: name.unwrap_or_else(|| key.clone()),
                key,
                language_code,
                url,
            })
        })
        .collect()
}

/// Fetch a track's timed text and parse its cues.
pub async fn fetch_cues(transport: &dyn Transport, track: &CaptionTrack) -> Result<Vec<CaptionCue>> {
    tracing::debug!("Fetching captions '{}' from {}", track.key, track.url);
    let body = transport.get_text(&track.url).await?;
    Ok(parse_timed_text(&body))
}

/// Parse timed-text XML into cues.
pub fn parse_timed_text(xml: &str) -> Vec<CaptionCue> {
    TEXT_ELEMENT
        .captures_iter(xml)
        .filter_map(|caps| {
            let mut start = None;
            let mut duration = None;
            for attr in ATTRIBUTE.captures_iter(&caps[1]) {
                match &attr[1] {
                    "start" => start = attr[2].parse::<f64>().ok(),
                    "dur" => duration = attr[2].parse::<f64>().ok(),
                    _ => {}
                }
            }

            let text = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            Some(CaptionCue::new(
                start?,
                duration.unwrap_or(DEFAULT_CUE_DURATION),
                decode_entities(text).trim(),
            ))
        })
        .collect()
}

/// Decode HTML entities. Timed text is often escaped twice, so decoding is
/// repeated once if the first pass produced another entity.
pub fn decode_entities(text: &str) -> String {
    let once = decode_entities_once(text);
    if ENTITY.is_match(&once) {
        decode_entities_once(&once)
    } else {
        once
    }
}

fn decode_entities_once(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                }
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_caption_tracks_keys() {
        let list = [
            "u=https%3A%2F%2Fexample.com%2Ftt%3Flang%3Den&lc=en&n=English&v=.en",
            "u=https%3A%2F%2Fexample.com%2Ftt%3Flang%3Dasr&n=Auto&v=a.en",
            "u=https%3A%2F%2Fexample.com%2Ftt%3Fx&n=Unnamed&v=.xx",
        ]
        .join(",");

        let tracks = parse_caption_tracks(&list);
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].key, "en");
        assert_eq!(tracks[0].name, "English");
        assert_eq!(tracks[0].url, "https://example.com/tt?lang=en");
        assert_eq!(tracks[1].key, "a.en");
        assert_eq!(tracks[2].key, "2");
    }

    #[test]
    fn test_parse_timed_text() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
<text start="0" dur="1">a</text>
<text start="1" dur="1.5">Tom &amp;amp; Jerry&amp;#39;s</text>
<text start="3.2">no duration</text>
<text start="5" dur="1"/>
</transcript>"#;

        let cues = parse_timed_text(xml);
        assert_eq!(cues.len(), 4);
        assert_eq!(cues[0], CaptionCue::new(0.0, 1.0, "a"));
        assert_eq!(cues[1].text, "Tom & Jerry's");
        assert_eq!(cues[1].end(), 2.5);
        assert_eq!(cues[2].duration, 1.0);
        assert_eq!(cues[3].text, "");
        assert!(cues.iter().all(|c| c.end() >= c.start));
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("&lt;b&gt; &#65;&#x42; &unknown;"), "<b> AB &unknown;");
    }
}
