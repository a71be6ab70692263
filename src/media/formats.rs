//! Format catalog construction and stream selection.

use std::collections::HashMap;

use url::form_urlencoded;

use crate::error::{Error, Result};
use crate::media::item::{StreamDescriptor, StreamKind, VideoMetadata};
use crate::signature::SignatureProgram;

/// Key of the combined (audio+video) stream list.
pub const COMBINED_LIST_KEY: &str = "url_encoded_fmt_stream_map";

/// Key of the split (adaptive) stream list.
pub const SPLIT_LIST_KEY: &str = "adaptive_fmts";

/// Extension used when the content type has no known mapping.
const DEFAULT_EXTENSION: &str = "mp4";

/// Build both descriptor lists from the working key/value map.
///
/// Source order is kept; the first entry is the conventional default.
pub fn build_catalog(
    info: &HashMap<String, String>,
    base_name: &str,
    program: Option<&SignatureProgram>,
) -> (Vec<StreamDescriptor>, Vec<StreamDescriptor>) {
    let combined = info
        .get(COMBINED_LIST_KEY)
        .map(|list| parse_stream_list(list, base_name, program))
        .unwrap_or_default();
    let split = info
        .get(SPLIT_LIST_KEY)
        .map(|list| parse_stream_list(list, base_name, program))
        .unwrap_or_default();

    (combined, split)
}

/// Parse one comma-delimited stream list.
pub fn parse_stream_list(
    list: &str,
    base_name: &str,
    program: Option<&SignatureProgram>,
) -> Vec<StreamDescriptor> {
    list.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .filter_map(|entry| parse_stream_entry(entry, base_name, program))
        .collect()
}

/// Parse one URL-encoded stream entry. Entries without a URL or itag are
/// skipped.
fn parse_stream_entry(
    entry: &str,
    base_name: &str,
    program: Option<&SignatureProgram>,
) -> Option<StreamDescriptor> {
    let params: HashMap<String, String> = form_urlencoded::parse(entry.as_bytes())
        .into_owned()
        .collect();

    let mut url = params.get("url")?.clone();
    let itag = params.get("itag")?.parse::<u32>().ok()?;
    let mut needs_decryption = false;

    if let Some(ciphered) = params.get("s") {
        match program.map(|p| p.apply(ciphered)) {
            Some(Ok(signature)) => append_signature(&mut url, &signature),
            Some(Err(e)) => {
                tracing::warn!("Failed to decrypt signature for itag {}: {}", itag, e);
                needs_decryption = true;
            }
            None => {
                tracing::debug!("itag {} has a ciphered signature and no transform", itag);
                needs_decryption = true;
            }
        }
    } else if let Some(signature) = params.get("sig").or_else(|| params.get("signature")) {
        if !url.contains("signature=") {
            append_signature(&mut url, signature);
        }
    }

    let mime_type = params
        .get("type")
        .map(|t| t.split(';').next().unwrap_or("").trim().to_string())
        .unwrap_or_default();
    let extension = extension_for_mime(&mime_type);

    Some(StreamDescriptor {
        itag,
        file_name: format!("{}.{}", base_name, extension),
        extension,
        mime_type,
        url,
        content_length: params.get("clen").and_then(|v| v.parse().ok()),
        quality: params
            .get("quality_label")
            .or_else(|| params.get("quality"))
            .cloned(),
        needs_decryption,
    })
}

fn append_signature(url: &mut String, signature: &str) {
    let encoded: String = form_urlencoded::byte_serialize(signature.as_bytes()).collect();
    url.push_str("&signature=");
    url.push_str(&encoded);
}

/// Map a content type to a file extension, defaulting to `mp4`.
pub fn extension_for_mime(mime_type: &str) -> String {
    let known = match mime_type {
        "video/mp4" | "audio/mp4" => Some("mp4"),
        "video/webm" | "audio/webm" => Some("webm"),
        "video/x-flv" => Some("flv"),
        "video/3gpp" => Some("3gp"),
        _ => None,
    };

    known
        .map(str::to_string)
        .or_else(|| {
            mime_guess::get_mime_extensions_str(mime_type)
                .and_then(|exts| exts.first())
                .map(|ext| ext.to_string())
        })
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Pick a stream by itag, falling back to the first playable combined
/// stream, then the first playable split stream. A requested itag that is
/// offered is returned even when it still needs decryption.
pub fn select_format(meta: &VideoMetadata, itag: Option<u32>) -> Result<(StreamKind, &StreamDescriptor)> {
    if let Some(itag) = itag {
        if let Some(d) = meta.formats.iter().find(|d| d.itag == itag) {
            return Ok((StreamKind::Combined, d));
        }
        if let Some(d) = meta.adaptive_formats.iter().find(|d| d.itag == itag) {
            return Ok((StreamKind::Split, d));
        }
        tracing::debug!("itag {} not offered, using default format", itag);
    }

    if let Some(d) = meta.formats.iter().find(|d| d.is_playable()) {
        return Ok((StreamKind::Combined, d));
    }
    if let Some(d) = meta.adaptive_formats.iter().find(|d| d.is_playable()) {
        return Ok((StreamKind::Split, d));
    }

    if meta.formats.is_empty() && meta.adaptive_formats.is_empty() {
        return Err(Error::NoDownloadableFormat);
    }
    Err(Error::Decryption(format!(
        "Every stream of {} has an undecryptable signature",
        meta.video_id
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::SignatureOp;

    fn entry(pairs: &[(&str, &str)]) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish()
    }

    fn descriptor(itag: u32) -> StreamDescriptor {
        StreamDescriptor {
            itag,
            mime_type: "video/mp4".into(),
            url: format!("https://cdn.example.com/{}", itag),
            file_name: "clip.mp4".into(),
            extension: "mp4".into(),
            content_length: None,
            quality: None,
            needs_decryption: false,
        }
    }

    #[test]
    fn test_build_catalog_keeps_order_and_extensions() {
        let combined = [
            entry(&[("url", "https://cdn/a?x=1"), ("itag", "22"), ("type", "video/mp4; codecs=\"avc1\""), ("sig", "PLAIN")]),
            entry(&[("url", "https://cdn/b?x=1"), ("itag", "43"), ("type", "video/webm")]),
        ]
        .join(",");
        let split = entry(&[
            ("url", "https://cdn/c?x=1"),
            ("itag", "140"),
            ("type", "audio/mp4"),
            ("clen", "1234"),
        ]);

        let mut info = HashMap::new();
        info.insert(COMBINED_LIST_KEY.to_string(), combined);
        info.insert(SPLIT_LIST_KEY.to_string(), split);

        let (formats, adaptive) = build_catalog(&info, "clip", None);
        assert_eq!(formats.iter().map(|d| d.itag).collect::<Vec<_>>(), vec![22, 43]);
        assert_eq!(formats[0].url, "https://cdn/a?x=1&signature=PLAIN");
        assert_eq!(formats[0].file_name, "clip.mp4");
        assert_eq!(formats[0].mime_type, "video/mp4");
        assert_eq!(formats[1].file_name, "clip.webm");
        assert_eq!(formats[0].content_length, None);

        assert_eq!(adaptive.len(), 1);
        assert_eq!(adaptive[0].content_length, Some(1234));
        assert_eq!(adaptive[0].extension, "mp4");
    }

    #[test]
    fn test_ciphered_signature_is_decrypted() {
        let program = SignatureProgram::new(vec![SignatureOp::Reverse]);
        let list = entry(&[("url", "https://cdn/a?x=1"), ("itag", "18"), ("s", "ABC")]);

        let formats = parse_stream_list(&list, "clip", Some(&program));
        assert_eq!(formats[0].url, "https://cdn/a?x=1&signature=CBA");
        assert!(!formats[0].url.contains("&s="));
        assert!(formats[0].is_playable());
    }

    #[test]
    fn test_ciphered_without_program_is_flagged() {
        let list = entry(&[("url", "https://cdn/a?x=1"), ("itag", "18"), ("s", "ABC")]);

        let formats = parse_stream_list(&list, "clip", None);
        assert_eq!(formats[0].url, "https://cdn/a?x=1");
        assert!(!formats[0].is_playable());
    }

    #[test]
    fn test_unknown_mime_defaults_to_mp4() {
        assert_eq!(extension_for_mime("video/x-unknown-thing"), "mp4");
        assert_eq!(extension_for_mime(""), "mp4");
        assert_eq!(extension_for_mime("video/webm"), "webm");
    }

    #[test]
    fn test_select_format_by_itag() {
        let meta = VideoMetadata {
            formats: vec![descriptor(22), descriptor(18)],
            adaptive_formats: vec![descriptor(137)],
            ..Default::default()
        };

        let (kind, d) = select_format(&meta, Some(18)).unwrap();
        assert_eq!((kind, d.itag), (StreamKind::Combined, 18));

        let (kind, d) = select_format(&meta, Some(137)).unwrap();
        assert_eq!((kind, d.itag), (StreamKind::Split, 137));
    }

    #[test]
    fn test_select_format_fallbacks() {
        let meta = VideoMetadata {
            formats: vec![descriptor(22)],
            adaptive_formats: vec![descriptor(137)],
            ..Default::default()
        };
        let (kind, d) = select_format(&meta, Some(999)).unwrap();
        assert_eq!((kind, d.itag), (StreamKind::Combined, 22));

        let split_only = VideoMetadata {
            adaptive_formats: vec![descriptor(137)],
            ..Default::default()
        };
        let (kind, d) = select_format(&split_only, Some(999)).unwrap();
        assert_eq!((kind, d.itag), (StreamKind::Split, 137));

        assert!(matches!(
            select_format(&VideoMetadata::default(), Some(999)),
            Err(Error::NoDownloadableFormat)
        ));
    }

    #[test]
    fn test_select_format_skips_ciphered_streams() {
        let mut ciphered = descriptor(22);
        ciphered.needs_decryption = true;
        let meta = VideoMetadata {
            formats: vec![ciphered.clone(), descriptor(18)],
            adaptive_formats: vec![descriptor(137)],
            ..Default::default()
        };
        let (kind, d) = select_format(&meta, None).unwrap();
        assert_eq!((kind, d.itag), (StreamKind::Combined, 18));

        let split_fallback = VideoMetadata {
            formats: vec![ciphered.clone()],
            adaptive_formats: vec![descriptor(137)],
            ..Default::default()
        };
        let (kind, d) = select_format(&split_fallback, Some(999)).unwrap();
        assert_eq!((kind, d.itag), (StreamKind::Split, 137));

        // An explicit request is honoured and left for the caller to reject.
        let (_, d) = select_format(&split_fallback, Some(22)).unwrap();
        assert!(d.needs_decryption);

        let all_ciphered = VideoMetadata {
            video_id: "abc".into(),
            formats: vec![ciphered],
            ..Default::default()
        };
        assert!(matches!(
            select_format(&all_ciphered, None),
            Err(Error::Decryption(_))
        ));
    }
}
