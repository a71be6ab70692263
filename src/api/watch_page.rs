//! Embedded player configuration extraction from the watch page.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};

/// Host that relative player asset paths are resolved against.
pub const STATIC_ASSET_HOST: &str = "https://s.ytimg.com/";

/// Prefix the service puts in front of JSON to stop it being executed.
const JSON_GUARD: &str = ")]}'";

static BOOTSTRAP_DATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"bootstrap_data\s*=\s*"((?:[^"\\]|\\.)*)""#).unwrap()
});

static PLAYER_CONFIG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"ytplayer\.config\s*=\s*"#).unwrap());

static UNAVAILABLE_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([a-z0-9]+)[^>]*\bid="unavailable-message"[^>]*>"#).unwrap()
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"<[^>]+>"#).unwrap());

static JS_HEX_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\\x([0-9a-fA-F]{2})"#).unwrap());

/// One way of locating the player configuration in the page.
pub struct ExtractionStrategy {
    pub name: &'static str,
    extract: fn(&str) -> Option<Value>,
}

/// Strategies in priority order.
pub static STRATEGIES: &[ExtractionStrategy] = &[
    ExtractionStrategy {
        name: "bootstrap_data",
        extract: extract_bootstrap_data,
    },
    ExtractionStrategy {
        name: "ytplayer.config",
        extract: extract_player_config,
    },
];

/// Player configuration pulled out of the watch page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerConfig {
    /// Player arguments flattened to strings.
    pub args: HashMap<String, String>,
    /// Absolute URL of the player asset.
    pub asset_url: Option<String>,
}

/// Outcome of scanning a watch page.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchPage {
    Config(PlayerConfig),
    /// No configuration, but the page shows an error message.
    Unavailable(String),
    /// Neither a configuration nor an error message.
    Unrecognized,
}

/// Scan a watch page with each strategy in order.
pub fn scan_watch_page(html: &str) -> Result<WatchPage> {
    for strategy in STRATEGIES {
        if let Some(config) = (strategy.extract)(html) {
            tracing::debug!("Player config found via {}", strategy.name);
            return Ok(WatchPage::Config(player_config_from_value(&config)?));
        }
    }

    if let Some(message) = unavailable_message(html) {
        return Ok(WatchPage::Unavailable(message));
    }

    Ok(WatchPage::Unrecognized)
}

fn extract_bootstrap_data(html: &str) -> Option<Value> {
    let raw = BOOTSTRAP_DATA.captures(html)?.get(1)?.as_str();
    let json_string = JS_HEX_ESCAPE.replace_all(raw, r"\u00$1");
    let unescaped: String = serde_json::from_str(&format!("\"{}\"", json_string)).ok()?;
    let body = unescaped.trim_start().trim_start_matches(JSON_GUARD);
    let value: Value = serde_json::from_str(body).ok()?;

    value
        .pointer("/content/swfcfg")
        .or_else(|| value.get("swfcfg"))
        .cloned()
        .or_else(|| value.get("args").map(|_| value.clone()))
}

fn extract_player_config(html: &str) -> Option<Value> {
    let start = PLAYER_CONFIG.find(html)?.end();
    serde_json::Deserializer::from_str(&html[start..])
        .into_iter::<Value>()
        .next()?
        .ok()
        .filter(Value::is_object)
}

fn player_config_from_value(config: &Value) -> Result<PlayerConfig> {
    let args = config
        .get("args")
        .and_then(Value::as_object)
        .map(|args| {
            args.iter()
                .filter_map(|(k, v)| value_to_string(v).map(|s| (k.clone(), s)))
                .collect()
        })
        .unwrap_or_default();

    let asset_url = config
        .pointer("/assets/js")
        .and_then(Value::as_str)
        .map(resolve_asset_url)
        .transpose()?;

    Ok(PlayerConfig { args, asset_url })
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Make a player asset reference absolute.
pub fn resolve_asset_url(reference: &str) -> Result<String> {
    if let Some(rest) = reference.strip_prefix("//") {
        return Ok(format!("https://{}", rest));
    }
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return Ok(reference.to_string());
    }

    Ok(Url::parse(STATIC_ASSET_HOST)?.join(reference)?.to_string())
}

fn unavailable_message(html: &str) -> Option<String> {
    let caps = UNAVAILABLE_MESSAGE.captures(html)?;
    let rest = &html[caps.get(0)?.end()..];
    let end = rest.find(&format!("</{}>", &caps[1]))?;
    let inner = &rest[..end];
    let text = TAG.replace_all(inner, " ");
    let message = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!message.is_empty()).then_some(message)
}

impl WatchPage {
    /// Convert a non-config outcome into the matching error.
    pub fn into_config(self) -> Result<Option<PlayerConfig>> {
        match self {
            WatchPage::Config(config) => Ok(Some(config)),
            WatchPage::Unavailable(message) => Err(Error::unavailable(message, None)),
            WatchPage::Unrecognized => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_config_assignment() {
        let html = r#"<script>var ytplayer = ytplayer || {};ytplayer.config = {"assets":{"js":"//s.ytimg.com/yts/jsbin/player/base.js"},"args":{"title":"Clip","length_seconds":212,"live_playback":false,"url_encoded_fmt_stream_map":"itag=18"}};ytplayer.load = function() {};</script>"#;

        let WatchPage::Config(config) = scan_watch_page(html).unwrap() else {
            panic!("expected config");
        };
        assert_eq!(config.args["title"], "Clip");
        assert_eq!(config.args["length_seconds"], "212");
        assert_eq!(config.args["live_playback"], "false");
        assert_eq!(
            config.asset_url.as_deref(),
            Some("https://s.ytimg.com/yts/jsbin/player/base.js")
        );
    }

    #[test]
    fn test_bootstrap_data_has_priority() {
        let html = r#"<script>var bootstrap_data = ")]}'{\"content\":{\"swfcfg\":{\"assets\":{\"js\":\"\/yts\/jsbin\/m.js\"},\"args\":{\"title\":\"Mobile \x26 Co\"}}}}";
ytplayer.config = {"args":{"title":"Desktop"}};</script>"#;

        let WatchPage::Config(config) = scan_watch_page(html).unwrap() else {
            panic!("expected config");
        };
        assert_eq!(config.args["title"], "Mobile & Co");
        assert_eq!(
            config.asset_url.as_deref(),
            Some("https://s.ytimg.com/yts/jsbin/m.js")
        );
    }

    #[test]
    fn test_unavailable_message() {
        let html = r#"<div id="player"><h1 id="unavailable-message" class="message">
            This video is <b>private</b>.
        </h1></div>"#;
        assert_eq!(
            scan_watch_page(html).unwrap(),
            WatchPage::Unavailable("This video is private .".into())
        );
    }

    #[test]
    fn test_unrecognized_page() {
        assert_eq!(
            scan_watch_page("<html></html>").unwrap(),
            WatchPage::Unrecognized
        );
    }

    #[test]
    fn test_resolve_asset_url() {
        assert_eq!(
            resolve_asset_url("//s.ytimg.com/a.js").unwrap(),
            "https://s.ytimg.com/a.js"
        );
        assert_eq!(
            resolve_asset_url("/yts/jsbin/b.js").unwrap(),
            "https://s.ytimg.com/yts/jsbin/b.js"
        );
        assert_eq!(
            resolve_asset_url("https://www.youtube.com/c.js").unwrap(),
            "https://www.youtube.com/c.js"
        );
    }
}
