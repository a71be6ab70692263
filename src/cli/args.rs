//! Command-line argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::captions::CaptionFormat;
use crate::config::Config;

/// YouTube video and playlist downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "youtube-downloader",
    version,
    about = "Download YouTube videos, playlists and captions",
    long_about = "A CLI tool to download YouTube videos and playlists.\n\n\
                  Accepts watch, short, embed and playlist URLs or a bare video id. \
                  Interrupted downloads can be resumed with --resume."
)]
pub struct Args {
    /// Video or playlist URL, or a bare video id.
    pub target: String,

    /// Preferred stream itag.
    #[arg(short, long)]
    pub itag: Option<u32>,

    /// Also download captions, optionally in a given language (`--captions=de`).
    #[arg(
        long,
        value_name = "LANGUAGE",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "en"
    )]
    pub captions: Option<String>,

    /// Caption file format.
    #[arg(long, value_enum)]
    pub caption_format: Option<CaptionFormatArg>,

    /// Output directory.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep partially downloaded files and fetch only the rest.
    #[arg(short, long)]
    pub resume: bool,

    /// Print metadata and available formats instead of downloading.
    #[arg(long)]
    pub info: bool,

    /// Transliteration table for file names (en, de, ru, uk).
    #[arg(short, long)]
    pub language: Option<String>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

/// CLI caption format argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CaptionFormatArg {
    /// SubRip.
    Srt,
    /// MicroDVD frame-based subtitles.
    Sub,
    /// Advanced SubStation Alpha.
    Ass,
}

impl From<CaptionFormatArg> for CaptionFormat {
    fn from(arg: CaptionFormatArg) -> Self {
        match arg {
            CaptionFormatArg::Srt => CaptionFormat::Srt,
            CaptionFormatArg::Sub => CaptionFormat::Sub,
            CaptionFormatArg::Ass => CaptionFormat::Ass,
        }
    }
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(itag) = self.itag {
            config.options.itag = Some(itag);
        }

        if let Some(output) = &self.output {
            config.options.output_directory = output.clone();
        }

        if let Some(language) = &self.language {
            config.options.file_name_language = language.clone();
        }

        if let Some(language) = &self.captions {
            config.captions.enabled = true;
            config.captions.language = language.clone();
        }

        if let Some(format) = self.caption_format {
            config.captions.format = CaptionFormat::from(format).to_string();
        }

        // Boolean flags (only override if set to non-default)
        if self.resume {
            config.options.resume = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "youtube-downloader",
            "https://youtu.be/abc",
            "--itag",
            "22",
            "--captions=de",
            "--caption-format",
            "ass",
            "--output",
            "/tmp/out",
            "--resume",
        ]);
        let mut config = Config::default();
        args.merge_into_config(&mut config);

        assert_eq!(config.options.itag, Some(22));
        assert!(config.captions.enabled);
        assert_eq!(config.captions.language, "de");
        assert_eq!(config.captions.caption_format(), CaptionFormat::Ass);
        assert_eq!(config.options.output_directory, PathBuf::from("/tmp/out"));
        assert!(config.options.resume);
    }

    #[test]
    fn test_bare_captions_flag_defaults_to_english() {
        let args = Args::parse_from(["youtube-downloader", "abc", "--captions"]);
        let mut config = Config::default();
        args.merge_into_config(&mut config);

        assert!(config.captions.enabled);
        assert_eq!(config.captions.language, "en");
    }

    #[test]
    fn test_bare_captions_flag_before_target() {
        let args = Args::parse_from([
            "youtube-downloader",
            "--captions",
            "https://www.youtube.com/watch?v=abc",
        ]);

        assert_eq!(args.captions.as_deref(), Some("en"));
        assert_eq!(args.target, "https://www.youtube.com/watch?v=abc");
    }

    #[test]
    fn test_defaults_leave_config_untouched() {
        let args = Args::parse_from(["youtube-downloader", "abc"]);
        let mut config = Config::default();
        args.merge_into_config(&mut config);

        assert!(!config.captions.enabled);
        assert!(!config.options.resume);
        assert_eq!(config.options.itag, None);
    }
}
