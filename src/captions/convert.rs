//! Caption output formats.

use std::fmt::{self, Write};

use crate::captions::track::CaptionCue;

/// Frame rate used for the `sub` format when none is configured.
pub const DEFAULT_FPS: u32 = 25;

const ASS_HEADER: &str = "[Script Info]
ScriptType: v4.00+
Collisions: Normal
PlayDepth: 0

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H80000000,0,0,0,0,100,100,0,0,1,2,1,2,10,10,10,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
";

/// Caption output format.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CaptionFormat {
    #[default]
    Srt,
    Sub,
    Ass,
    /// Unrecognized format name; converts to an empty `txt` caption.
    Other(String),
}

impl CaptionFormat {
    /// Parse a format name. Unknown names are kept as `Other`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "" | "srt" => CaptionFormat::Srt,
            "sub" => CaptionFormat::Sub,
            "ass" => CaptionFormat::Ass,
            other => CaptionFormat::Other(other.to_string()),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            CaptionFormat::Srt => "srt",
            CaptionFormat::Sub => "sub",
            CaptionFormat::Ass => "ass",
            CaptionFormat::Other(_) => "txt",
        }
    }
}

impl fmt::Display for CaptionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptionFormat::Other(name) => write!(f, "{}", name),
            known => write!(f, "{}", known.extension()),
        }
    }
}

/// Converted caption text and the extension it should be saved with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedCaption {
    pub text: String,
    pub extension: &'static str,
}

/// Convert cues into the requested format.
pub fn convert(cues: &[CaptionCue], format: &CaptionFormat, fps: u32) -> ConvertedCaption {
    let text = match format {
        CaptionFormat::Srt => to_srt(cues),
        CaptionFormat::Sub => to_sub(cues, fps),
        CaptionFormat::Ass => to_ass(cues),
        CaptionFormat::Other(name) => {
            tracing::warn!("Unknown caption format '{}', writing empty caption", name);
            String::new()
        }
    };

    ConvertedCaption {
        text,
        extension: format.extension(),
    }
}

fn to_srt(cues: &[CaptionCue]) -> String {
    let mut out = String::new();
    for (index, cue) in cues.iter().enumerate() {
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            srt_timestamp(cue.start),
            srt_timestamp(cue.end()),
            cue.text
        );
    }
    out
}

fn to_sub(cues: &[CaptionCue], fps: u32) -> String {
    let fps = f64::from(if fps == 0 { DEFAULT_FPS } else { fps });
    let mut out = String::new();
    for cue in cues {
        let start = (cue.start * fps).floor() as u64;
        let end = (cue.end() * fps).floor() as u64;
        let _ = writeln!(out, "{{{}}}{{{}}}{}", start, end, cue.text.replace('\n', "|"));
    }
    out
}

fn to_ass(cues: &[CaptionCue]) -> String {
    let mut out = String::from(ASS_HEADER);
    for cue in cues {
        let _ = writeln!(
            out,
            "Dialogue: 0,{},{},Default,,0,0,0,,{}",
            ass_timestamp(cue.start),
            ass_timestamp(cue.end()),
            cue.text.replace('\n', "\\N")
        );
    }
    out
}

/// `HH:MM:SS,mmm`
fn srt_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        total_ms / 3_600_000,
        (total_ms / 60_000) % 60,
        (total_ms / 1000) % 60,
        total_ms % 1000
    )
}

/// `H:MM:SS.cc`
fn ass_timestamp(seconds: f64) -> String {
    let total_cs = (seconds.max(0.0) * 100.0).round() as u64;
    format!(
        "{}:{:02}:{:02}.{:02}",
        total_cs / 360_000,
        (total_cs / 6000) % 60,
        (total_cs / 100) % 60,
        total_cs % 100
    )
}
