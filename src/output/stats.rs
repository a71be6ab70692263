//! Metadata and run summaries.

use console::style;
use indicatif::HumanBytes;

use crate::api::PlaylistInfo;
use crate::download::PlaylistReport;
use crate::media::{StreamDescriptor, VideoMetadata};

/// Print metadata and the available formats of a video.
pub fn print_video_info(meta: &VideoMetadata) {
    println!();
    println!("{}", style(&meta.title).bold());
    println!("  Id:       {}", meta.video_id);
    if let Some(author) = &meta.author {
        println!("  Author:   {}", author);
    }
    println!("  Duration: {}", format_duration(meta.duration_seconds));
    println!("  Views:    {}", meta.view_count);
    if meta.rating > 0.0 {
        println!("  Rating:   {:.2}", meta.rating);
    }
    if meta.is_live {
        println!("  Live:     {}", meta.stream_url.as_deref().unwrap_or("-"));
    }
    for thumbnail in &meta.thumbnails {
        println!("  Thumb:    {}", thumbnail);
    }

    print_formats("Formats", &meta.formats);
    print_formats("Adaptive formats", &meta.adaptive_formats);

    if !meta.captions.is_empty() {
        println!("{}", style("Captions:").bold());
        for track in &meta.captions {
            println!("  {:<8} {}", track.key, track.name);
        }
    }
}

fn print_formats(label: &str, formats: &[StreamDescriptor]) {
    if formats.is_empty() {
        return;
    }

    println!("{}", style(format!("{}:", label)).bold());
    for format in formats {
        let size = format
            .content_length
            .map(|len| HumanBytes(len).to_string())
            .unwrap_or_else(|| "-".to_string());
        let line = format!(
            "  {:>4}  {:<8} {:<32} {:>10}",
            format.itag,
            format.quality.as_deref().unwrap_or("-"),
            format.mime_type,
            size
        );
        if format.is_playable() {
            println!("{}", line);
        } else {
            println!("{} {}", style(line).dim(), style("(ciphered)").yellow());
        }
    }
}

/// Print the members of a playlist.
pub fn print_playlist_info(playlist: &PlaylistInfo) {
    println!();
    println!("{}", style(&playlist.title).bold());
    if let Some(author) = &playlist.author {
        println!("  Author: {}", author);
    }
    for member in &playlist.members {
        println!(
            "  {:>3}. {} {} ({})",
            member.ordinal,
            member.video_id,
            member.title.as_deref().unwrap_or(""),
            format_duration(member.duration_seconds.unwrap_or_default())
        );
    }
}

/// Print the outcome of a playlist run.
pub fn print_playlist_report(report: &PlaylistReport) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!(
        "{}",
        style(format!("Playlist {}:", report.playlist_id)).bold()
    );
    println!("  Downloaded: {}", style(report.completed_count()).green());
    if let Some(failure) = &report.failure {
        println!(
            "  Failed:     {} (#{} {})",
            style(report.failed_count()).red(),
            failure.position.ordinal,
            failure.position.video_id
        );
        println!("  Skipped:    {}", style(report.skipped_count()).yellow());
    }
    println!("  Total:      {}", report.total);
    println!("{}", style("═".repeat(50)).dim());
}

/// `H:MM:SS` or `M:SS`.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let (hours, minutes, secs) = (total / 3600, (total / 60) % 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
