//! YouTube Downloader - CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use youtube_downloader::{
    api::YoutubeApi,
    cli::Args,
    config::{validate_config, Config},
    download::DownloadRequest,
    error::{exit_codes, Error, Result},
    media::Identifier,
    output::{
        create_spinner, print_banner, print_config_summary, print_error, print_info,
        print_playlist_info, print_playlist_report, print_success, print_video_info,
        print_warning, ProgressHooks,
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_) | Error::ConfigValidation { .. } | Error::TomlParse(_) => {
                    ExitCode::from(exit_codes::CONFIG_ERROR as u8)
                }
                Error::InvalidIdentifier(_) => ExitCode::from(exit_codes::INPUT_ERROR as u8),
                Error::Network(_) | Error::Http(_) => {
                    ExitCode::from(exit_codes::NETWORK_ERROR as u8)
                }
                Error::InfoUnavailable { .. }
                | Error::LiveStreamEnded
                | Error::NoDownloadableFormat => ExitCode::from(exit_codes::UNAVAILABLE as u8),
                Error::Download(_) | Error::Decryption(_) | Error::Io(_) => {
                    ExitCode::from(exit_codes::DOWNLOAD_ERROR as u8)
                }
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    print_banner();

    // Load configuration
    let mut config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        tracing::debug!("No configuration file at {}", args.config.display());
        Config::default()
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    validate_config(&config)?;

    let api = YoutubeApi::from_config(&config)?;
    let identifier = Identifier::parse(&args.target)?;

    match identifier {
        Identifier::Video(video_id) => run_video(&api, &config, &video_id, args.info).await,
        Identifier::Playlist(playlist_id) => {
            run_playlist(&api, &config, &playlist_id, args.info).await
        }
    }
}

async fn run_video(api: &YoutubeApi, config: &Config, video_id: &str, info_only: bool) -> Result<()> {
    if info_only {
        let spinner = create_spinner("Fetching video info...");
        let meta = api.get_video_info(video_id, true).await;
        spinner.finish_and_clear();
        print_video_info(&meta?);
        return Ok(());
    }

    let request = DownloadRequest::from_config(config);
    print_summary(video_id, &request);

    let hooks = ProgressHooks::new();
    let download = api.download_video(video_id, &request, &hooks).await?;

    if let Some(path) = download.caption_path {
        print_info(&format!("Captions written to {}", path.display()));
    } else if request.caption_language.is_some() {
        print_warning("No captions available for this video");
    }

    Ok(())
}

async fn run_playlist(
    api: &YoutubeApi,
    config: &Config,
    playlist_id: &str,
    info_only: bool,
) -> Result<()> {
    let spinner = create_spinner("Fetching playlist...");
    let playlist = api.get_playlist(playlist_id, info_only).await;
    spinner.finish_and_clear();
    let playlist = playlist?;

    if info_only {
        print_playlist_info(&playlist);
        for meta in playlist.members.iter().filter_map(|m| m.metadata.as_ref()) {
            print_video_info(meta);
        }
        return Ok(());
    }

    let request = DownloadRequest::from_config(config);
    print_summary(&format!("playlist {} ({} videos)", playlist.title, playlist.len()), &request);

    let hooks = ProgressHooks::new();
    let report = api.download_playlist(&playlist, &request, &hooks).await;
    print_playlist_report(&report);

    let report = report.into_result()?;
    print_success(&format!(
        "Downloaded {} of {} videos",
        report.completed_count(),
        report.total
    ));

    Ok(())
}

fn print_summary(target: &str, request: &DownloadRequest) {
    let captions = request
        .caption_language
        .as_ref()
        .map(|language| format!("{} ({})", language, request.caption_format));
    print_config_summary(
        target,
        &request.output_dir.display().to_string(),
        captions.as_deref(),
    );
}
