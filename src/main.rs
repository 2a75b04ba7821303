mod core;
mod engine;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Arg, ArgAction, Command};

use crate::core::model::{DownloadRequest, TimeRange};
use crate::core::orchestrator::Orchestrator;
use crate::core::source::UrlSource;
use crate::core::timecode::parse_timecode;
use crate::engine::ytdlp::YtDlp;

fn build_cli() -> Command {
    Command::new("vget")
        .about("Video/audio downloader driven by yt-dlp")
        .arg(
            Arg::new("url")
                .help("URL of the video (if not using --file)")
                .num_args(1),
        )
        .arg(
            Arg::new("quality")
                .short('q')
                .long("quality")
                .help(
                    "Maximum video height in pixels; the best stream not \
                     exceeding it is downloaded. Ignored with --audio-only",
                )
                .value_parser(["1080", "720", "480", "360"])
                .default_value("1080")
                .num_args(1),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .help("Target format: mp4/webm/mkv for video, mp3/m4a/wav with --audio-only")
                .default_value("mp4")
                .num_args(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output directory")
                .default_value(".")
                .num_args(1),
        )
        .arg(
            Arg::new("audio_only")
                .long("audio-only")
                .help("Download audio only")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("audio_quality")
                .long("audio-quality")
                .help("Audio bitrate in kbps, common values 128/192/256/320. Only with --audio-only")
                .default_value("192")
                .num_args(1),
        )
        .arg(
            Arg::new("start_time")
                .long("start-time")
                .help("Start of the range to keep (HH:MM:SS)")
                .num_args(1),
        )
        .arg(
            Arg::new("end_time")
                .long("end-time")
                .help("End of the range to keep (HH:MM:SS)")
                .num_args(1),
        )
        .arg(
            Arg::new("file")
                .long("file")
                .help("CSV file with one URL per row, first column")
                .num_args(1),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut app = build_cli();
    let matches = app.clone().get_matches();

    let quality: u32 = matches.get_one::<String>("quality").unwrap().parse()?;
    let format = matches.get_one::<String>("format").unwrap().clone();
    let out_dir: PathBuf = matches.get_one::<String>("output").unwrap().into();
    let audio_only = matches.get_flag("audio_only");
    let audio_bitrate: u32 = matches
        .get_one::<String>("audio_quality")
        .unwrap()
        .parse()
        .context("--audio-quality must be an integer kbps value")?;

    // Timestamp validation happens before any engine call.
    let range = TimeRange {
        start: parse_timecode(matches.get_one::<String>("start_time").map(String::as_str))?,
        end: parse_timecode(matches.get_one::<String>("end_time").map(String::as_str))?,
    };

    let source = if let Some(path) = matches.get_one::<String>("file") {
        UrlSource::Csv(PathBuf::from(path))
    } else if let Some(url) = matches.get_one::<String>("url") {
        UrlSource::Single(url.clone())
    } else {
        eprintln!("Error: provide either a URL or a CSV file via --file.\n");
        app.print_help()?;
        std::process::exit(2);
    };

    // An unreadable URL list fails the batch before any download starts.
    let urls = source.urls()?;

    tokio::fs::create_dir_all(&out_dir)
        .await
        .with_context(|| format!("create output directory {}", out_dir.display()))?;

    let requests: Vec<DownloadRequest> = urls
        .into_iter()
        .map(|url| DownloadRequest {
            url,
            quality: Some(quality),
            format: format.clone(),
            audio_only,
            audio_bitrate,
            output_dir: out_dir.clone(),
            range,
        })
        .collect();

    let engine = YtDlp::locate().await?;
    let orchestrator = Orchestrator::new(Arc::new(engine));
    orchestrator.run(&requests).await;

    Ok(())
}
