use std::path::PathBuf;
use std::process::Stdio;

use anyhow::Context;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::core::model::{ProgressEvent, ProgressPhase};
use crate::core::options::EngineOptions;
use crate::core::progress::ProgressSink;
use crate::engine::Extractor;

/// Rendered per progress callback with `--newline`; the `vget|` marker keeps
/// our lines apart from anything else yt-dlp writes to stdout.
const PROGRESS_TEMPLATE: &str = "download:vget|%(progress.status)s|%(progress.downloaded_bytes)s|%(progress.total_bytes)s|%(progress.total_bytes_estimate)s|%(info.filename)s";

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("yt-dlp not found on PATH; install it or put it on PATH")]
    NotFound,
    #[error("{message}")]
    Failed { message: String },
}

/// Extraction backend driving the yt-dlp executable as a child process.
pub struct YtDlp {
    bin: PathBuf,
}

impl YtDlp {
    /// Locates yt-dlp on PATH with a `--version` probe. Done once at
    /// startup, before any URL is processed.
    pub async fn locate() -> anyhow::Result<Self> {
        let bin = if cfg!(target_os = "windows") { "yt-dlp.exe" } else { "yt-dlp" };
        let probe = Command::new(bin)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        match probe {
            Ok(status) if status.success() => Ok(Self { bin: PathBuf::from(bin) }),
            _ => Err(EngineError::NotFound.into()),
        }
    }
}

#[async_trait]
impl Extractor for YtDlp {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn fetch(&self, opts: &EngineOptions, sink: &mut dyn ProgressSink) -> anyhow::Result<()> {
        let mut args = opts.to_args();
        args.extend([
            "--progress".to_string(),
            "--newline".to_string(),
            "--progress-template".to_string(),
            PROGRESS_TEMPLATE.to_string(),
        ]);
        args.push(opts.url.clone());

        tracing::debug!(bin = %self.bin.display(), ?args, "spawning yt-dlp");

        let mut child = Command::new(&self.bin)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn {}", self.bin.display()))?;

        let stdout = child.stdout.take().context("yt-dlp stdout not captured")?;
        let stderr = child.stderr.take().context("yt-dlp stderr not captured")?;

        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::debug!(target: "yt-dlp", "{line}");
                buf.push_str(&line);
                buf.push('\n');
            }
            buf
        });

        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await.context("read yt-dlp output")? {
            match parse_progress_line(&line) {
                Some(event) => sink.on_event(&event),
                None => tracing::trace!(target: "yt-dlp", "{line}"),
            }
        }

        let status = child.wait().await.context("wait for yt-dlp")?;
        let stderr_text = stderr_task.await.unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(EngineError::Failed { message: last_error_line(&stderr_text) }.into())
        }
    }
}

/// Parses one progress-template line into an event. Returns `None` for
/// everything that is not one of our marker lines.
fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let rest = line.trim().strip_prefix("vget|")?;
    let mut fields = rest.splitn(5, '|');
    let status = fields.next()?;
    let downloaded = parse_byte_count(fields.next()?);
    let total = parse_byte_count(fields.next()?);
    let estimate = parse_byte_count(fields.next()?);
    // Last field, so filenames containing '|' survive the split.
    let filename = fields.next().unwrap_or("").to_string();

    let phase = match status {
        "downloading" => ProgressPhase::Downloading,
        "finished" => ProgressPhase::Finished,
        "error" => ProgressPhase::Error,
        _ => return None,
    };

    Some(ProgressEvent {
        phase,
        filename,
        downloaded,
        total: total.or(estimate),
    })
}

/// yt-dlp renders absent numeric fields as "NA" and estimates as floats.
fn parse_byte_count(field: &str) -> Option<u64> {
    let field = field.trim();
    if field.is_empty() || field == "NA" {
        return None;
    }
    field.parse::<f64>().ok().map(|v| v as u64)
}

/// The most useful line of a failed run: the last `ERROR:` line if any,
/// otherwise the last non-empty line.
fn last_error_line(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| stderr.lines().rev().map(str::trim).find(|l| !l.is_empty()))
        .unwrap_or("unknown error")
        .to_string()
}
