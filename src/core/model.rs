use std::path::PathBuf;

/// Optional sub-range of the media to keep, in whole seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<u64>,
    pub end: Option<u64>,
}

impl TimeRange {
    pub fn is_set(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

/// Everything the engine needs to fetch one URL. Immutable once built,
/// one instance per URL per invocation.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    /// Maximum vertical resolution; honored only when `audio_only` is false.
    pub quality: Option<u32>,
    pub format: String,
    pub audio_only: bool,
    pub audio_bitrate: u32,
    pub output_dir: PathBuf,
    pub range: TimeRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    Downloading,
    Finished,
    Error,
}

/// One progress callback from the engine, emitted per downloaded chunk.
/// Byte counts are cumulative and may be absent when the site does not
/// report a size.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub phase: ProgressPhase,
    pub filename: String,
    pub downloaded: Option<u64>,
    pub total: Option<u64>,
}

/// Terminal state of one URL after the orchestrator is done with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// First attempt saved the media.
    Primary,
    /// Primary attempt failed, the relaxed retry saved the media.
    Alternative,
    /// Both attempts failed; the batch moves on.
    Failed,
}
