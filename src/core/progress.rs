use indicatif::{ProgressBar, ProgressStyle};

use crate::core::model::{ProgressEvent, ProgressPhase};

/// Synchronous observer for engine progress callbacks. One sink is bound
/// per engine invocation.
pub trait ProgressSink: Send {
    fn on_event(&mut self, event: &ProgressEvent);
}

/// Per-file progress state for the duration of one download.
#[derive(Debug)]
pub struct ProgressSession {
    filename: String,
    total: Option<u64>,
    seen: u64,
}

impl ProgressSession {
    pub fn new(filename: impl Into<String>, total: Option<u64>) -> Self {
        Self { filename: filename.into(), total, seen: 0 }
    }

    /// Delta against the last cumulative byte count, clamped at zero.
    /// Engines occasionally report a smaller cumulative value after an
    /// internal retry; that must never render as a negative step.
    pub fn advance(&mut self, downloaded: u64) -> u64 {
        let delta = downloaded.saturating_sub(self.seen);
        self.seen = self.seen.max(downloaded);
        delta
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn seen(&self) -> u64 {
        self.seen
    }
}

/// Renders engine progress as a single live indicator per file.
///
/// Constructed fresh for every engine invocation so no state can leak
/// between files. The session opens on the first `Downloading` event and
/// closes on `Finished`; a conversion step may still run after that and is
/// not tracked here.
pub struct ProgressReporter {
    live: Option<(ProgressSession, ProgressBar)>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self { live: None }
    }

    pub fn in_flight(&self) -> bool {
        self.live.is_some()
    }

    fn open_bar(session: &ProgressSession) -> ProgressBar {
        let pb = match session.total() {
            Some(total) => {
                let pb = ProgressBar::new(total);
                pb.set_style(
                    ProgressStyle::with_template(
                        "{prefix} {bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, eta {eta})",
                    )
                    .unwrap(),
                );
                pb
            }
            None => {
                // Total unknown: show bytes transferred only, no
                // percentage or eta.
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::with_template("{spinner:.green} {prefix} {bytes}")
                        .unwrap()
                        .tick_chars("|/-\\ "),
                );
                pb
            }
        };
        pb.set_prefix(session.filename().to_string());
        pb
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ProgressReporter {
    fn on_event(&mut self, event: &ProgressEvent) {
        match event.phase {
            ProgressPhase::Downloading => {
                if self.live.is_none() {
                    let session = ProgressSession::new(event.filename.clone(), event.total);
                    let bar = Self::open_bar(&session);
                    self.live = Some((session, bar));
                }
                if let Some((session, bar)) = self.live.as_mut() {
                    session.advance(event.downloaded.unwrap_or(0));
                    // seen() is a clamped high-water mark, so the bar can
                    // never move backwards.
                    bar.set_position(session.seen());
                }
            }
            ProgressPhase::Finished => {
                if let Some((_, bar)) = self.live.take() {
                    bar.finish_and_clear();
                    println!("Download completed. Converting...");
                }
            }
            ProgressPhase::Error => {
                if let Some((_, bar)) = self.live.take() {
                    bar.abandon();
                }
            }
        }
    }
}
