use crate::core::model::{DownloadRequest, TimeRange};

/// Unconstrained selector: best muxed pair, or best single stream. Used as
/// the trailing branch of every video selector and as the whole selector on
/// the fallback attempt.
pub const BEST_AVAILABLE: &str = "bestvideo+bestaudio/best";

const AUDIO_SELECTOR: &str = "bestaudio/best";

/// Post-download re-encode requested for audio-only downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioExtract {
    pub codec: String,
    pub bitrate_kbps: u32,
}

/// Translated configuration consumed by the extraction engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub url: String,
    pub format_selector: String,
    pub output_template: String,
    pub audio_extract: Option<AudioExtract>,
    pub trim: Option<TimeRange>,
}

impl EngineOptions {
    pub fn build(req: &DownloadRequest) -> Self {
        let format_selector = if req.audio_only {
            // The quality ceiling applies to video only.
            AUDIO_SELECTOR.to_string()
        } else {
            match req.quality {
                // The ceiling is a soft preference: when no stream of the
                // requested container fits under it, the engine falls back
                // to the best available video+audio pair.
                Some(q) => format!("{}[height<={}]/{}", req.format, q, BEST_AVAILABLE),
                None => format!("{}/{}", req.format, BEST_AVAILABLE),
            }
        };

        let audio_extract = req.audio_only.then(|| AudioExtract {
            codec: req.format.clone(),
            bitrate_kbps: req.audio_bitrate,
        });

        Self {
            url: req.url.clone(),
            format_selector,
            output_template: req
                .output_dir
                .join("%(title)s.%(ext)s")
                .to_string_lossy()
                .into_owned(),
            audio_extract,
            trim: req.range.is_set().then_some(req.range),
        }
    }

    /// Options for the one-shot fallback attempt: the format selector is
    /// replaced with the unconstrained best-available expression. Audio-only
    /// selectors are kept as-is; there is nothing to relax.
    pub fn relaxed(&self) -> Self {
        let mut out = self.clone();
        if out.audio_extract.is_none() {
            out.format_selector = BEST_AVAILABLE.to_string();
        }
        out
    }

    /// Renders the yt-dlp argv for these options, minus the URL and the
    /// progress plumbing (the engine appends those).
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            self.format_selector.clone(),
            "-o".to_string(),
            self.output_template.clone(),
        ];

        if let Some(audio) = &self.audio_extract {
            args.extend([
                "--extract-audio".to_string(),
                "--audio-format".to_string(),
                audio.codec.clone(),
                "--audio-quality".to_string(),
                format!("{}K", audio.bitrate_kbps),
            ]);
        }

        if let Some(range) = &self.trim {
            // Trimming is incompatible with site-optimized extraction, so a
            // range request also forces the generic downloader.
            args.extend([
                "--download-sections".to_string(),
                section_expr(range),
                "--force-generic-extractor".to_string(),
            ]);
        }

        // Blanket leniency flags, independent of the request.
        args.extend(
            [
                "--ignore-errors",
                "--quiet",
                "--no-warnings",
                "--no-color",
                "--geo-bypass",
                "--no-check-certificates",
                "--extractor-args",
                "youtube:skip=dash,hls",
            ]
            .map(str::to_string),
        );

        args
    }
}

/// yt-dlp section syntax: `*START-END`, with `inf` for an open end.
fn section_expr(range: &TimeRange) -> String {
    let start = range.start.map_or_else(|| "0".to_string(), |s| s.to_string());
    let end = range.end.map_or_else(|| "inf".to_string(), |e| e.to_string());
    format!("*{start}-{end}")
}
