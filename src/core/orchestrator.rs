use std::sync::Arc;

use crate::core::model::{DownloadRequest, Outcome};
use crate::core::options::EngineOptions;
use crate::core::progress::ProgressReporter;
use crate::engine::Extractor;

/// Drives the engine once per URL, strictly sequentially. A failed primary
/// attempt gets exactly one relaxed retry; a URL that fails both attempts
/// never aborts the batch.
pub struct Orchestrator {
    engine: Arc<dyn Extractor>,
}

impl Orchestrator {
    pub fn new(engine: Arc<dyn Extractor>) -> Self {
        Self { engine }
    }

    pub async fn run(&self, requests: &[DownloadRequest]) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for req in requests {
            outcomes.push(self.download_one(req).await);
        }
        outcomes
    }

    async fn download_one(&self, req: &DownloadRequest) -> Outcome {
        let opts = EngineOptions::build(req);
        let out_dir = req.output_dir.display().to_string();

        tracing::info!(url = %req.url, engine = self.engine.name(), "starting download");

        // Fresh reporter per attempt: no progress state survives a file.
        let mut reporter = ProgressReporter::new();
        match self.engine.fetch(&opts, &mut reporter).await {
            Ok(()) => {
                println!("Media saved in {out_dir}");
                return Outcome::Primary;
            }
            Err(e) => {
                println!("An error occurred: {e:#}");
                println!("Trying alternative method...");
            }
        }

        let relaxed = opts.relaxed();
        let mut reporter = ProgressReporter::new();
        match self.engine.fetch(&relaxed, &mut reporter).await {
            Ok(()) => {
                println!("Media saved in {out_dir} using alternative method");
                Outcome::Alternative
            }
            Err(e) => {
                println!("Alternative method also failed: {e:#}");
                println!("Please try updating yt-dlp or check if the video is available in your region.");
                Outcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::TimeRange;
    use crate::core::options::BEST_AVAILABLE;
    use crate::core::progress::ProgressSink;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Engine double that replays a scripted result per call and records
    /// the format selector each call was made with.
    struct Scripted {
        results: Mutex<VecDeque<Result<(), String>>>,
        selectors: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(results: Vec<Result<(), String>>) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results.into()),
                selectors: Mutex::new(Vec::new()),
            })
        }

        fn selectors(&self) -> Vec<String> {
            self.selectors.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Extractor for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn fetch(
            &self,
            opts: &EngineOptions,
            _sink: &mut dyn ProgressSink,
        ) -> anyhow::Result<()> {
            self.selectors.lock().unwrap().push(opts.format_selector.clone());
            match self.results.lock().unwrap().pop_front() {
                Some(Ok(())) => Ok(()),
                Some(Err(msg)) => Err(anyhow::anyhow!(msg)),
                None => panic!("unexpected extra engine call"),
            }
        }
    }

    fn request(url: &str) -> DownloadRequest {
        DownloadRequest {
            url: url.to_string(),
            quality: Some(1080),
            format: "mp4".to_string(),
            audio_only: false,
            audio_bitrate: 192,
            output_dir: PathBuf::from("/tmp/out"),
            range: TimeRange::default(),
        }
    }

    #[tokio::test]
    async fn primary_success_needs_no_fallback() {
        let engine = Scripted::new(vec![Ok(())]);
        let orchestrator = Orchestrator::new(engine.clone());

        let outcomes = orchestrator.run(&[request("a.url")]).await;

        assert_eq!(outcomes, vec![Outcome::Primary]);
        assert_eq!(engine.selectors().len(), 1);
    }

    #[tokio::test]
    async fn fallback_retries_with_the_unconstrained_selector() {
        let engine = Scripted::new(vec![Err("format unavailable".to_string()), Ok(())]);
        let orchestrator = Orchestrator::new(engine.clone());

        let outcomes = orchestrator.run(&[request("a.url")]).await;

        assert_eq!(outcomes, vec![Outcome::Alternative]);
        let selectors = engine.selectors();
        assert_eq!(selectors.len(), 2);
        assert_eq!(selectors[1], BEST_AVAILABLE);
    }

    #[tokio::test]
    async fn double_failure_is_terminal_for_that_url_only() {
        let engine = Scripted::new(vec![
            Err("primary down".to_string()),
            Err("fallback down".to_string()),
            Ok(()),
        ]);
        let orchestrator = Orchestrator::new(engine.clone());

        let outcomes = orchestrator.run(&[request("a.url"), request("b.url")]).await;

        // Both attempts for the first URL, then the batch moves on.
        assert_eq!(outcomes, vec![Outcome::Failed, Outcome::Primary]);
        assert_eq!(engine.selectors().len(), 3);
    }

    #[tokio::test]
    async fn batch_of_three_with_middle_url_recovering() {
        let engine = Scripted::new(vec![
            Ok(()),
            Err("transient".to_string()),
            Ok(()),
            Ok(()),
        ]);
        let orchestrator = Orchestrator::new(engine.clone());

        let outcomes = orchestrator
            .run(&[request("1.url"), request("2.url"), request("3.url")])
            .await;

        assert_eq!(
            outcomes,
            vec![Outcome::Primary, Outcome::Alternative, Outcome::Primary]
        );
    }

    #[tokio::test]
    async fn audio_only_fallback_keeps_the_audio_selector() {
        let engine = Scripted::new(vec![Err("boom".to_string()), Ok(())]);
        let orchestrator = Orchestrator::new(engine.clone());

        let mut req = request("a.url");
        req.audio_only = true;
        req.format = "mp3".to_string();

        let outcomes = orchestrator.run(&[req]).await;

        assert_eq!(outcomes, vec![Outcome::Alternative]);
        let selectors = engine.selectors();
        assert_eq!(selectors[0], selectors[1]);
        assert_eq!(selectors[1], "bestaudio/best");
    }
}
