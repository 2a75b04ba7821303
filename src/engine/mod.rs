pub mod ytdlp;

use async_trait::async_trait;

use crate::core::options::EngineOptions;
use crate::core::progress::ProgressSink;

/// Boundary to the external extraction engine: resolves the URL, downloads
/// the media, and optionally transcodes it, reporting progress through the
/// sink. One call per URL per attempt.
#[async_trait]
pub trait Extractor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, opts: &EngineOptions, sink: &mut dyn ProgressSink) -> anyhow::Result<()>;
}
