use async_trait::async_trait;

/// Receives progress updates from the pipeline.
///
/// Progress is advisory: implementations log and swallow their own failures
/// rather than aborting the stage that reported.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn report(&self, progress: u8);
}

/// Sink for callers that do not track progress.
pub struct NoopProgress;

#[async_trait]
impl ProgressSink for NoopProgress {
    async fn report(&self, _progress: u8) {}
}
