//! Trait definitions for the conversion engine.

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::mpsc;

use super::error::EngineError;
use super::types::{EngineEvent, MediaInfo, ProcessRequest, ProcessResult};

/// Something that can run conversion jobs.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Returns the name of this engine implementation.
    fn name(&self) -> &str;

    /// Runs one job to completion.
    ///
    /// Progress and log events are sent on `events` while the job runs. If the
    /// receiver is dropped the job continues without reporting.
    async fn process(
        &self,
        request: ProcessRequest,
        events: Option<mpsc::Sender<EngineEvent>>,
    ) -> Result<ProcessResult, EngineError>;

    /// Inspects a media file.
    async fn probe(&self, path: &Path) -> Result<MediaInfo, EngineError>;

    /// Checks that the external tools are available.
    async fn validate(&self) -> Result<(), EngineError>;
}
