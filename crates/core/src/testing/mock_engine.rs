//! Mock engine for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

use crate::engine::{
    Engine, EngineError, EngineEvent, FileResult, MediaInfo, ProcessRequest, ProcessResult,
};

/// Mock implementation of the Engine trait.
///
/// Records every submitted request and replays scripted events. Unless an
/// error is queued, each output yields `/mock/<job_id>/<label>.<ext>` with
/// a fixed size.
///
/// ```rust,ignore
/// use optimux_core::testing::MockEngine;
///
/// let engine = MockEngine::new();
/// engine.set_events(vec![EngineEvent::Log { line: "frame=1".into() }]).await;
/// let result = engine.process(request, Some(tx)).await?;
/// assert_eq!(engine.request_count().await, 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockEngine {
    requests: Arc<RwLock<Vec<ProcessRequest>>>,
    events: Arc<RwLock<Vec<EngineEvent>>>,
    next_error: Arc<RwLock<Option<EngineError>>>,
    probe_results: Arc<RwLock<HashMap<PathBuf, MediaInfo>>>,
    output_size: Arc<RwLock<u64>>,
    delay: Arc<RwLock<Duration>>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            events: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            probe_results: Arc::new(RwLock::new(HashMap::new())),
            output_size: Arc::new(RwLock::new(1024)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// All requests submitted so far.
    pub async fn recorded_requests(&self) -> Vec<ProcessRequest> {
        self.requests.read().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Events sent to the caller during every `process` call.
    pub async fn set_events(&self, events: Vec<EngineEvent>) {
        *self.events.write().await = events;
    }

    /// Makes the next `process` or `probe` fail with `error`.
    pub async fn set_next_error(&self, error: EngineError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn set_probe_result(&self, path: impl AsRef<Path>, info: MediaInfo) {
        self.probe_results
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), info);
    }

    pub async fn set_output_size(&self, size: u64) {
        *self.output_size.write().await = size;
    }

    /// Simulated job duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    async fn take_error(&self) -> Option<EngineError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl Engine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn process(
        &self,
        request: ProcessRequest,
        events: Option<mpsc::Sender<EngineEvent>>,
    ) -> Result<ProcessResult, EngineError> {
        self.requests.write().await.push(request.clone());

        if let Some(tx) = events {
            for event in self.events.read().await.iter().cloned() {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        }

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.take_error().await {
            return Err(error);
        }

        let size = *self.output_size.read().await;
        Ok(ProcessResult {
            files: request
                .outputs
                .iter()
                .map(|output| FileResult {
                    label: output.label.clone(),
                    path: PathBuf::from(format!(
                        "/mock/{}/{}.{}",
                        request.job_id,
                        output.label,
                        output.extension.trim_start_matches('.')
                    )),
                    size,
                })
                .collect(),
        })
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, EngineError> {
        if let Some(error) = self.take_error().await {
            return Err(error);
        }

        Ok(self
            .probe_results
            .read()
            .await
            .get(path)
            .cloned()
            .unwrap_or_else(|| MediaInfo {
                path: path.to_path_buf(),
                size: 0,
                has_video: true,
                has_audio: true,
                duration: 60.0,
            }))
    }

    async fn validate(&self) -> Result<(), EngineError> {
        Ok(())
    }
}
