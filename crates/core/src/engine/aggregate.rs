//! Post-run verification of output files.

use std::path::PathBuf;
use tracing::warn;

use super::command::ConcatManifest;
use super::config::MissingOutputPolicy;
use super::error::EngineError;
use super::types::{FileResult, ProcessResult};

/// An output whose path has been resolved, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutput {
    pub label: String,
    pub path: PathBuf,
}

/// Turns resolved outputs into a [`ProcessResult`] after a clean exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAggregator {
    policy: MissingOutputPolicy,
}

impl ResultAggregator {
    pub fn new(policy: MissingOutputPolicy) -> Self {
        Self { policy }
    }

    /// Stats every output and releases the job's concat manifest.
    ///
    /// The manifest is removed whatever the outcome.
    pub async fn finish(
        &self,
        outputs: &[ResolvedOutput],
        manifest: Option<ConcatManifest>,
    ) -> Result<ProcessResult, EngineError> {
        let result = self.verify(outputs).await;
        drop(manifest);
        result
    }

    async fn verify(&self, outputs: &[ResolvedOutput]) -> Result<ProcessResult, EngineError> {
        let mut files = Vec::with_capacity(outputs.len());

        for output in outputs {
            let size = match tokio::fs::metadata(&output.path).await {
                Ok(meta) => meta.len(),
                Err(source) => match self.policy {
                    MissingOutputPolicy::Fail => {
                        return Err(EngineError::OutputVerification {
                            label: output.label.clone(),
                            path: output.path.clone(),
                            source,
                        });
                    }
                    MissingOutputPolicy::ZeroSize => {
                        warn!(
                            label = %output.label,
                            path = %output.path.display(),
                            "Output not readable, reporting size 0: {}",
                            source
                        );
                        0
                    }
                },
            };

            files.push(FileResult {
                label: output.label.clone(),
                path: output.path.clone(),
                size,
            });
        }

        Ok(ProcessResult { files })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn outputs(temp: &TempDir) -> Vec<ResolvedOutput> {
        std::fs::write(temp.path().join("main.mp4"), vec![0u8; 128]).unwrap();
        vec![
            ResolvedOutput {
                label: "main".to_string(),
                path: temp.path().join("main.mp4"),
            },
            ResolvedOutput {
                label: "proxy".to_string(),
                path: temp.path().join("proxy.mov"),
            },
        ]
    }

    #[tokio::test]
    async fn test_fail_policy_rejects_missing_output() {
        let temp = TempDir::new().unwrap();
        let err = ResultAggregator::new(MissingOutputPolicy::Fail)
            .finish(&outputs(&temp), None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::OutputVerification { ref label, .. } if label == "proxy"));
    }

    #[tokio::test]
    async fn test_zero_size_policy_keeps_order() {
        let temp = TempDir::new().unwrap();
        let result = ResultAggregator::new(MissingOutputPolicy::ZeroSize)
            .finish(&outputs(&temp), None)
            .await
            .unwrap();

        let labels: Vec<_> = result.files.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["main", "proxy"]);
        assert_eq!(result.files[0].size, 128);
        assert_eq!(result.files[1].size, 0);
    }

    #[tokio::test]
    async fn test_manifest_removed_on_failure() {
        let temp = TempDir::new().unwrap();
        let manifest = ConcatManifest::write(temp.path(), &[PathBuf::from("/clips/a.mov")])
            .await
            .unwrap();
        let manifest_path = manifest.path().to_path_buf();

        let result = ResultAggregator::new(MissingOutputPolicy::Fail)
            .finish(&outputs(&temp), Some(manifest))
            .await;

        assert!(result.is_err());
        assert!(!manifest_path.exists());
    }
}
