//! FFmpeg-based engine implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::aggregate::{ResolvedOutput, ResultAggregator};
use super::command::{prepare_input, CommandBuilder};
use super::config::EngineConfig;
use super::error::EngineError;
use super::locate::locate_executable;
use super::paths::PathResolver;
use super::runner::ProcessRunner;
use super::traits::Engine;
use super::types::{EngineEvent, MediaInfo, ProcessRequest, ProcessResult};

/// FFmpeg-based engine implementation.
pub struct FfmpegEngine {
    config: EngineConfig,
    resolver: PathResolver,
}

impl FfmpegEngine {
    /// Creates an engine resolving user directories from the platform.
    pub fn new(config: EngineConfig) -> Self {
        let resolver = PathResolver::from_config(&config);
        Self { config, resolver }
    }

    /// Creates an engine with an explicit path resolver.
    pub fn with_resolver(config: EngineConfig, resolver: PathResolver) -> Self {
        Self { config, resolver }
    }

    /// Creates an engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rejects requests that cannot produce a valid invocation.
    pub fn validate_request(request: &ProcessRequest) -> Result<(), EngineError> {
        if request.job_id.trim().is_empty() {
            return Err(EngineError::input("job id is empty"));
        }
        if request.input.paths.is_empty() {
            return Err(EngineError::input("input has no paths"));
        }
        if request.outputs.is_empty() {
            return Err(EngineError::input("request has no outputs"));
        }
        Ok(())
    }

    async fn run_job(
        &self,
        request: &ProcessRequest,
        events: Option<mpsc::Sender<EngineEvent>>,
    ) -> Result<ProcessResult, EngineError> {
        Self::validate_request(request)?;

        let program = locate_executable(&self.config.ffmpeg_path, &self.config.search_dirs)?;

        // Held until the aggregator releases it; any early return drops it too.
        let (input_path, manifest) =
            prepare_input(&request.input, &self.config.staging_dir()).await?;

        let reference = request.input.reference().map(PathBuf::as_path);
        let mut resolved = Vec::with_capacity(request.outputs.len());
        for output in &request.outputs {
            let path = self
                .resolver
                .resolve(output, reference, &request.job_id)
                .await?;
            resolved.push(ResolvedOutput {
                label: output.label.clone(),
                path,
            });
        }

        let args = request
            .outputs
            .iter()
            .zip(&resolved)
            .fold(
                CommandBuilder::new(request.input.mode, &input_path)
                    .global_options(&request.global_options),
                |builder, (output, target)| builder.output(&output.options, &target.path),
            )
            .build();

        ProcessRunner::new(program)
            .with_log_tail(self.config.log_tail_lines)
            .run(&args, events)
            .await?;

        ResultAggregator::new(self.config.missing_output)
            .finish(&resolved, manifest)
            .await
    }

    /// Parses ffprobe JSON output into MediaInfo.
    fn parse_probe_output(path: &Path, size: u64, output: &str) -> Result<MediaInfo, EngineError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            #[serde(default)]
            format: ProbeFormat,
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize, Default)]
        struct ProbeFormat {
            duration: Option<String>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            codec_type: String,
        }

        let probe: ProbeOutput = serde_json::from_str(output).map_err(|e| EngineError::Parse {
            reason: format!("Failed to parse ffprobe output: {}", e),
        })?;

        let duration = probe
            .format
            .duration
            .as_ref()
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        Ok(MediaInfo {
            path: path.to_path_buf(),
            size,
            has_video: probe.streams.iter().any(|s| s.codec_type == "video"),
            has_audio: probe.streams.iter().any(|s| s.codec_type == "audio"),
            duration,
        })
    }
}

#[async_trait]
impl Engine for FfmpegEngine {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn process(
        &self,
        request: ProcessRequest,
        events: Option<mpsc::Sender<EngineEvent>>,
    ) -> Result<ProcessResult, EngineError> {
        let start = Instant::now();
        info!(
            job_id = %request.job_id,
            mode = ?request.input.mode,
            inputs = request.input.paths.len(),
            outputs = request.outputs.len(),
            "Starting job"
        );

        let result = self.run_job(&request, events).await;

        match &result {
            Ok(files) => info!(
                job_id = %request.job_id,
                files = files.files.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Job completed"
            ),
            Err(e) => warn!(
                job_id = %request.job_id,
                kind = e.kind(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Job failed: {}",
                e
            ),
        }
        result
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, EngineError> {
        let meta = tokio::fs::metadata(path).await.map_err(|e| {
            EngineError::input(format!("cannot read {}: {}", path.display(), e))
        })?;

        let ffprobe = locate_executable(&self.config.ffprobe_path, &self.config.search_dirs)?;
        let output = Command::new(&ffprobe)
            .args(["-v", "error", "-show_streams", "-show_format", "-of", "json"])
            .arg(path)
            .output()
            .await
            .map_err(|e| EngineError::spawn(ffprobe.to_string_lossy(), e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(EngineError::runtime(
                format!("ffprobe failed on {}", path.display()),
                (!stderr.is_empty()).then_some(stderr),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_probe_output(path, meta.len(), &stdout)
    }

    async fn validate(&self) -> Result<(), EngineError> {
        locate_executable(&self.config.ffmpeg_path, &self.config.search_dirs)?;
        locate_executable(&self.config.ffprobe_path, &self.config.search_dirs)?;
        tokio::fs::create_dir_all(self.config.staging_dir()).await?;
        Ok(())
    }
}
