//! Configuration for the conversion engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to do when the encoder exits cleanly but an output is unreadable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingOutputPolicy {
    /// Fail the job.
    #[default]
    Fail,
    /// Report the output with size 0.
    ZeroSize,
}

/// Configuration for the ffmpeg-based engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Encoder binary name or path.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Prober binary name or path.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// Extra directories searched for the binaries, before PATH.
    #[serde(default)]
    pub search_dirs: Vec<PathBuf>,

    /// Folder created under the user's video/download directories and the temp root.
    #[serde(default = "default_app_folder")]
    pub app_folder: String,

    /// Root for staging files. Defaults to the system temp directory.
    #[serde(default)]
    pub temp_root: Option<PathBuf>,

    #[serde(default)]
    pub missing_output: MissingOutputPolicy,

    /// Capacity of the event channel handed out by callers that don't bring their own.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Number of trailing encoder log lines attached to a runtime error.
    #[serde(default = "default_log_tail_lines")]
    pub log_tail_lines: usize,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_app_folder() -> String {
    "OptiMux".to_string()
}

fn default_event_buffer() -> usize {
    256
}

fn default_log_tail_lines() -> usize {
    20
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            search_dirs: Vec::new(),
            app_folder: default_app_folder(),
            temp_root: None,
            missing_output: MissingOutputPolicy::default(),
            event_buffer: default_event_buffer(),
            log_tail_lines: default_log_tail_lines(),
        }
    }
}

impl EngineConfig {
    /// Creates a config with custom ffmpeg/ffprobe paths.
    pub fn with_paths(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            ..Default::default()
        }
    }

    pub fn with_temp_root(mut self, temp_root: PathBuf) -> Self {
        self.temp_root = Some(temp_root);
        self
    }

    pub fn with_missing_output(mut self, policy: MissingOutputPolicy) -> Self {
        self.missing_output = policy;
        self
    }

    /// The effective temp root.
    pub fn temp_root(&self) -> PathBuf {
        self.temp_root.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// `<temp root>/<app folder>/Intermediate`, where temp outputs and manifests live.
    pub fn staging_dir(&self) -> PathBuf {
        self.temp_root().join(&self.app_folder).join("Intermediate")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(config.app_folder, "OptiMux");
        assert_eq!(config.missing_output, MissingOutputPolicy::Fail);
    }

    #[test]
    fn test_staging_dir() {
        let config = EngineConfig::default().with_temp_root(PathBuf::from("/scratch"));
        assert_eq!(
            config.staging_dir(),
            PathBuf::from("/scratch/OptiMux/Intermediate")
        );
    }

    #[test]
    fn test_policy_from_toml() {
        let config: EngineConfig = toml::from_str(r#"missing_output = "zero_size""#).unwrap();
        assert_eq!(config.missing_output, MissingOutputPolicy::ZeroSize);
        assert_eq!(config.event_buffer, 256);
    }
}
