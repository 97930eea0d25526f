//! Types for the conversion engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the source files of a job are fed to the encoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// A single source file (only the first path is used).
    #[default]
    Single,
    /// Several files joined through the concat demuxer.
    Concat,
}

/// Source files for a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDescriptor {
    #[serde(default)]
    pub mode: InputMode,
    #[serde(default)]
    pub paths: Vec<PathBuf>,
}

impl InputDescriptor {
    /// A single-file input.
    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self {
            mode: InputMode::Single,
            paths: vec![path.into()],
        }
    }

    /// A concatenated input built from the given paths, in order.
    pub fn concat<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            mode: InputMode::Concat,
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// The input that directory and name derivation refer to.
    pub fn reference(&self) -> Option<&PathBuf> {
        self.paths.first()
    }
}

/// Where an output file is placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirMode {
    /// `custom_dir` taken literally.
    Absolute,
    /// `custom_dir` joined under the reference input's directory.
    Relative,
    /// The user's video directory plus the application folder.
    #[serde(alias = "video")]
    Videos,
    /// The user's download directory plus the application folder.
    Downloads,
    /// The intermediate staging folder under the system temp root.
    Temp,
    /// The reference input's directory.
    #[default]
    Same,
}

impl DirMode {
    /// Whether this mode needs a reference input to resolve.
    pub fn needs_reference(&self) -> bool {
        matches!(self, Self::Relative | Self::Same)
    }
}

/// How an output file is named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMode {
    /// A freshly generated UUID.
    Uuid,
    /// The job id verbatim.
    Id,
    /// `name_value` taken literally.
    Fixed,
    /// Reference input stem followed by `name_value` as a suffix.
    #[default]
    Auto,
}

impl NameMode {
    /// Whether this mode needs a reference input to resolve.
    pub fn needs_reference(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

/// One output of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputDescriptor {
    /// Opaque identifier echoed back in the result.
    pub label: String,
    #[serde(default)]
    pub dir_type: DirMode,
    #[serde(default)]
    pub custom_dir: String,
    #[serde(default)]
    pub name_mode: NameMode,
    #[serde(default)]
    pub name_value: String,
    #[serde(default)]
    pub extension: String,
    /// Encoder options placed right before this output's path.
    #[serde(default, alias = "ffmpegOptions")]
    pub options: Vec<String>,
}

impl OutputDescriptor {
    /// An output placed next to the input, named `<stem><suffix>.<extension>`.
    pub fn new(label: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            extension: extension.into(),
            ..Default::default()
        }
    }

    pub fn with_dir(mut self, dir_type: DirMode, custom_dir: impl Into<String>) -> Self {
        self.dir_type = dir_type;
        self.custom_dir = custom_dir.into();
        self
    }

    pub fn with_name(mut self, name_mode: NameMode, name_value: impl Into<String>) -> Self {
        self.name_mode = name_mode;
        self.name_value = name_value.into();
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// A complete conversion request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    #[serde(alias = "fileId")]
    pub job_id: String,
    pub input: InputDescriptor,
    /// Encoder options applied before any output.
    #[serde(default)]
    pub global_options: Vec<String>,
    pub outputs: Vec<OutputDescriptor>,
}

/// Point-in-time progress reported by the encoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    /// Cumulative encoded time in seconds.
    pub time_sec: f64,
    /// Cumulative output size in bytes.
    pub size: u64,
}

/// Event delivered to the consumer while a job runs.
///
/// The two variants come from independent readers; their relative order is
/// not meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    Progress(ProgressSnapshot),
    Log { line: String },
}

/// A verified output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    pub label: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Result of a job: one entry per output, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessResult {
    pub files: Vec<FileResult>,
}

impl ProcessResult {
    /// Looks up a file by its label.
    pub fn get(&self, label: &str) -> Option<&FileResult> {
        self.files.iter().find(|f| f.label == label)
    }
}

/// Basic information about a media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfo {
    pub path: PathBuf,
    pub size: u64,
    pub has_video: bool,
    pub has_audio: bool,
    /// Duration in seconds (0.0 when unknown).
    pub duration: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_request_camel_case() {
        let json = r#"{
            "fileId": "job-1",
            "input": { "mode": "single", "paths": ["/media/in.mov"] },
            "globalOptions": ["-filter_complex", "[0:v]split=2[a][b]"],
            "outputs": [{
                "label": "main",
                "dirType": "video",
                "customDir": "",
                "nameMode": "auto",
                "nameValue": "_60x",
                "extension": "mp4",
                "ffmpegOptions": ["-map", "[a]"]
            }]
        }"#;

        let request: ProcessRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.job_id, "job-1");
        assert_eq!(request.input.mode, InputMode::Single);
        assert_eq!(request.global_options.len(), 2);
        assert_eq!(request.outputs[0].dir_type, DirMode::Videos);
        assert_eq!(request.outputs[0].name_mode, NameMode::Auto);
        assert_eq!(request.outputs[0].options, vec!["-map", "[a]"]);
    }

    #[test]
    fn test_output_defaults() {
        let json = r#"{ "label": "main" }"#;
        let output: OutputDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(output.dir_type, DirMode::Same);
        assert_eq!(output.name_mode, NameMode::Auto);
        assert!(output.options.is_empty());
    }

    #[test]
    fn test_result_serializes_as_list() {
        let result = ProcessResult {
            files: vec![FileResult {
                label: "main".to_string(),
                path: PathBuf::from("/out/a.mp4"),
                size: 42,
            }],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["label"], "main");
        assert_eq!(json[0]["size"], 42);
    }

    #[test]
    fn test_progress_event_shape() {
        let event = EngineEvent::Progress(ProgressSnapshot {
            time_sec: 1.5,
            size: 2048,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["timeSec"], 1.5);
        assert_eq!(json["size"], 2048);
    }
}
