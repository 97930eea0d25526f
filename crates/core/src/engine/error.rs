//! Error types for the conversion engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running a conversion job.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The request itself is unusable.
    #[error("Invalid request: {reason}")]
    Input { reason: String },

    /// An output path could not be resolved.
    #[error("Cannot resolve output '{label}': {reason}")]
    PathResolution { label: String, reason: String },

    /// The encoder could not be found or started.
    #[error("Failed to start {program}: {reason}")]
    Spawn { program: String, reason: String },

    /// The encoder ran but did not succeed.
    #[error("Conversion failed: {reason}")]
    Runtime {
        reason: String,
        stderr_tail: Option<String>,
    },

    /// A declared output is missing after a successful exit.
    #[error("Output '{label}' not readable at {path}: {source}")]
    OutputVerification {
        label: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse ffprobe output.
    #[error("Failed to parse media info: {reason}")]
    Parse { reason: String },

    /// I/O error outside the encoder process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn input(reason: impl Into<String>) -> Self {
        Self::Input {
            reason: reason.into(),
        }
    }

    pub fn path_resolution(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PathResolution {
            label: label.into(),
            reason: reason.into(),
        }
    }

    pub fn spawn(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Spawn {
            program: program.into(),
            reason: reason.into(),
        }
    }

    pub fn runtime(reason: impl Into<String>, stderr_tail: Option<String>) -> Self {
        Self::Runtime {
            reason: reason.into(),
            stderr_tail,
        }
    }

    /// Stable machine-readable name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Input { .. } => "input",
            Self::PathResolution { .. } => "path_resolution",
            Self::Spawn { .. } => "spawn",
            Self::Runtime { .. } => "runtime",
            Self::OutputVerification { .. } => "output_verification",
            Self::Parse { .. } => "parse",
            Self::Io(_) => "io",
        }
    }

    /// Whether the caller's request was at fault rather than the environment.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Input { .. } | Self::PathResolution { .. })
    }
}
