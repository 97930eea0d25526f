//! Encoder argument construction and the concat manifest.

use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::EngineError;
use super::types::{InputDescriptor, InputMode};

/// Flags selecting the concat demuxer with absolute/relative paths allowed.
const CONCAT_DEMUXER_ARGS: [&str; 4] = ["-f", "concat", "-safe", "0"];

/// Flags routing progress to stdout and silencing the stderr status line.
const PROGRESS_ARGS: [&str; 3] = ["-progress", "pipe:1", "-nostats"];

/// Builds the ordered argument list for one encoder run.
#[derive(Debug, Default)]
pub struct CommandBuilder {
    args: Vec<String>,
}

impl CommandBuilder {
    /// Starts the argument list with the input.
    ///
    /// In concat mode `input_path` is the manifest, otherwise the source file.
    pub fn new(mode: InputMode, input_path: &Path) -> Self {
        let mut args = Vec::new();
        if mode == InputMode::Concat {
            args.extend(CONCAT_DEMUXER_ARGS.iter().map(|s| s.to_string()));
        }
        args.extend(["-i".to_string(), input_path.to_string_lossy().to_string()]);
        Self { args }
    }

    /// Options applied before any output.
    pub fn global_options(mut self, options: &[String]) -> Self {
        self.args.extend(options.iter().cloned());
        self
    }

    /// One output: its own options followed by its path.
    pub fn output(mut self, options: &[String], path: &Path) -> Self {
        self.args.extend(options.iter().cloned());
        self.args.push(path.to_string_lossy().to_string());
        self
    }

    /// Appends the progress flags and returns the final list.
    pub fn build(mut self) -> Vec<String> {
        self.args.extend(PROGRESS_ARGS.iter().map(|s| s.to_string()));
        self.args
    }
}

/// A concat manifest on disk, removed when dropped.
#[derive(Debug)]
pub struct ConcatManifest {
    path: PathBuf,
}

impl ConcatManifest {
    /// Writes a manifest listing `sources` in order into `dir`.
    ///
    /// The concat demuxer resolves relative entries against the manifest's
    /// own directory, so sources are made absolute against the process cwd.
    pub async fn write(dir: &Path, sources: &[PathBuf]) -> Result<Self, EngineError> {
        if sources.is_empty() {
            return Err(EngineError::input("concat input needs at least one path"));
        }
        let sources = sources
            .iter()
            .map(std::path::absolute)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| EngineError::input(format!("cannot resolve concat source: {}", e)))?;

        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(format!("concat_{}.txt", Uuid::new_v4()));
        // From here on, drop cleans up even a partially written file.
        let manifest = Self { path };

        let mut file = tokio::fs::File::create(&manifest.path).await?;
        file.write_all(render_manifest(&sources).as_bytes()).await?;
        file.flush().await?;

        debug!(path = %manifest.path.display(), entries = sources.len(), "Wrote concat manifest");
        Ok(manifest)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ConcatManifest {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed concat manifest"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove concat manifest {}: {}", self.path.display(), e),
        }
    }
}

/// One `file '<path>'` line per source; embedded quotes use the `'\''` form.
pub fn render_manifest(sources: &[PathBuf]) -> String {
    sources
        .iter()
        .map(|p| {
            let escaped = p.to_string_lossy().replace('\'', r"'\''");
            format!("file '{}'\n", escaped)
        })
        .collect()
}

/// The single path handed to `-i`, plus the manifest guard in concat mode.
pub async fn prepare_input(
    input: &InputDescriptor,
    staging_dir: &Path,
) -> Result<(PathBuf, Option<ConcatManifest>), EngineError> {
    match input.mode {
        InputMode::Single => {
            let path = input
                .paths
                .first()
                .ok_or_else(|| EngineError::input("single input needs a path"))?;
            Ok((path.clone(), None))
        }
        InputMode::Concat => {
            let manifest = ConcatManifest::write(staging_dir, &input.paths).await?;
            Ok((manifest.path().to_path_buf(), Some(manifest)))
        }
    }
}
