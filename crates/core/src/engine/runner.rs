//! Supervised encoder process.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::decode::{drain_log, drain_progress};
use super::error::EngineError;
use super::types::EngineEvent;

/// Runs one encoder invocation and decodes both of its output streams.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
    log_tail_lines: usize,
}

impl ProcessRunner {
    /// `program` should already be resolved to an executable path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            log_tail_lines: 20,
        }
    }

    /// Number of trailing log lines kept for the error of a failed run.
    pub fn with_log_tail(mut self, lines: usize) -> Self {
        self.log_tail_lines = lines;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Runs the encoder to completion.
    ///
    /// Progress is read from stdout and log lines from stderr, each on its
    /// own task. Returns only once the process has exited and both streams
    /// are fully drained. A nonzero exit is a [`EngineError::Runtime`].
    pub async fn run(
        &self,
        args: &[String],
        events: Option<mpsc::Sender<EngineEvent>>,
    ) -> Result<ExitStatus, EngineError> {
        debug!(program = %self.program.display(), ?args, "Spawning encoder");

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EngineError::spawn(self.program.to_string_lossy(), e.to_string()))?;

        let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(stdout), Some(stderr)) => (stdout, stderr),
            _ => {
                let _ = child.kill().await;
                return Err(EngineError::runtime(
                    "encoder output streams could not be opened",
                    None,
                ));
            }
        };

        let progress_task = tokio::spawn(drain_progress(stdout, events.clone()));
        let log_task = tokio::spawn(drain_log(stderr, events, self.log_tail_lines));

        let status = child.wait().await;

        if let Err(e) = progress_task.await {
            warn!("Progress reader task failed: {}", e);
        }
        let tail = match log_task.await {
            Ok(tail) => tail,
            Err(e) => {
                warn!("Log reader task failed: {}", e);
                Vec::new()
            }
        };

        let status = status
            .map_err(|e| EngineError::runtime(format!("failed to wait for encoder: {}", e), None))?;

        if !status.success() {
            let reason = match status.code() {
                Some(code) => format!("encoder exited with code {}", code),
                None => "encoder terminated by signal".to_string(),
            };
            let stderr_tail = if tail.is_empty() {
                None
            } else {
                Some(tail.join("\n"))
            };
            return Err(EngineError::runtime(reason, stderr_tail));
        }

        Ok(status)
    }
}
