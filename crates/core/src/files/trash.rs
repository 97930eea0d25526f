//! Moving files to the platform trash.

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::info;

use super::error::FilesError;

/// Moves a file to the user's trash.
#[async_trait]
pub trait TrashMover: Send + Sync {
    /// Name of the mechanism, for logging.
    fn name(&self) -> &'static str;

    /// Moves `path` (absolute) to the trash.
    async fn move_to_trash(&self, path: &Path) -> Result<(), FilesError>;
}

/// macOS: asks Finder to delete the file.
#[derive(Debug, Default, Clone, Copy)]
pub struct FinderTrash;

/// Windows: `Microsoft.VisualBasic.FileIO.FileSystem.DeleteFile` with `SendToRecycleBin`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecycleBinTrash;

/// Linux: `gio trash`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GioTrash;

/// Platforms without a supported trash.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedTrash;

/// Picks the implementation for the current platform.
pub fn platform_trash_mover() -> Box<dyn TrashMover> {
    if cfg!(target_os = "macos") {
        Box::new(FinderTrash)
    } else if cfg!(target_os = "windows") {
        Box::new(RecycleBinTrash)
    } else if cfg!(target_os = "linux") {
        Box::new(GioTrash)
    } else {
        Box::new(UnsupportedTrash)
    }
}

async fn run_trash_command(path: &Path, command: &mut Command) -> Result<(), FilesError> {
    let output = command
        .output()
        .await
        .map_err(|e| FilesError::trash(path, e.to_string()))?;

    if output.status.success() {
        info!(path = %path.display(), "Moved to trash");
        Ok(())
    } else {
        Err(FilesError::trash(
            path,
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ))
    }
}

#[async_trait]
impl TrashMover for FinderTrash {
    fn name(&self) -> &'static str {
        "finder"
    }

    async fn move_to_trash(&self, path: &Path) -> Result<(), FilesError> {
        let script = format!(
            r#"tell application "Finder" to delete POSIX file "{}""#,
            applescript_escape(&path.to_string_lossy())
        );
        run_trash_command(path, Command::new("osascript").args(["-e", &script])).await
    }
}

#[async_trait]
impl TrashMover for RecycleBinTrash {
    fn name(&self) -> &'static str {
        "recycle_bin"
    }

    async fn move_to_trash(&self, path: &Path) -> Result<(), FilesError> {
        let script = format!(
            "Add-Type -AssemblyName Microsoft.VisualBasic; \
             [Microsoft.VisualBasic.FileIO.FileSystem]::DeleteFile('{}', 'OnlyErrorDialogs', 'SendToRecycleBin')",
            path.to_string_lossy().replace('\'', "''")
        );
        run_trash_command(
            path,
            Command::new("powershell").args(["-NoProfile", "-Command", &script]),
        )
        .await
    }
}

#[async_trait]
impl TrashMover for GioTrash {
    fn name(&self) -> &'static str {
        "gio"
    }

    async fn move_to_trash(&self, path: &Path) -> Result<(), FilesError> {
        let gio = which::which("gio").map_err(|_| FilesError::trash(path, "gio not found"))?;
        run_trash_command(path, Command::new(gio).arg("trash").arg(path)).await
    }
}

#[async_trait]
impl TrashMover for UnsupportedTrash {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    async fn move_to_trash(&self, _path: &Path) -> Result<(), FilesError> {
        Err(FilesError::Unsupported)
    }
}

fn applescript_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
