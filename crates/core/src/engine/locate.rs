//! Executable discovery.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::error::EngineError;

/// Resolves `program` to an absolute path.
///
/// Paths containing a separator are checked as given. Bare names are looked
/// up in the running executable's directory, its `bin/` subdirectory, the
/// configured `extra_dirs`, then `PATH`, in that order.
pub fn locate_executable(program: &Path, extra_dirs: &[PathBuf]) -> Result<PathBuf, EngineError> {
    let cwd = working_dir(program, std::env::current_dir())?;
    which::which_in(program, Some(search_path(extra_dirs)), cwd).map_err(|e| {
        EngineError::spawn(program.to_string_lossy(), format!("executable not found: {}", e))
    })
}

/// A cwd that cannot be read leaves `program` unresolvable.
fn working_dir(program: &Path, cwd: std::io::Result<PathBuf>) -> Result<PathBuf, EngineError> {
    cwd.map_err(|e| {
        EngineError::spawn(
            program.to_string_lossy(),
            format!("cannot read working directory: {}", e),
        )
    })
}

fn search_path(extra_dirs: &[PathBuf]) -> OsString {
    let mut dirs: Vec<PathBuf> = Vec::new();

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir.join("bin"));
        dirs.insert(0, exe_dir);
    }
    dirs.extend(extra_dirs.iter().cloned());
    if let Some(path) = std::env::var_os("PATH") {
        dirs.extend(std::env::split_paths(&path));
    }

    let mut seen = Vec::with_capacity(dirs.len());
    for dir in dirs {
        if !dir.as_os_str().is_empty() && !seen.contains(&dir) {
            seen.push(dir);
        }
    }

    std::env::join_paths(seen).unwrap_or_default()
}
