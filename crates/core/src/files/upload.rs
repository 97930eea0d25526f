//! Chunked uploads written into the imports directory.

use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::error::FilesError;

/// Writes uploaded chunks to `<dir>/<name>`.
#[derive(Debug, Clone)]
pub struct ChunkWriter {
    dir: PathBuf,
}

impl ChunkWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes one chunk. Offset 0 starts the file over; any other offset appends.
    pub async fn append(&self, name: &str, data: &[u8], offset: u64) -> Result<PathBuf, FilesError> {
        let file_name = sanitize_name(name)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);

        let mut options = OpenOptions::new();
        options.create(true);
        if offset == 0 {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }

        let mut file = options.open(&path).await?;
        file.write_all(data).await?;
        file.flush().await?;

        debug!(path = %path.display(), offset, bytes = data.len(), "Chunk written");
        Ok(path)
    }
}

/// Keeps only the final component of an uploaded name.
fn sanitize_name(name: &str) -> Result<&str, FilesError> {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if base.is_empty() || base == "." || base == ".." {
        return Err(FilesError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(base)
}
