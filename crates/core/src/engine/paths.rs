//! Output path resolution.

use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use super::config::EngineConfig;
use super::error::EngineError;
use super::types::{DirMode, NameMode, OutputDescriptor};

/// Maps output descriptors to concrete file paths.
#[derive(Debug, Clone)]
pub struct PathResolver {
    videos_root: Option<PathBuf>,
    downloads_root: Option<PathBuf>,
    staging_dir: PathBuf,
    app_folder: String,
}

impl PathResolver {
    /// Builds a resolver over the platform's user directories.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            videos_root: system_video_dir(),
            downloads_root: system_download_dir(),
            staging_dir: config.staging_dir(),
            app_folder: config.app_folder.clone(),
        }
    }

    /// Builds a resolver over explicit roots.
    pub fn with_roots(
        videos_root: Option<PathBuf>,
        downloads_root: Option<PathBuf>,
        staging_dir: PathBuf,
        app_folder: impl Into<String>,
    ) -> Self {
        Self {
            videos_root,
            downloads_root,
            staging_dir,
            app_folder: app_folder.into(),
        }
    }

    /// Resolves the final path of one output and creates its directory.
    ///
    /// `reference` is the first input of the job. Nothing is created on disk
    /// unless both the directory and the file name resolve.
    pub async fn resolve(
        &self,
        output: &OutputDescriptor,
        reference: Option<&Path>,
        job_id: &str,
    ) -> Result<PathBuf, EngineError> {
        let dir = self.resolve_dir(output, reference)?;
        let name = resolve_name(output, reference, job_id)?;
        let file_name = format!("{}{}", name, normalize_extension(&output.extension));

        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            EngineError::path_resolution(
                &output.label,
                format!("cannot create directory {}: {}", dir.display(), e),
            )
        })?;

        let path = dir.join(file_name);
        debug!(label = %output.label, path = %path.display(), "Resolved output path");
        Ok(path)
    }

    fn resolve_dir(
        &self,
        output: &OutputDescriptor,
        reference: Option<&Path>,
    ) -> Result<PathBuf, EngineError> {
        let missing_reference = || {
            EngineError::path_resolution(
                &output.label,
                format!("directory mode {:?} needs an input file", output.dir_type),
            )
        };

        match output.dir_type {
            DirMode::Absolute => {
                if output.custom_dir.is_empty() {
                    return Err(EngineError::path_resolution(
                        &output.label,
                        "absolute directory mode needs a custom directory",
                    ));
                }
                Ok(PathBuf::from(&output.custom_dir))
            }
            DirMode::Relative => {
                let parent = reference.map(parent_dir).ok_or_else(missing_reference)?;
                Ok(parent.join(&output.custom_dir))
            }
            DirMode::Videos => self
                .videos_root
                .as_ref()
                .map(|root| root.join(&self.app_folder))
                .ok_or_else(|| {
                    EngineError::path_resolution(&output.label, "no video directory available")
                }),
            DirMode::Downloads => self
                .downloads_root
                .as_ref()
                .map(|root| root.join(&self.app_folder))
                .ok_or_else(|| {
                    EngineError::path_resolution(&output.label, "no download directory available")
                }),
            DirMode::Temp => Ok(self.staging_dir.clone()),
            DirMode::Same => reference.map(parent_dir).ok_or_else(missing_reference),
        }
    }
}

fn resolve_name(
    output: &OutputDescriptor,
    reference: Option<&Path>,
    job_id: &str,
) -> Result<String, EngineError> {
    match output.name_mode {
        NameMode::Uuid => Ok(Uuid::new_v4().to_string()),
        NameMode::Id => Ok(job_id.to_string()),
        NameMode::Fixed => {
            if output.name_value.is_empty() {
                return Err(EngineError::path_resolution(
                    &output.label,
                    "fixed name mode needs a name value",
                ));
            }
            Ok(output.name_value.clone())
        }
        NameMode::Auto => {
            let stem = reference
                .and_then(|p| p.file_stem())
                .map(|s| s.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    EngineError::path_resolution(
                        &output.label,
                        "name mode Auto needs an input file",
                    )
                })?;
            Ok(format!("{}{}", stem, output.name_value))
        }
    }
}

/// Returns `.ext` for any non-empty extension, with or without a leading dot.
pub fn normalize_extension(extension: &str) -> String {
    if extension.is_empty() || extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{}", extension)
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn system_video_dir() -> Option<PathBuf> {
    dirs::video_dir().or_else(|| {
        let folder = if cfg!(target_os = "macos") {
            "Movies"
        } else {
            "Videos"
        };
        dirs::home_dir().map(|home| home.join(folder))
    })
}

fn system_download_dir() -> Option<PathBuf> {
    dirs::download_dir().or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn resolver(root: &Path) -> PathResolver {
        PathResolver::with_roots(
            Some(root.join("videos")),
            Some(root.join("downloads")),
            root.join("tmp").join("OptiMux").join("Intermediate"),
            "OptiMux",
        )
    }

    #[tokio::test]
    async fn test_extension_normalization_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("clip.mov");
        let resolver = resolver(temp.path());

        let plain = OutputDescriptor::new("main", "mp4").with_name(NameMode::Auto, "_hevc");
        let dotted = OutputDescriptor::new("main", ".mp4").with_name(NameMode::Auto, "_hevc");

        let a = resolver.resolve(&plain, Some(input.as_path()), "job").await.unwrap();
        let b = resolver.resolve(&dotted, Some(input.as_path()), "job").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a, temp.path().join("clip_hevc.mp4"));
    }

    #[tokio::test]
    async fn test_empty_extension() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver(temp.path());
        let output = OutputDescriptor::new("raw", "").with_name(NameMode::Id, "");

        let path = resolver
            .resolve(&output, Some(temp.path().join("a.mov").as_path()), "job-9")
            .await
            .unwrap();
        assert_eq!(path, temp.path().join("job-9"));
    }

    #[tokio::test]
    async fn test_missing_reference_fails_without_creating_dirs() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver(temp.path());

        let cases = [
            OutputDescriptor::new("rel", "mp4")
                .with_dir(DirMode::Relative, "sub")
                .with_name(NameMode::Fixed, "x"),
            OutputDescriptor::new("same", "mp4")
                .with_dir(DirMode::Same, "")
                .with_name(NameMode::Fixed, "x"),
            OutputDescriptor::new("auto", "mp4")
                .with_dir(DirMode::Temp, "")
                .with_name(NameMode::Auto, "_s"),
        ];

        for output in &cases {
            let err = resolver.resolve(output, None, "job").await.unwrap_err();
            assert!(
                matches!(err, EngineError::PathResolution { ref label, .. } if label == &output.label)
            );
        }

        assert!(!temp.path().join("tmp").exists());
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_relative_dir_is_created() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver(temp.path());
        let input = temp.path().join("src").join("clip.mov");
        let output = OutputDescriptor::new("main", "mp4")
            .with_dir(DirMode::Relative, "out/hevc")
            .with_name(NameMode::Fixed, "final");

        let path = resolver.resolve(&output, Some(input.as_path()), "job").await.unwrap();
        assert_eq!(path, temp.path().join("src/out/hevc/final.mp4"));
        assert!(temp.path().join("src/out/hevc").is_dir());
    }

    #[tokio::test]
    async fn test_user_directories_get_app_folder() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver(temp.path());

        let videos = OutputDescriptor::new("v", "mp4")
            .with_dir(DirMode::Videos, "")
            .with_name(NameMode::Id, "");
        let downloads = OutputDescriptor::new("d", "mp4")
            .with_dir(DirMode::Downloads, "")
            .with_name(NameMode::Id, "");

        let v = resolver.resolve(&videos, None, "job").await.unwrap();
        let d = resolver.resolve(&downloads, None, "job").await.unwrap();
        assert_eq!(v, temp.path().join("videos/OptiMux/job.mp4"));
        assert_eq!(d, temp.path().join("downloads/OptiMux/job.mp4"));
    }

    #[tokio::test]
    async fn test_temp_uuid_names_are_unique() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver(temp.path());
        let output = OutputDescriptor::new("chunk", "mov")
            .with_dir(DirMode::Temp, "")
            .with_name(NameMode::Uuid, "");

        let a = resolver.resolve(&output, None, "job").await.unwrap();
        let b = resolver.resolve(&output, None, "job").await.unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with(temp.path().join("tmp/OptiMux/Intermediate")));
        assert_eq!(a.extension().unwrap(), "mov");
    }

    #[tokio::test]
    async fn test_absolute_requires_custom_dir() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver(temp.path());
        let output = OutputDescriptor::new("main", "mp4")
            .with_dir(DirMode::Absolute, "")
            .with_name(NameMode::Fixed, "x");

        assert!(resolver.resolve(&output, None, "job").await.is_err());

        let target = temp.path().join("abs");
        let output = output.with_dir(DirMode::Absolute, target.to_string_lossy());
        let path = resolver.resolve(&output, None, "job").await.unwrap();
        assert_eq!(path, target.join("x.mp4"));
    }

    #[tokio::test]
    async fn test_fixed_requires_value() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver(temp.path());
        let output = OutputDescriptor::new("main", "mp4")
            .with_dir(DirMode::Temp, "")
            .with_name(NameMode::Fixed, "");
        assert!(resolver.resolve(&output, None, "job").await.is_err());
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("mp4"), ".mp4");
        assert_eq!(normalize_extension(".mp4"), ".mp4");
        assert_eq!(normalize_extension(""), "");
    }
}
