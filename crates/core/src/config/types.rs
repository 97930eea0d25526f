use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::engine::{EngineConfig, MissingOutputPolicy};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub files: FilesConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    34115
}

/// Uploads and deletion settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilesConfig {
    /// Upper bound on deletions awaiting confirmation.
    #[serde(default = "default_max_pending_deletions")]
    pub max_pending_deletions: usize,
    /// Subfolder of `<temp root>/<app folder>` receiving uploads.
    #[serde(default = "default_imports_subdir")]
    pub imports_subdir: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            max_pending_deletions: default_max_pending_deletions(),
            imports_subdir: default_imports_subdir(),
        }
    }
}

fn default_max_pending_deletions() -> usize {
    256
}

fn default_imports_subdir() -> String {
    "Imports".to_string()
}

impl Config {
    /// `<temp root>/<app folder>/<imports subdir>`
    pub fn imports_dir(&self) -> PathBuf {
        self.engine
            .temp_root()
            .join(&self.engine.app_folder)
            .join(&self.files.imports_subdir)
    }
}

/// Config as reported by the API.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub engine: SanitizedEngineConfig,
    pub files: FilesConfig,
}

/// Engine settings without the search directories.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedEngineConfig {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub search_dirs_configured: usize,
    pub app_folder: String,
    pub staging_dir: PathBuf,
    pub missing_output: MissingOutputPolicy,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            engine: SanitizedEngineConfig {
                ffmpeg_path: config.engine.ffmpeg_path.clone(),
                ffprobe_path: config.engine.ffprobe_path.clone(),
                search_dirs_configured: config.engine.search_dirs.len(),
                app_folder: config.engine.app_folder.clone(),
                staging_dir: config.engine.staging_dir(),
                missing_output: config.engine.missing_output,
            },
            files: config.files.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 34115);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.engine.app_folder, "OptiMux");
        assert_eq!(config.files.max_pending_deletions, 256);
        assert_eq!(config.files.imports_subdir, "Imports");
    }

    #[test]
    fn test_deserialize_engine_section() {
        let toml = r#"
[engine]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
search_dirs = ["/opt/ffmpeg/bin"]
temp_root = "/scratch"
missing_output = "zero_size"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.engine.ffmpeg_path,
            PathBuf::from("/opt/ffmpeg/bin/ffmpeg")
        );
        assert_eq!(config.engine.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(config.engine.missing_output, MissingOutputPolicy::ZeroSize);
        assert_eq!(
            config.imports_dir(),
            PathBuf::from("/scratch/OptiMux/Imports")
        );
    }

    #[test]
    fn test_sanitized_config() {
        let mut config = Config::default();
        config.engine.search_dirs = vec![PathBuf::from("/a"), PathBuf::from("/b")];
        config.engine.temp_root = Some(PathBuf::from("/scratch"));

        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.engine.search_dirs_configured, 2);
        assert_eq!(
            sanitized.engine.staging_dir,
            PathBuf::from("/scratch/OptiMux/Intermediate")
        );

        let json = serde_json::to_value(&sanitized).unwrap();
        assert!(json["engine"].get("search_dirs").is_none());
        assert_eq!(json["server"]["port"], 34115);
    }
}
