pub mod config;
pub mod engine;
pub mod files;
pub mod testing;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, FilesConfig, SanitizedConfig, ServerConfig,
};
pub use engine::{
    Engine, EngineConfig, EngineError, EngineEvent, FfmpegEngine, FileResult, InputDescriptor,
    MediaInfo, MissingOutputPolicy, OutputDescriptor, ProcessRequest, ProcessResult,
    ProgressSnapshot,
};
pub use files::{platform_trash_mover, ChunkWriter, DeletionRegistry, FilesError, TrashMover};
