//! Conversion engine: turns a [`ProcessRequest`] into one supervised ffmpeg run.
//!
//! A job goes through these steps:
//!
//! - the request is validated and the encoder binary located
//! - for concat input, a manifest listing the sources is written
//! - every output's directory and file name are resolved
//! - the argument list is built and ffmpeg is spawned
//! - stdout (`-progress pipe:1`) and stderr are decoded concurrently,
//!   feeding [`EngineEvent`]s to the caller
//! - the outputs are stat'ed and returned in submission order
//!
//! The concat manifest is removed on every path, including failures before
//! the process starts.
//!
//! # Example
//!
//! ```ignore
//! use optimux_core::engine::{
//!     Engine, FfmpegEngine, InputDescriptor, NameMode, OutputDescriptor, ProcessRequest,
//! };
//!
//! let engine = FfmpegEngine::with_defaults();
//! let (tx, mut rx) = tokio::sync::mpsc::channel(64);
//!
//! let request = ProcessRequest {
//!     job_id: "job-1".to_string(),
//!     input: InputDescriptor::single("/media/clip.mov"),
//!     global_options: vec![],
//!     outputs: vec![OutputDescriptor::new("main", "mp4")
//!         .with_name(NameMode::Auto, "_hevc")
//!         .with_options(["-c:v", "libx265", "-crf", "23"])],
//! };
//!
//! tokio::spawn(async move {
//!     while let Some(event) = rx.recv().await {
//!         println!("{:?}", event);
//!     }
//! });
//!
//! let result = engine.process(request, Some(tx)).await?;
//! println!("{} bytes", result.files[0].size);
//! ```

mod aggregate;
mod command;
mod config;
mod decode;
mod error;
mod ffmpeg;
mod locate;
mod paths;
mod runner;
mod splitter;
mod traits;
mod types;

pub use aggregate::{ResolvedOutput, ResultAggregator};
pub use command::{prepare_input, render_manifest, CommandBuilder, ConcatManifest};
pub use config::{EngineConfig, MissingOutputPolicy};
pub use decode::{decode_log_token, drain_log, drain_progress, ProgressDecoder};
pub use error::EngineError;
pub use ffmpeg::FfmpegEngine;
pub use locate::locate_executable;
pub use paths::{normalize_extension, PathResolver};
pub use runner::ProcessRunner;
pub use splitter::{split, Split, TokenBuffer};
pub use traits::Engine;
pub use types::{
    DirMode, EngineEvent, FileResult, InputDescriptor, InputMode, MediaInfo, NameMode,
    OutputDescriptor, ProcessRequest, ProcessResult, ProgressSnapshot,
};
