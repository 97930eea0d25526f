//! Testing utilities: a mock engine and a scripted stand-in for ffmpeg.
//!
//! # Example
//!
//! ```rust,ignore
//! use optimux_core::testing::{fake_encoder, MockEngine};
//!
//! let engine = MockEngine::new();
//! engine.set_output_size(4096).await;
//!
//! let ffmpeg = fake_encoder(temp.path());
//! let config = EngineConfig::with_paths(ffmpeg, "ffprobe".into());
//! ```

#[cfg(unix)]
mod fake_encoder;
mod mock_engine;

#[cfg(unix)]
pub use fake_encoder::{fake_encoder, write_script};
pub use mock_engine::MockEngine;
