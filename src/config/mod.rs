//! Configuration loading and validation.

pub mod loader;
pub mod model;

pub use model::{AppConfig, Mode, VideoCodec};
