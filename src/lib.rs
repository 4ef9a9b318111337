// THEORY:
// This file is the entry point for the `lifting_vision` library crate. The public
// surface is the `LiftingPipeline` in `pipeline` together with its `PipelineConfig`
// and tick input/output types. The stages underneath (`core_modules`) stay public
// so hosts and tests can drive a single stage on its own, but a host normally only
// ever calls `LiftingPipeline::tick`.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::{ConfigError, FrameError};
pub use pipeline::{LiftingPipeline, TickInput, TickOutput};
