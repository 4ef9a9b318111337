// THEORY:
// The `pipeline` module is the top-level API of the engine. It wires the stages
// together behind a single call, `tick`, which an external driver invokes once
// per display refresh:
//
//   raw frame -> FrameCache -> diff against the BackgroundStore -> MotionMask
//             -> MotionGate -> PhysicsState
//
// The pipeline never schedules itself and never renders anything. Whatever loop
// drives it (a game engine, a tokio interval, a unit test) passes in the latest
// frame, if there is one, plus whether the user asked for a background capture,
// and gets back everything needed to draw the tick.
//
// Ordering within a tick:
// 1. No frame -> nothing happens at all.
// 2. The current cache is built completely. A bad buffer aborts the tick here,
//    before any state is touched.
// 3. The diff reads a snapshot of the background.
// 4. The gate consumes the mask.
// 5. A requested capture replaces the background last, so the next tick is the
//    first to see it.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::PipelineConfig;
use crate::core_modules::background_store::BackgroundStore;
use crate::core_modules::diff_engine::{self, MotionMask};
use crate::core_modules::frame_cache::FrameCache;
use crate::core_modules::motion_gate::{GateParams, MotionGate};
use crate::core_modules::utils::image_helper::image_helper;
use crate::error::{ConfigError, FrameError};

// Re-export key data structures for the public API.
pub use crate::core_modules::diff_engine::PixelCoord;
pub use crate::core_modules::motion_gate::{GateState, PhysicsState};

/// What the frame source and the UI hand in for one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput<'a> {
    /// The latest raw frame, or `None` while the source has nothing yet.
    pub frame: Option<&'a [u8]>,
    /// The capture control was activated during this tick.
    pub capture_background: bool,
}

impl<'a> TickInput<'a> {
    pub fn frame(frame: &'a [u8]) -> Self {
        Self { frame: Some(frame), capture_background: false }
    }

    pub fn capture(frame: &'a [u8]) -> Self {
        Self { frame: Some(frame), capture_background: true }
    }
}

/// Everything the host needs to draw one tick.
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub mask: MotionMask,
    pub physics: PhysicsState,
    pub gate_state: GateState,
    pub background_captured: bool,
}

/// The main, top-level struct for the engine.
pub struct LiftingPipeline {
    config: PipelineConfig,
    background: BackgroundStore,
    gate: MotionGate,
    frame_count: u64,
}

impl LiftingPipeline {
    /// Builds a pipeline after validating `config`; an invalid config is rejected.
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let background = BackgroundStore::initialize(config.image_width, config.image_height)?;
        let gate = MotionGate::new(GateParams::from(&config));
        Ok(Self {
            config,
            background,
            gate,
            frame_count: 0,
        })
    }

    /// Runs one tick. Returns `Ok(None)` when no frame was available, in which case
    /// nothing changed.
    pub fn tick(&mut self, input: TickInput<'_>) -> Result<Option<TickOutput>, FrameError> {
        let Some(frame) = input.frame else {
            trace!("no frame available, skipping tick");
            return Ok(None);
        };

        let current = FrameCache::from_rgba(frame, self.config.image_width, self.config.image_height)
            .inspect_err(|err| debug!(%err, "rejected frame"))?;
        let mask = self.motion_mask(&current)?;
        let gate_state = self.gate.step(&mask);
        self.frame_count += 1;

        if input.capture_background {
            self.background.capture(current)?;
        }

        Ok(Some(TickOutput {
            mask,
            physics: self.gate.physics(),
            gate_state,
            background_captured: input.capture_background,
        }))
    }

    /// Differences `current` against the active background without advancing
    /// the physics.
    pub fn motion_mask(&self, current: &FrameCache) -> Result<MotionMask, FrameError> {
        let background: Arc<FrameCache> = self.background.current();
        diff_engine::diff(current, &background, self.config.diff_threshold)
    }

    /// Replaces the background with the given raw frame outside of a tick.
    pub fn capture_background(&mut self, frame: &[u8]) -> Result<(), FrameError> {
        let cache = FrameCache::from_rgba(frame, self.config.image_width, self.config.image_height)?;
        self.background.capture(cache)
    }

    /// The raw frame as a displayable image.
    pub fn frame_image(&self, frame: &[u8]) -> Result<image::RgbaImage, FrameError> {
        image_helper::frame_to_rgba_image(frame, self.config.image_width, self.config.image_height)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn background(&self) -> &BackgroundStore {
        &self.background
    }

    pub fn physics(&self) -> PhysicsState {
        self.gate.physics()
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
