// THEORY:
// The diff engine compares the current frame against the background, pixel by
// pixel, and decides which pixels are "motion".
//
// The single source of truth is `is_flagged`: a pixel is motion when its luminance
// rose above the background by strictly more than the threshold. The difference
// is signed, so a pixel that got darker never counts, and a difference exactly
// equal to the threshold is not flagged.
//
// The result is a `MotionMask`, holding one boolean per pixel. The two ways hosts
// consume it are views over that one vector:
// - sparse: membership tests (`contains`) and the list of flagged coordinates,
//   which the motion gate uses;
// - raster: a black/white opaque image for display.
// Neither view re-applies the threshold, so they cannot drift apart.

use std::collections::HashSet;

use image::{Rgba, RgbaImage};

use crate::core_modules::frame_cache::FrameCache;
use crate::core_modules::pixel::pixel::Luminance;
use crate::error::FrameError;

pub type LuminanceDelta = i16;

pub const FLAGGED_PIXEL: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const CLEAR_PIXEL: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// An integer pixel position inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PixelCoord {
    pub x: u32,
    pub y: u32,
}

impl PixelCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Signed brightening of `current` over `background`.
#[inline]
pub fn delta_luminance(current: Luminance, background: Luminance) -> LuminanceDelta {
    current as LuminanceDelta - background as LuminanceDelta
}

/// The one thresholding rule every mask view is derived from.
#[inline]
pub fn is_flagged(current: Luminance, background: Luminance, threshold: u8) -> bool {
    delta_luminance(current, background) > threshold as LuminanceDelta
}

/// Per-pixel result of differencing one frame against the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionMask {
    width: u32,
    height: u32,
    flags: Vec<bool>,
    flagged_count: usize,
}

impl MotionMask {
    /// Whether `(x, y)` is motion. Coordinates outside the frame never are.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.flags[y as usize * self.width as usize + x as usize]
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged_count
    }

    pub fn is_empty(&self) -> bool {
        self.flagged_count == 0
    }

    /// Flagged coordinates in row-major order.
    pub fn flagged_coordinates(&self) -> impl Iterator<Item = PixelCoord> + '_ {
        let width = self.width as usize;
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, flagged)| **flagged)
            .map(move |(index, _)| PixelCoord::new((index % width) as u32, (index / width) as u32))
    }

    /// The sparse view as a set.
    pub fn to_coordinate_set(&self) -> HashSet<PixelCoord> {
        self.flagged_coordinates().collect()
    }

    /// The raster view: white opaque where flagged, black opaque elsewhere.
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            if self.contains(x, y) { FLAGGED_PIXEL } else { CLEAR_PIXEL }
        })
    }
}

/// Differences `current` against `background` with the given threshold.
pub fn diff(current: &FrameCache, background: &FrameCache, threshold: u8) -> Result<MotionMask, FrameError> {
    if current.len() != background.len() || current.width() != background.width() {
        return Err(FrameError::DimensionMismatch {
            expected: background.len(),
            actual: current.len(),
        });
    }

    let flags: Vec<bool> = current
        .samples()
        .iter()
        .zip(background.samples())
        .map(|(&cur, &bg)| is_flagged(cur, bg, threshold))
        .collect();
    let flagged_count = flags.iter().filter(|&&flagged| flagged).count();

    Ok(MotionMask {
        width: current.width(),
        height: current.height(),
        flags,
        flagged_count,
    })
}
