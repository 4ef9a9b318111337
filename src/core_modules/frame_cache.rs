// THEORY:
// A `FrameCache` is the grayscale snapshot of one full frame: exactly one luminance
// sample per pixel, laid out row-major so that coordinate (x, y) lives at
// `y * width + x`. It is the common currency between the frame source, the
// background store and the diff engine.
//
// The cache is built straight from the raw RGBA buffer handed over by the frame
// source. The buffer length is checked once up front; after that the walk over
// `chunks_exact(4)` cannot step out of bounds. Any trailing bytes past
// `4 * width * height` are ignored.

use crate::core_modules::pixel::pixel::{CHANNELS, Luminance, Pixel};
use crate::error::FrameError;

/// A dense, row-major grid of per-pixel luminance values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCache {
    width: u32,
    height: u32,
    samples: Vec<Luminance>,
}

impl FrameCache {
    /// An all-black cache. This is what the background store starts with.
    pub fn zeroed(width: u32, height: u32) -> Result<Self, FrameError> {
        let pixel_count = pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            samples: vec![0; pixel_count],
        })
    }

    /// Builds a cache from a raw 4-bytes-per-pixel buffer.
    pub fn from_rgba(buffer: &[u8], width: u32, height: u32) -> Result<Self, FrameError> {
        let pixel_count = pixel_count(width, height)?;
        check_buffer(buffer, pixel_count)?;

        let samples = buffer
            .chunks_exact(CHANNELS)
            .take(pixel_count)
            .map(|bytes| Pixel::from_rgba(bytes).luminance())
            .collect();

        Ok(Self { width, height, samples })
    }

    /// Rebuilds this cache in place from a new buffer of the same dimensions,
    /// reusing the existing allocation. On error the cache is left untouched.
    pub fn refill_from_rgba(&mut self, buffer: &[u8]) -> Result<(), FrameError> {
        check_buffer(buffer, self.samples.len())?;
        for (sample, bytes) in self.samples.iter_mut().zip(buffer.chunks_exact(CHANNELS)) {
            *sample = Pixel::from_rgba(bytes).luminance();
        }
        Ok(())
    }

    /// Builds a cache directly from luminance samples.
    pub fn from_samples(width: u32, height: u32, samples: Vec<Luminance>) -> Result<Self, FrameError> {
        let pixel_count = pixel_count(width, height)?;
        if samples.len() != pixel_count {
            return Err(FrameError::DimensionMismatch {
                expected: pixel_count,
                actual: samples.len(),
            });
        }
        Ok(Self { width, height, samples })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Luminance] {
        &self.samples
    }

    /// Luminance at `(x, y)`, or `None` outside the frame.
    pub fn get(&self, x: u32, y: u32) -> Option<Luminance> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples.get(y as usize * self.width as usize + x as usize).copied()
    }
}

fn pixel_count(width: u32, height: u32) -> Result<usize, FrameError> {
    if width == 0 || height == 0 {
        return Err(FrameError::InvalidDimensions { width, height });
    }
    Ok(width as usize * height as usize)
}

fn check_buffer(buffer: &[u8], pixel_count: usize) -> Result<(), FrameError> {
    let expected = pixel_count * CHANNELS;
    if buffer.len() < expected {
        return Err(FrameError::BufferTooSmall {
            expected,
            actual: buffer.len(),
        });
    }
    Ok(())
}
