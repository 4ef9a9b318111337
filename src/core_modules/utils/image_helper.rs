pub mod image_helper {
    use std::path::Path;

    use image::{ImageEncoder, RgbaImage};

    use crate::core_modules::pixel::pixel::CHANNELS;
    use crate::error::FrameError;

    /// Copies a raw 4-bytes-per-pixel frame into an image the host can display.
    pub fn frame_to_rgba_image(buffer: &[u8], width: u32, height: u32) -> Result<RgbaImage, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize * CHANNELS;
        if buffer.len() < expected {
            return Err(FrameError::BufferTooSmall {
                expected,
                actual: buffer.len(),
            });
        }
        RgbaImage::from_raw(width, height, buffer[..expected].to_vec()).ok_or(FrameError::BufferTooSmall {
            expected,
            actual: buffer.len(),
        })
    }

    /// Writes an RGBA image as PNG.
    pub fn save(path: impl AsRef<Path>, image: &RgbaImage) -> Result<(), image::error::ImageError> {
        let output = std::io::BufWriter::new(std::fs::File::create(path)?);
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(image.as_raw(), image.width(), image.height(), image::ExtendedColorType::Rgba8)?;

        Ok(())
    }
}
