// THEORY:
// The `Pixel` module is the leaf of the engine. It holds a single RGBA sample and
// knows exactly one thing about it: its luminance. The frame source hands us
// 4 bytes per pixel; whatever sits in the fourth byte (alpha or padding) never
// influences brightness.
//
// Luminance uses the Rec. 601 weights (0.299, 0.587, 0.114) summed in f64 and then
// truncated toward zero. Truncation, not rounding, is part of the contract: two
// engines comparing caches must land on identical integers.

pub mod pixel {
    pub type Byte = u8;
    pub type Channel = Byte;
    pub type Luminance = u8;

    pub const CHANNELS: usize = 4;

    /// Maps three 8-bit channel samples to a luminance in `0..=255`.
    #[inline]
    pub fn luminance(red: Channel, green: Channel, blue: Channel) -> Luminance {
        // The weighted sum of 8-bit inputs never exceeds 255.0 in f64, so the cast only truncates.
        (0.299_f64 * red as f64 + 0.587_f64 * green as f64 + 0.114_f64 * blue as f64) as Luminance
    }

    /// A "dumb" data container representing a single RGBA pixel.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Pixel {
        pub red: Channel,
        pub green: Channel,
        pub blue: Channel,
        /// Carried along for display; ignored by every heuristic.
        pub alpha: Channel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel { red, green, blue, alpha }
        }

        /// Reads the pixel starting at `bytes[0]`. Callers guarantee at least
        /// `CHANNELS` bytes are present.
        #[inline]
        pub fn from_rgba(bytes: &[Byte]) -> Self {
            Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3])
        }

        pub fn luminance(&self) -> Luminance {
            luminance(self.red, self.green, self.blue)
        }

        pub fn to_bytes(self) -> [Byte; CHANNELS] {
            [self.red, self.green, self.blue, self.alpha]
        }
    }
}
