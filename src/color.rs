//! Color values and the single color model a framebuffer surface speaks.

/// Anything that can be read as red, green, blue and alpha intensities.
///
/// Channels are 16 bits wide (`0..=0xffff`), so wider color sources fit
/// without loss until they are narrowed for the device.
pub trait Color {
    fn rgba(&self) -> (u16, u16, u16, u16);
}

/// An 8-bit-per-channel color. Surfaces always report `a == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0 }
    }
}

impl Color for Rgba {
    fn rgba(&self) -> (u16, u16, u16, u16) {
        (
            widen(self.r),
            widen(self.g),
            widen(self.b),
            widen(self.a),
        )
    }
}

impl Color for (u8, u8, u8) {
    fn rgba(&self) -> (u16, u16, u16, u16) {
        (widen(self.0), widen(self.1), widen(self.2), 0)
    }
}

impl Color for [u8; 3] {
    fn rgba(&self) -> (u16, u16, u16, u16) {
        (widen(self[0]), widen(self[1]), widen(self[2]), 0)
    }
}

#[inline]
const fn widen(c: u8) -> u16 {
    c as u16 * 0x101
}

#[inline]
const fn narrow(c: u16) -> u8 {
    (c >> 8) as u8
}

/// Identifier of the color model a raster stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorModel {
    /// Additive red/green/blue, 8 bits per channel, no transparency.
    Rgba8,
}

impl ColorModel {
    /// Narrows `color` into this model. Alpha is dropped and reported as 0.
    pub fn convert(&self, color: &dyn Color) -> Rgba {
        match self {
            ColorModel::Rgba8 => {
                let (r, g, b, _) = color.rgba();
                Rgba::rgb(narrow(r), narrow(g), narrow(b))
            }
        }
    }
}
