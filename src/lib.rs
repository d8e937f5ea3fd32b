//! Pixel access to a Linux framebuffer.
//!
//! Open a [`PixelSurface`], draw on it through [`Raster`], then call
//! [`PixelSurface::flush`] to push the changes to the display.

pub mod backends;
mod color;
mod error;
mod raster;
mod surface;

pub use color::{Color, ColorModel, Rgba};
pub use error::{Error, Result};
pub use raster::{Point, Raster, Rectangle};
pub use surface::PixelSurface;

#[cfg(feature = "fbdev")]
pub type Framebuffer = PixelSurface<backends::fbdev::MappedMemory>;
