use crate::backends::{DeviceHandle, DeviceSetup};
use crate::color::{Color, ColorModel, Rgba};
use crate::error::{Error, Result};
use crate::raster::{Point, Raster, Rectangle};
use log::{debug, warn};
use nix::errno::Errno;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

const BLUE: usize = 0;
const GREEN: usize = 1;
const RED: usize = 2;
// Byte 3 is reserved by the hardware pixel format and never touched.

const BYTES_PER_PIXEL: usize = 4;

/// An in-memory copy of a display's pixels and the device it mirrors.
///
/// Pixel writes only change the buffer. Nothing reaches the display until
/// [`PixelSurface::flush`] copies the whole buffer to the device. The buffer
/// starts out zeroed and the device is never read back, so before the first
/// flush the two images can differ.
///
/// A surface is not synchronized. Opening the same device twice gives two
/// buffers that overwrite each other on flush.
#[derive(Debug)]
pub struct PixelSurface<H> {
    buf: Vec<u8>,
    width: usize,
    height: usize,
    handle: H,
}

#[cfg(feature = "fbdev")]
impl PixelSurface<crate::backends::fbdev::MappedMemory> {
    /// Opens the Linux framebuffer device node at `path`, e.g. `/dev/fb0`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(&crate::backends::fbdev::Fbdev, path)
    }
}

impl<H: DeviceHandle> PixelSurface<H> {
    /// Runs `setup` for `path` and wraps the device it reports.
    pub fn open_with<S>(setup: &S, path: impl AsRef<Path>) -> Result<Self>
    where
        S: DeviceSetup<Handle = H>,
    {
        let path = path.as_ref();
        let init_err = |errno: Errno| Error::Init {
            path: path.to_path_buf(),
            errno,
        };

        let info = setup.setup(path).map_err(|errno| {
            warn!("device setup for {} failed: {errno}", path.display());
            init_err(errno)
        })?;

        let width = info.width as usize;
        let height = info.height as usize;
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .filter(|&len| len > 0 && len <= info.mem_len);
        let Some(len) = len else {
            warn!(
                "{}: {width}x{height} does not fit {} bytes of device memory",
                path.display(),
                info.mem_len
            );
            return Err(init_err(Errno::EINVAL));
        };

        debug!("opened {} ({width}x{height})", path.display());
        Ok(Self {
            buf: vec![0; len],
            width,
            height,
            handle: info.handle,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The pixel buffer as it will be written on the next flush.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Byte offset of pixel (`x`, `y`) in the buffer.
    pub fn pixel_offset(&self, x: usize, y: usize) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok((y * self.width + x) * BYTES_PER_PIXEL)
    }

    /// Writes one pixel from raw 8-bit channels.
    pub fn write_pixel(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8) -> Result<()> {
        let start = self.pixel_offset(x, y)?;
        let pixel = &mut self.buf[start..start + BYTES_PER_PIXEL];
        pixel[BLUE] = b;
        pixel[GREEN] = g;
        pixel[RED] = r;
        Ok(())
    }

    /// Copies the whole buffer to the device, starting at offset 0.
    ///
    /// On failure the buffer is untouched and the flush can simply be retried.
    pub fn flush(&mut self) -> Result<()> {
        self.handle.seek(SeekFrom::Start(0))?;
        self.handle.write_all(&self.buf)?;
        self.handle.flush()?;
        debug!("flushed {} bytes", self.buf.len());
        Ok(())
    }

    /// Releases the device handle.
    ///
    /// The buffer is never copied to the device here: pixel writes made since
    /// the last [`flush`](Self::flush) are lost. Backends may still sync what
    /// earlier flushes wrote; the fbdev mapping is `msync`ed before unmapping.
    pub fn close(self) -> Result<()> {
        self.handle.close()?;
        debug!("closed framebuffer");
        Ok(())
    }
}

impl<H: DeviceHandle> Raster for PixelSurface<H> {
    fn color_model(&self) -> ColorModel {
        ColorModel::Rgba8
    }

    fn bounds(&self) -> Rectangle {
        Rectangle::new(Point::new(0, 0), Point::new(self.width, self.height))
    }

    fn get_pixel(&self, x: usize, y: usize) -> Result<Rgba> {
        let start = self.pixel_offset(x, y)?;
        let pixel = &self.buf[start..start + BYTES_PER_PIXEL];
        Ok(Rgba::rgb(pixel[RED], pixel[GREEN], pixel[BLUE]))
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: &dyn Color) -> Result<()> {
        let Rgba { r, g, b, .. } = self.color_model().convert(color);
        self.write_pixel(x, y, r, g, b)
    }
}
