use anyhow::{Context, Result};
use fbdev_surface::{Framebuffer, Raster, Rgba};
use log::info;
use std::env;

const DEFAULT_DEVICE: &str = "/dev/fb0";

fn main() -> Result<()> {
    env_logger::init();

    let path = env::args()
        .nth(1)
        .or_else(|| env::var("FRAMEBUFFER").ok())
        .unwrap_or(DEFAULT_DEVICE.into());

    let mut fb = Framebuffer::open(&path).with_context(|| format!("Failed to open {path}"))?;
    let bounds = fb.bounds();
    info!("{path}: {}x{}", bounds.width(), bounds.height());

    for y in 0..bounds.height() {
        for x in 0..bounds.width() {
            let r = (x * 255 / bounds.width()) as u8;
            let g = (y * 255 / bounds.height()) as u8;
            fb.set_pixel(x, y, &Rgba::rgb(r, g, 0))?;
        }
    }

    let diagonal = bounds.width().min(bounds.height());
    for i in 0..diagonal {
        fb.write_pixel(i, i, 0, 0, 255)?;
    }

    fb.flush().context("Failed to flush framebuffer")?;
    fb.close().context("Failed to close framebuffer")?;
    Ok(())
}
