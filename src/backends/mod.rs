//! Device setup: everything that happens before a surface owns its buffer.
//!
//! A backend turns a device path into a [`DeviceInfo`]: how much memory the
//! device has, its visible resolution and an open handle to its memory. The
//! surface never looks past this interface, so any implementation (a real
//! framebuffer, a simulated one in a test) can stand in.

use nix::errno::Errno;
use std::io::{self, Seek, Write};
use std::path::Path;

#[cfg(feature = "fbdev")]
pub mod fbdev;
pub mod memory;

/// Writable, seekable handle to device memory.
pub trait DeviceHandle: Write + Seek {
    /// Releases the handle, reporting anything the release itself hit.
    fn close(mut self) -> io::Result<()>
    where
        Self: Sized,
    {
        self.flush()
    }
}

/// What device setup reports back on success.
#[derive(Debug)]
pub struct DeviceInfo<H> {
    /// Total addressable device memory in bytes.
    pub mem_len: usize,
    pub width: u32,
    pub height: u32,
    pub handle: H,
}

pub trait DeviceSetup {
    type Handle: DeviceHandle;

    /// Opens the device at `path`. `Err` is the non-zero setup status.
    fn setup(&self, path: &Path) -> Result<DeviceInfo<Self::Handle>, Errno>;
}
