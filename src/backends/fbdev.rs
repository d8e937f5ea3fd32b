use super::{DeviceHandle, DeviceInfo, DeviceSetup};
use linuxfb::Framebuffer;
use log::{debug, warn};
use memmap::MmapMut;
use nix::errno::Errno;
use nix::sys::stat::{SFlag, stat};
use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

const BYTES_PER_PIXEL: u32 = 4;

/// Linux fbdev setup: checks the node, queries the mode and maps its memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct Fbdev;

impl DeviceSetup for Fbdev {
    type Handle = MappedMemory;

    fn setup(&self, path: &Path) -> Result<DeviceInfo<MappedMemory>, Errno> {
        let st = stat(path)?;
        if SFlag::from_bits_truncate(st.st_mode) & SFlag::S_IFMT != SFlag::S_IFCHR {
            warn!("{} is not a character device", path.display());
            return Err(Errno::ENODEV);
        }

        // linuxfb hides the open error, so surface EACCES and friends here.
        File::options()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                warn!("failed to open {}: {e}", path.display());
                os_errno(&e)
            })?;

        let fb = Framebuffer::new(path).map_err(|e| {
            warn!("failed to open fbdev {}: {e:?}", path.display());
            Errno::ENOTTY
        })?;

        let bpp = fb.get_bytes_per_pixel();
        if bpp != BYTES_PER_PIXEL {
            warn!("{}: unsupported mode, {bpp} bytes per pixel", path.display());
            return Err(Errno::EINVAL);
        }

        let (width, height) = fb.get_size();
        let map = fb.map().map_err(|e| {
            warn!("failed to map fbdev {}: {e:?}", path.display());
            Errno::ENOMEM
        })?;
        debug!(
            "{}: {width}x{height}, {} bytes mapped",
            path.display(),
            map.len()
        );

        Ok(DeviceInfo {
            mem_len: map.len(),
            width,
            height,
            handle: MappedMemory { map, pos: 0 },
        })
    }
}

fn os_errno(e: &io::Error) -> Errno {
    e.raw_os_error().map(Errno::from_raw).unwrap_or(Errno::EIO)
}

/// Framebuffer memory mapped into the process, written through a cursor.
#[derive(Debug)]
pub struct MappedMemory {
    map: MmapMut,
    pos: usize,
}

impl Write for MappedMemory {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let dst = self.map.get_mut(self.pos..).unwrap_or_default();
        let n = buf.len().min(dst.len());
        dst[..n].copy_from_slice(&buf[..n]);
        self.pos += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.map.flush()
    }
}

impl Seek for MappedMemory {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(n) => (self.map.len() as u64).checked_add_signed(n),
            SeekFrom::Current(n) => (self.pos as u64).checked_add_signed(n),
        };
        let target = target.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek before start of device")
        })?;
        self.pos = usize::try_from(target)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "seek out of range"))?;
        Ok(target)
    }
}

impl DeviceHandle for MappedMemory {
    fn close(self) -> io::Result<()> {
        self.map.flush()
    }
}
