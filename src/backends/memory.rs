//! A framebuffer that lives in process memory.
//!
//! Every write that reaches the simulated device is recorded with the offset
//! it landed at, so callers can check exactly what a flush pushed out.

use super::{DeviceHandle, DeviceInfo, DeviceSetup};
use log::debug;
use nix::errno::Errno;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// One write as the device saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub offset: u64,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct Device {
    memory: Vec<u8>,
    writes: Vec<WriteRecord>,
    open_handles: usize,
    fail_writes: bool,
    fail_close: bool,
}

/// Shared view of a simulated device, valid after the surface is gone.
#[derive(Debug, Clone, Default)]
pub struct SimulatedFramebuffer {
    inner: Arc<Mutex<Device>>,
}

impl SimulatedFramebuffer {
    fn lock(&self) -> MutexGuard<'_, Device> {
        // A poisoned device only means a test panicked mid-write.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current device memory.
    pub fn contents(&self) -> Vec<u8> {
        self.lock().memory.clone()
    }

    pub fn writes(&self) -> Vec<WriteRecord> {
        self.lock().writes.clone()
    }

    pub fn open_handles(&self) -> usize {
        self.lock().open_handles
    }

    /// Makes every following write fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Makes closing a handle report an I/O error. The handle is released anyway.
    pub fn set_fail_close(&self, fail: bool) {
        self.lock().fail_close = fail;
    }

    /// Overwrites device memory directly, as another writer would.
    pub fn fill(&self, byte: u8) {
        self.lock().memory.fill(byte);
    }
}

/// Device setup for a [`SimulatedFramebuffer`].
#[derive(Debug, Clone)]
pub struct MemorySetup {
    width: u32,
    height: u32,
    mem_len: usize,
    status: Option<Errno>,
    device: SimulatedFramebuffer,
}

impl MemorySetup {
    /// A device exactly large enough for `width * height` 4-byte pixels.
    pub fn new(width: u32, height: u32) -> Self {
        let mem_len = width as usize * height as usize * 4;
        Self {
            width,
            height,
            mem_len,
            status: None,
            device: SimulatedFramebuffer::default(),
        }
    }

    /// Reports `mem_len` bytes of device memory instead.
    pub fn with_mem_len(mut self, mem_len: usize) -> Self {
        self.mem_len = mem_len;
        self
    }

    /// Makes setup fail with `errno`.
    pub fn failing(mut self, errno: Errno) -> Self {
        self.status = Some(errno);
        self
    }

    pub fn device(&self) -> SimulatedFramebuffer {
        self.device.clone()
    }
}

impl DeviceSetup for MemorySetup {
    type Handle = MemoryHandle;

    fn setup(&self, path: &Path) -> Result<DeviceInfo<MemoryHandle>, Errno> {
        if let Some(errno) = self.status {
            return Err(errno);
        }

        let mut dev = self.device.lock();
        if dev.memory.len() != self.mem_len {
            dev.memory.resize(self.mem_len, 0);
        }
        dev.open_handles += 1;
        debug!(
            "simulated {}: {}x{}, {} bytes",
            path.display(),
            self.width,
            self.height,
            self.mem_len
        );

        Ok(DeviceInfo {
            mem_len: self.mem_len,
            width: self.width,
            height: self.height,
            handle: MemoryHandle {
                device: self.device.clone(),
                pos: 0,
                open: true,
            },
        })
    }
}

#[derive(Debug)]
pub struct MemoryHandle {
    device: SimulatedFramebuffer,
    pos: u64,
    open: bool,
}

impl MemoryHandle {
    fn release(&mut self) {
        if self.open {
            self.open = false;
            self.device.lock().open_handles -= 1;
        }
    }
}

impl Write for MemoryHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut dev = self.device.lock();
        if dev.fail_writes {
            return Err(io::Error::other("simulated device rejected write"));
        }

        let start = usize::try_from(self.pos).unwrap_or(usize::MAX);
        let end = start
            .checked_add(buf.len())
            .filter(|&end| end <= dev.memory.len())
            .ok_or_else(|| io::Error::new(io::ErrorKind::WriteZero, "write past device memory"))?;

        dev.memory[start..end].copy_from_slice(buf);
        dev.writes.push(WriteRecord {
            offset: self.pos,
            bytes: buf.to_vec(),
        });
        self.pos = end as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemoryHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let len = self.device.lock().memory.len() as u64;
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(n) => len.checked_add_signed(n),
            SeekFrom::Current(n) => self.pos.checked_add_signed(n),
        };
        self.pos = target.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek before start of device")
        })?;
        Ok(self.pos)
    }
}

impl DeviceHandle for MemoryHandle {
    fn close(mut self) -> io::Result<()> {
        self.release();
        if self.device.lock().fail_close {
            return Err(io::Error::other("simulated device failed to close"));
        }
        Ok(())
    }
}

impl Drop for MemoryHandle {
    fn drop(&mut self) {
        self.release();
    }
}
