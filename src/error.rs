use nix::errno::Errno;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Device setup reported a non-zero status. Nothing was allocated.
    #[error("error initializing framebuffer {}", path.display())]
    Init {
        path: PathBuf,
        #[source]
        errno: Errno,
    },

    #[error("pixel ({x}, {y}) is outside the {width}x{height} surface")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Status code reported by device setup, if this is an initialization failure.
    pub fn errno(&self) -> Option<Errno> {
        match self {
            Error::Init { errno, .. } => Some(*errno),
            _ => None,
        }
    }
}
