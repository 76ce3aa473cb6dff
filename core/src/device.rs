// Block device abstraction
// A mount issues a bounded number of positioned reads through this trait.

use log::debug;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// A byte-addressable device supporting positioned reads.
///
/// `read_at` fills the whole destination buffer or fails; partial reads
/// are failures. No ordering is assumed between reads.
pub trait Device {
    fn read_at(&mut self, offset: u64, dst: &mut [u8]) -> bool;
}

/// A device backed by a regular file.
pub struct FileDevice {
    file: File,
}

impl FileDevice {
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(Self {
            file: File::open(path)?,
        })
    }
}

impl Device for FileDevice {
    fn read_at(&mut self, offset: u64, dst: &mut [u8]) -> bool {
        if let Err(e) = self.file.seek(SeekFrom::Start(offset)) {
            debug!("seek to {} failed: {}", offset, e);
            return false;
        }
        if let Err(e) = self.file.read_exact(dst) {
            debug!("read of {} bytes at {} failed: {}", dst.len(), offset, e);
            return false;
        }
        true
    }
}
