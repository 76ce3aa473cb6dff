// OLE compound container filesystem
// Mount builds the FAT, directory and mini FAT tables once; queries are
// pure in-memory tree walks and stream reads go back to the device.

use crate::ole::constants::{sector_offset, ENDOFCHAIN};
use crate::ole::directory::{load_directory, DirectoryEntry, EntryKind};
use crate::ole::fat::{chain_next, load_fat, load_mini_fat};
use crate::ole::header::OleHeader;
use crate::ole::path::OlePath;
use crate::ole::tree::ResolvePath;
use containerfs_core::{ContainerError, Device};
use log::{debug, info};

/// A mounted read-only OLE/CFB container.
///
/// The device is moved in at mount time and owned for the life of the
/// filesystem; every table is built during `mount` and immutable
/// afterwards, so shared-borrow queries never observe hidden mutation.
pub struct OleFilesystem<D: Device> {
    device: D,
    header: OleHeader,
    fat: Vec<u32>,
    mini_fat: Vec<u32>,
    directory: Vec<DirectoryEntry>,
}

impl<D: Device> OleFilesystem<D> {
    /// Mount a container: load and validate the header, then the FAT, the
    /// directory stream and the mini FAT. The first failing step aborts
    /// the mount with its error.
    pub fn mount(mut device: D) -> Result<Self, ContainerError> {
        let header = OleHeader::load(&mut device)?;
        let fat = load_fat(&mut device, &header)?;
        let directory = load_directory(&mut device, &header, &fat)?;

        // The root storage is directory index 0 by format convention; its
        // stream is the mini stream, which fixes the mini FAT entry count.
        let root = directory.first().ok_or(ContainerError::CorruptedFile)?;
        let mini_sector_count = root.stream_size / header.mini_sector_size();
        let mini_fat = load_mini_fat(&mut device, &header, &fat, mini_sector_count)?;

        info!(
            "mounted OLE container: {} directory entries, {} FAT entries",
            directory.len(),
            fat.len()
        );
        Ok(Self {
            device,
            header,
            fat,
            mini_fat,
            directory,
        })
    }

    pub fn header(&self) -> &OleHeader {
        &self.header
    }

    /// True iff every segment of the path resolves. The empty path does
    /// not exist.
    pub fn exists(&self, path: &OlePath) -> bool {
        if path.is_empty() {
            return false;
        }
        let resolved = ResolvePath::new(&self.directory, path.segments(), self.root_child())
            .count();
        resolved == path.len()
    }

    /// Byte size of the stream named by the path. A short resolution is
    /// `FileNotFound`; a resolved entry of any other kind is
    /// `NotRegularFile`.
    pub fn file_size(&self, path: &OlePath) -> Result<u64, ContainerError> {
        let entry = self.resolve_entry(path)?;
        if entry.kind != EntryKind::Stream {
            return Err(ContainerError::NotRegularFile);
        }
        Ok(entry.stream_size)
    }

    pub fn is_directory(&self, path: &OlePath) -> bool {
        matches!(
            self.resolve_entry(path).map(|entry| entry.kind),
            Ok(EntryKind::Storage)
        )
    }

    pub fn is_regular_file(&self, path: &OlePath) -> bool {
        matches!(
            self.resolve_entry(path).map(|entry| entry.kind),
            Ok(EntryKind::Stream)
        )
    }

    /// Read the full contents of the stream named by the path. Streams
    /// below the mini stream cutoff live in 64-byte mini sectors carved
    /// from the root entry's chain; everything else occupies whole
    /// sectors.
    pub fn read_file(&mut self, path: &OlePath) -> Result<Vec<u8>, ContainerError> {
        let entry = self.resolve_entry(path)?;
        if entry.kind != EntryKind::Stream {
            return Err(ContainerError::NotRegularFile);
        }
        let start = entry.starting_sector;
        let size = entry.stream_size;

        debug!("reading stream '{}' ({} bytes)", path, size);
        if size == 0 {
            return Ok(Vec::new());
        }
        if size < u64::from(self.header.mini_stream_cutoff_size) {
            self.read_mini_chain(start, size)
        } else {
            self.read_sector_chain(start, size)
        }
    }

    fn root_child(&self) -> u32 {
        // Mount fails on an empty directory, so index 0 always exists.
        self.directory[0].child_id
    }

    /// Resolve a path to its final entry, or `FileNotFound` when the path
    /// is empty or the walk stops short.
    fn resolve_entry<'a>(&'a self, path: &OlePath) -> Result<&'a DirectoryEntry, ContainerError> {
        if path.is_empty() {
            return Err(ContainerError::FileNotFound);
        }
        let mut resolved = 0usize;
        let mut last = None;
        for entry in ResolvePath::new(&self.directory, path.segments(), self.root_child()) {
            resolved += 1;
            last = Some(entry);
        }
        if resolved != path.len() {
            return Err(ContainerError::FileNotFound);
        }
        last.ok_or(ContainerError::FileNotFound)
    }

    /// Read a whole-sector chain from the FAT, truncated to the stream
    /// size. A chain that ends before the declared size is corruption.
    fn read_sector_chain(&mut self, first: u32, size: u64) -> Result<Vec<u8>, ContainerError> {
        let sector_size = self.header.sector_size();
        let mut data = Vec::with_capacity(size as usize);
        let mut sector = first;
        let mut steps = 0usize;

        while sector != ENDOFCHAIN && (data.len() as u64) < size {
            let mut buf = vec![0u8; sector_size as usize];
            if !self.device.read_at(sector_offset(sector, sector_size), &mut buf) {
                return Err(ContainerError::IoFailure);
            }
            data.extend_from_slice(&buf);

            sector = chain_next(&self.fat, sector)?;
            steps += 1;
            if steps > self.fat.len() {
                return Err(ContainerError::CorruptedFile);
            }
        }

        if (data.len() as u64) < size {
            return Err(ContainerError::CorruptedFile);
        }
        data.truncate(size as usize);
        Ok(data)
    }

    /// Read a mini-sector chain from the mini FAT. Mini sector `m` sits at
    /// byte `m * 64` of the mini stream, which itself occupies the root
    /// entry's sector chain.
    fn read_mini_chain(&mut self, first: u32, size: u64) -> Result<Vec<u8>, ContainerError> {
        let sector_size = self.header.sector_size();
        let mini_sector_size = self.header.mini_sector_size();
        let mini_stream_sectors = self.mini_stream_sectors()?;

        let mut data = Vec::with_capacity(size as usize);
        let mut mini = first;
        let mut steps = 0usize;

        while mini != ENDOFCHAIN && (data.len() as u64) < size {
            let byte_offset = u64::from(mini) * mini_sector_size;
            let host_index = (byte_offset / sector_size) as usize;
            let within = byte_offset % sector_size;
            let host_sid = *mini_stream_sectors
                .get(host_index)
                .ok_or(ContainerError::CorruptedFile)?;

            let mut buf = [0u8; 64];
            if !self
                .device
                .read_at(sector_offset(host_sid, sector_size) + within, &mut buf)
            {
                return Err(ContainerError::IoFailure);
            }
            data.extend_from_slice(&buf);

            mini = self
                .mini_fat
                .get(mini as usize)
                .copied()
                .ok_or(ContainerError::CorruptedFile)?;
            steps += 1;
            if steps > self.mini_fat.len() {
                return Err(ContainerError::CorruptedFile);
            }
        }

        if (data.len() as u64) < size {
            return Err(ContainerError::CorruptedFile);
        }
        data.truncate(size as usize);
        Ok(data)
    }

    /// The sector chain backing the mini stream, in order.
    fn mini_stream_sectors(&self) -> Result<Vec<u32>, ContainerError> {
        let mut sectors = Vec::new();
        let mut sector = self.directory[0].starting_sector;
        let mut steps = 0usize;
        while sector != ENDOFCHAIN {
            sectors.push(sector);
            sector = chain_next(&self.fat, sector)?;
            steps += 1;
            if steps > self.fat.len() {
                return Err(ContainerError::CorruptedFile);
            }
        }
        Ok(sectors)
    }
}
