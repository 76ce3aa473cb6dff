// Container header: 512-byte prologue, decoded and validated before any
// further I/O.

use crate::ole::constants::*;
use containerfs_core::{ContainerError, Device};
use log::debug;

/// The decoded compound file header.
///
/// The header always spans 512 bytes at file offset 0. For version 4
/// containers the remainder of the 4096-byte zeroth sector must be zero;
/// that padding is never read here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OleHeader {
    pub minor_version: u16,
    pub major_version: u16,
    pub byte_order: u16,
    pub sector_shift: u16,
    pub mini_sector_shift: u16,
    pub num_dir_sectors: u32,
    pub num_fat_sectors: u32,
    pub first_dir_sector: u32,
    pub transaction_signature: u32,
    pub mini_stream_cutoff_size: u32,
    pub first_mini_fat_sector: u32,
    pub num_mini_fat_sectors: u32,
    pub first_difat_sector: u32,
    pub num_difat_sectors: u32,
    /// The 109 DIFAT entries stored inline in the header.
    pub difat: [u32; HEADER_DIFAT_ENTRIES],
}

impl OleHeader {
    /// Read and validate the header from the start of the device.
    pub fn load<D: Device>(device: &mut D) -> Result<Self, ContainerError> {
        let mut buf = [0u8; HEADER_SIZE];
        if !device.read_at(0, &mut buf) {
            return Err(ContainerError::IoFailure);
        }
        let header = Self::parse(&buf)?;
        debug!(
            "header: v{}.{:#06x}, sector size {}, {} FAT sectors",
            header.major_version,
            header.minor_version,
            header.sector_size(),
            header.num_fat_sectors
        );
        Ok(header)
    }

    /// Decode and validate a 512-byte header image. Checks run in a fixed
    /// order and the first failure wins.
    pub fn parse(buf: &[u8; HEADER_SIZE]) -> Result<Self, ContainerError> {
        if buf[HDR_MAGIC..HDR_MAGIC + 8] != HEADER_MAGIC {
            return Err(ContainerError::InvalidSignature);
        }
        if buf[HDR_CLSID..HDR_CLSID + 16].iter().any(|&b| b != 0) {
            return Err(ContainerError::InvalidClsid);
        }

        let minor_version = read_u16(buf, HDR_MINOR_VERSION);
        let major_version = read_u16(buf, HDR_MAJOR_VERSION);
        let byte_order = read_u16(buf, HDR_BYTE_ORDER);
        let sector_shift = read_u16(buf, HDR_SECTOR_SHIFT);
        let mini_sector_shift = read_u16(buf, HDR_MINI_SECTOR_SHIFT);
        let num_dir_sectors = read_u32(buf, HDR_NUM_DIR_SECTORS);
        let num_fat_sectors = read_u32(buf, HDR_NUM_FAT_SECTORS);
        let first_dir_sector = read_u32(buf, HDR_FIRST_DIR_SECTOR);
        let transaction_signature = read_u32(buf, HDR_TRANSACTION_SIGNATURE);
        let mini_stream_cutoff_size = read_u32(buf, HDR_MINI_STREAM_CUTOFF);
        let first_mini_fat_sector = read_u32(buf, HDR_FIRST_MINI_FAT_SECTOR);
        let num_mini_fat_sectors = read_u32(buf, HDR_NUM_MINI_FAT_SECTORS);
        let first_difat_sector = read_u32(buf, HDR_FIRST_DIFAT_SECTOR);
        let num_difat_sectors = read_u32(buf, HDR_NUM_DIFAT_SECTORS);

        if major_version != 3 && major_version != 4 {
            return Err(ContainerError::UnsupportedMajorVersion);
        }
        if minor_version != 0x003E {
            return Err(ContainerError::UnsupportedMinorVersion);
        }
        if byte_order != 0xFFFE {
            return Err(ContainerError::WrongByteOrder);
        }
        // Sector shift is tied to the major version: 512-byte sectors for
        // version 3, 4096-byte sectors for version 4.
        let shift_matches = (major_version == 3 && sector_shift == 9)
            || (major_version == 4 && sector_shift == 12);
        if !shift_matches {
            return Err(ContainerError::InvalidSectorShift);
        }
        if mini_sector_shift != 6 {
            return Err(ContainerError::InvalidMiniSectorShift);
        }
        if buf[HDR_RESERVED..HDR_RESERVED + 6].iter().any(|&b| b != 0) {
            return Err(ContainerError::InvalidReservedField);
        }
        // The directory sector count is not supported for version 3 files.
        if major_version == 3 && num_dir_sectors != 0 {
            return Err(ContainerError::InvalidNumberOfDirectorySectors);
        }
        if mini_stream_cutoff_size != 0x1000 {
            return Err(ContainerError::InvalidMiniCutoff);
        }
        // A mini FAT chain head and a nonzero mini FAT sector count must
        // appear together.
        let mini_fat_exists = first_mini_fat_sector != ENDOFCHAIN;
        let mini_fat_counted = num_mini_fat_sectors != 0;
        if mini_fat_exists != mini_fat_counted {
            return Err(ContainerError::MiniFatHeaderInconsistent);
        }

        let mut difat = [FREESECT; HEADER_DIFAT_ENTRIES];
        for (i, slot) in difat.iter_mut().enumerate() {
            *slot = read_u32(buf, HDR_DIFAT + i * 4);
        }

        Ok(Self {
            minor_version,
            major_version,
            byte_order,
            sector_shift,
            mini_sector_shift,
            num_dir_sectors,
            num_fat_sectors,
            first_dir_sector,
            transaction_signature,
            mini_stream_cutoff_size,
            first_mini_fat_sector,
            num_mini_fat_sectors,
            first_difat_sector,
            num_difat_sectors,
            difat,
        })
    }

    pub fn sector_size(&self) -> u64 {
        1 << self.sector_shift
    }

    pub fn mini_sector_size(&self) -> u64 {
        1 << self.mini_sector_shift
    }
}

fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}
