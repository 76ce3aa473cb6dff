// OLE/CFB on-disk constants
// Field offsets follow [MS-CFB]; all integers are little-endian.

/// Unallocated sector.
pub const FREESECT: u32 = 0xFFFF_FFFF;
/// Terminates a sector chain.
pub const ENDOFCHAIN: u32 = 0xFFFF_FFFE;
/// Sector used by the FAT itself.
pub const FATSECT: u32 = 0xFFFF_FFFD;
/// Sector used by the DIFAT.
pub const DIFSECT: u32 = 0xFFFF_FFFC;
/// Missing directory tree link.
pub const NOSTREAM: u32 = 0xFFFF_FFFF;

pub const HEADER_SIZE: usize = 512;
pub const HEADER_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
/// Number of DIFAT entries stored inline in the header.
pub const HEADER_DIFAT_ENTRIES: usize = 109;

// Header field offsets.
pub const HDR_MAGIC: usize = 0;
pub const HDR_CLSID: usize = 8;
pub const HDR_MINOR_VERSION: usize = 24;
pub const HDR_MAJOR_VERSION: usize = 26;
pub const HDR_BYTE_ORDER: usize = 28;
pub const HDR_SECTOR_SHIFT: usize = 30;
pub const HDR_MINI_SECTOR_SHIFT: usize = 32;
pub const HDR_RESERVED: usize = 34;
pub const HDR_NUM_DIR_SECTORS: usize = 40;
pub const HDR_NUM_FAT_SECTORS: usize = 44;
pub const HDR_FIRST_DIR_SECTOR: usize = 48;
pub const HDR_TRANSACTION_SIGNATURE: usize = 52;
pub const HDR_MINI_STREAM_CUTOFF: usize = 56;
pub const HDR_FIRST_MINI_FAT_SECTOR: usize = 60;
pub const HDR_NUM_MINI_FAT_SECTORS: usize = 64;
pub const HDR_FIRST_DIFAT_SECTOR: usize = 68;
pub const HDR_NUM_DIFAT_SECTORS: usize = 72;
pub const HDR_DIFAT: usize = 76;

pub const DIRECTORY_ENTRY_SIZE: usize = 128;

// Directory entry field offsets.
pub const DIR_NAME: usize = 0;
pub const DIR_NAME_SIZE: usize = 64;
pub const DIR_OBJECT_TYPE: usize = 66;
pub const DIR_COLOR_FLAG: usize = 67;
pub const DIR_LEFT_ID: usize = 68;
pub const DIR_RIGHT_ID: usize = 72;
pub const DIR_CHILD_ID: usize = 76;
pub const DIR_CLSID: usize = 80;
pub const DIR_STATE_BITS: usize = 96;
pub const DIR_CREATION_TIME: usize = 100;
pub const DIR_MODIFIED_TIME: usize = 108;
pub const DIR_STARTING_SECTOR: usize = 116;
pub const DIR_STREAM_SIZE: usize = 120;

/// Byte offset of sector `sid`. The 512-byte header occupies the zeroth
/// addressable unit, so data sectors carry a one-sector bias.
pub fn sector_offset(sid: u32, sector_size: u64) -> u64 {
    (u64::from(sid) + 1) * sector_size
}
