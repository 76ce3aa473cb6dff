// Directory stream loader
// 128-byte entries decoded along the FAT chain from the header's first
// directory sector.

use crate::ole::constants::*;
use crate::ole::fat::chain_next;
use crate::ole::header::OleHeader;
use crate::ole::string::OleString;
use containerfs_core::{ContainerError, Device};
use log::debug;

/// Directory entry classification, from the on-disk object type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Unknown or unallocated (0).
    Unknown,
    /// A storage object, i.e. a directory (1).
    Storage,
    /// A stream object, i.e. a regular file (2).
    Stream,
    /// The root storage (5).
    Root,
}

impl EntryKind {
    fn from_wire(value: u8) -> Self {
        match value {
            1 => EntryKind::Storage,
            2 => EntryKind::Stream,
            5 => EntryKind::Root,
            _ => EntryKind::Unknown,
        }
    }
}

/// A cooked directory entry. Sibling links (`left_id`, `right_id`) and the
/// `child_id` are indices into the flat directory table, `NOSTREAM` when
/// absent; each parent's children form a binary search tree ordered by the
/// name comparator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: OleString,
    pub kind: EntryKind,
    pub left_id: u32,
    pub right_id: u32,
    pub child_id: u32,
    pub starting_sector: u32,
    pub creation_time: u64,
    pub modified_time: u64,
    pub stream_size: u64,
}

/// Follow the FAT chain from `first_dir_sector` and cook every allocated
/// entry. Wholly-zero records are unallocated and dropped; a name that
/// fails its constraints aborts the load.
pub fn load_directory<D: Device>(
    device: &mut D,
    header: &OleHeader,
    fat: &[u32],
) -> Result<Vec<DirectoryEntry>, ContainerError> {
    let sector_size = header.sector_size();
    let entries_per_sector = sector_size as usize / DIRECTORY_ENTRY_SIZE;
    let mut entries = Vec::with_capacity(if header.num_dir_sectors == 0 {
        32
    } else {
        header.num_dir_sectors as usize * entries_per_sector
    });

    let mut sector = header.first_dir_sector;
    let mut steps = 0usize;
    while sector != ENDOFCHAIN {
        let mut buf = vec![0u8; sector_size as usize];
        if !device.read_at(sector_offset(sector, sector_size), &mut buf) {
            return Err(ContainerError::IoFailure);
        }

        for raw in buf.chunks_exact(DIRECTORY_ENTRY_SIZE) {
            if raw.iter().all(|&b| b == 0) {
                continue;
            }
            entries.push(decode_entry(raw)?);
        }

        sector = chain_next(fat, sector)?;
        steps += 1;
        if steps > fat.len() {
            return Err(ContainerError::CorruptedFile);
        }
    }

    debug!("directory stream: {} allocated entries", entries.len());
    Ok(entries)
}

fn decode_entry(raw: &[u8]) -> Result<DirectoryEntry, ContainerError> {
    let mut name_raw = [0u8; 64];
    name_raw.copy_from_slice(&raw[DIR_NAME..DIR_NAME + 64]);
    let name_size = read_u16(raw, DIR_NAME_SIZE) as usize;
    let name = OleString::from_raw(&name_raw, name_size)?;

    // The color flag, CLSID and state bits are not interpreted by this
    // driver.
    Ok(DirectoryEntry {
        name,
        kind: EntryKind::from_wire(raw[DIR_OBJECT_TYPE]),
        left_id: read_u32(raw, DIR_LEFT_ID),
        right_id: read_u32(raw, DIR_RIGHT_ID),
        child_id: read_u32(raw, DIR_CHILD_ID),
        starting_sector: read_u32(raw, DIR_STARTING_SECTOR),
        creation_time: read_u64(raw, DIR_CREATION_TIME),
        modified_time: read_u64(raw, DIR_MODIFIED_TIME),
        stream_size: read_u64(raw, DIR_STREAM_SIZE),
    })
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

fn read_u64(buf: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}
