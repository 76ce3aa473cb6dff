// FAT and mini FAT loaders
// The FAT is discovered through the DIFAT: 109 inline header entries plus
// an overflow chain of dedicated DIFAT sectors.

use crate::ole::constants::{sector_offset, ENDOFCHAIN, FREESECT};
use crate::ole::header::OleHeader;
use containerfs_core::{ContainerError, Device};
use log::debug;

/// Read one sector and decode it as little-endian u32 entries.
pub(crate) fn read_sector_entries<D: Device>(
    device: &mut D,
    sid: u32,
    sector_size: u64,
) -> Result<Vec<u32>, ContainerError> {
    let mut buf = vec![0u8; sector_size as usize];
    if !device.read_at(sector_offset(sid, sector_size), &mut buf) {
        return Err(ContainerError::IoFailure);
    }
    Ok(buf
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Successor of `sid` in its chain. An id with no FAT entry means the
/// chain escaped the allocation table.
pub(crate) fn chain_next(fat: &[u32], sid: u32) -> Result<u32, ContainerError> {
    fat.get(sid as usize)
        .copied()
        .ok_or(ContainerError::CorruptedFile)
}

/// Gather the FAT sector ids from the DIFAT and splice the FAT sectors
/// into one flat table.
///
/// FREESECT entries inside a DIFAT overflow sector are skipped rather
/// than treated as terminators; the next-DIFAT link is the last entry
/// appended from each sector, taken by position. Both behaviors are
/// compatibility requirements.
pub fn load_fat<D: Device>(
    device: &mut D,
    header: &OleHeader,
) -> Result<Vec<u32>, ContainerError> {
    let sector_size = header.sector_size();

    let mut fat_sector_ids: Vec<u32> = header
        .difat
        .iter()
        .copied()
        .filter(|&sid| sid != FREESECT)
        .collect();

    let mut next_difat = header.first_difat_sector;
    while next_difat != ENDOFCHAIN {
        let entries = read_sector_entries(device, next_difat, sector_size)?;
        fat_sector_ids.extend(entries.into_iter().filter(|&sid| sid != FREESECT));

        // The final slot of a DIFAT sector is the next-DIFAT link, not a
        // FAT sector id; pop it back off the candidate list.
        next_difat = fat_sector_ids.pop().ok_or(ContainerError::CorruptedFile)?;
    }

    if fat_sector_ids.len() != header.num_fat_sectors as usize {
        debug!(
            "DIFAT yielded {} FAT sectors, header declares {}",
            fat_sector_ids.len(),
            header.num_fat_sectors
        );
        return Err(ContainerError::CorruptedFile);
    }

    let entries_per_sector = (sector_size / 4) as usize;
    let mut fat = Vec::with_capacity(fat_sector_ids.len() * entries_per_sector);
    for sid in fat_sector_ids {
        fat.extend(read_sector_entries(device, sid, sector_size)?);
    }

    debug!("FAT loaded: {} entries", fat.len());
    Ok(fat)
}

/// Follow the FAT chain from the mini FAT's first sector and collect the
/// allocation table for 64-byte mini sectors. `mini_sector_count` is the
/// root entry's stream size divided by the mini sector size.
pub fn load_mini_fat<D: Device>(
    device: &mut D,
    header: &OleHeader,
    fat: &[u32],
    mini_sector_count: u64,
) -> Result<Vec<u32>, ContainerError> {
    let sector_size = header.sector_size();
    let mut mini_fat = Vec::with_capacity(header.num_mini_fat_sectors as usize);

    let mut sector = header.first_mini_fat_sector;
    let mut steps = 0usize;
    while sector != ENDOFCHAIN {
        let entries = read_sector_entries(device, sector, sector_size)?;
        mini_fat.extend(entries.into_iter().filter(|&sid| sid != FREESECT));

        sector = chain_next(fat, sector)?;
        steps += 1;
        if steps > fat.len() {
            return Err(ContainerError::CorruptedFile);
        }
    }

    if mini_fat.len() as u64 != mini_sector_count {
        debug!(
            "mini FAT has {} entries, root stream implies {}",
            mini_fat.len(),
            mini_sector_count
        );
        return Err(ContainerError::CorruptedFile);
    }

    debug!("mini FAT loaded: {} entries", mini_fat.len());
    Ok(mini_fat)
}
