//! FAT16 volume mount and geometry. A [`Volume`] owns the [`BlockDevice`] it
//! was mounted on and the derived geometry (spec §3); [`dir`] and [`file`]
//! borrow it to resolve names and stream bytes.

pub mod boot_sector;
pub mod dir;
pub mod file;
pub mod table;
pub mod types;

use crate::block_device::{BlockDevice, SECTOR_SIZE};
use crate::error::{Error, Result};
use boot_sector::BootRecord;
use table::FatTable;

/// Geometry derived once at mount time (spec §3). Every field here is pure
/// arithmetic on the boot record plus the volume's starting sector; nothing
/// in `dir` or `file` re-derives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub volume_start: u32,
    pub volume_size: u32,
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub bytes_per_cluster: u32,
    pub fat_count: u8,
    pub sectors_per_fat: u16,
    pub fat_start: u32,
    pub root_dir_capacity: u16,
    pub dir_position: u32,
    pub sectors_per_dir: u32,
    pub data_cluster_2: u32,
}

/// A mounted FAT16 volume: the parsed boot record, derived geometry, and the
/// [`BlockDevice`] it was mounted on.
pub struct Volume {
    bd: BlockDevice,
    boot_record: BootRecord,
    geometry: Geometry,
}

impl Volume {
    /// Mounts a FAT16 volume starting at `first_sector` of `bd` (spec §4.2).
    ///
    /// Reads the boot sector directly from `first_sector` (not from a
    /// not-yet-assigned `volume_start`, per spec §9's noted source bug),
    /// validates its signature, derives geometry, asserts it fits within
    /// the block device, and cross-checks every pair of redundant FAT
    /// copies byte-for-byte.
    pub fn mount(mut bd: BlockDevice, first_sector: u32) -> Result<Self> {
        let mut sector = [0u8; SECTOR_SIZE];
        bd.read(first_sector, &mut sector, 1)?;
        let boot_record = BootRecord::read(&sector)?;

        if boot_record.fat_count == 0 {
            return Err(Error::Invalid("fat_count must be at least 1"));
        }

        let volume_size = if boot_record.logical_sectors16 != 0 {
            boot_record.logical_sectors16 as u32
        } else {
            boot_record.logical_sectors32
        };

        if volume_size > bd.disk_size() {
            log::warn!(
                "volume_size {volume_size} exceeds block device size {}",
                bd.disk_size()
            );
            return Err(Error::Invalid("volume_size exceeds block device size"));
        }

        let fat_start = first_sector + boot_record.reserved_sectors as u32;
        let dir_position =
            fat_start + boot_record.fat_count as u32 * boot_record.sectors_per_fat as u32;
        let sectors_per_dir = (boot_record.root_dir_capacity as u32 * dir::ENTRY_SIZE as u32)
            .div_ceil(boot_record.bytes_per_sector as u32);
        let data_cluster_2 = dir_position + sectors_per_dir;
        let bytes_per_cluster =
            boot_record.sectors_per_cluster as u32 * boot_record.bytes_per_sector as u32;

        let geometry = Geometry {
            volume_start: first_sector,
            volume_size,
            bytes_per_sector: boot_record.bytes_per_sector,
            sectors_per_cluster: boot_record.sectors_per_cluster,
            bytes_per_cluster,
            fat_count: boot_record.fat_count,
            sectors_per_fat: boot_record.sectors_per_fat,
            fat_start,
            root_dir_capacity: boot_record.root_dir_capacity,
            dir_position,
            sectors_per_dir,
            data_cluster_2,
        };

        let mut volume = Self { bd, boot_record, geometry };
        volume.cross_check_fats()?;

        log::debug!(
            "mounted FAT16 volume at sector {first_sector}: {} clusters of {bytes_per_cluster} \
             bytes, root dir at sector {dir_position} ({sectors_per_dir} sectors)",
            geometry.root_dir_capacity
        );

        Ok(volume)
    }

    fn fat_position(&self, index: u8) -> u32 {
        self.geometry.fat_start + index as u32 * self.geometry.sectors_per_fat as u32
    }

    /// Reads every adjacent pair of FAT copies in full and compares them
    /// byte-for-byte (spec §4.2 step 6).
    fn cross_check_fats(&mut self) -> Result<()> {
        let byte_len = self.geometry.sectors_per_fat as usize * SECTOR_SIZE;
        let mut previous: Option<Vec<u8>> = None;

        for i in 0..self.geometry.fat_count {
            let mut buf = vec![0u8; byte_len];
            self.bd.read(self.fat_position(i), &mut buf, self.geometry.sectors_per_fat as u32)?;

            if let Some(prev) = &previous {
                if *prev != buf {
                    log::warn!("FAT copies {} and {i} disagree", i - 1);
                    return Err(Error::Invalid("FAT copies are not byte-identical"));
                }
            }
            previous = Some(buf);
        }

        Ok(())
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn boot_record(&self) -> &BootRecord {
        &self.boot_record
    }

    /// Reads the whole root directory region into memory (spec §4.3).
    pub(crate) fn read_root_dir_region(&mut self) -> Result<Vec<u8>> {
        let byte_len = self.geometry.sectors_per_dir as usize * SECTOR_SIZE;
        let mut buf = vec![0u8; byte_len];
        self.bd.read(self.geometry.dir_position, &mut buf, self.geometry.sectors_per_dir)?;
        Ok(buf)
    }

    /// Reads one data cluster (physical cluster index, `>= 2`) into `buf`,
    /// which must be exactly `bytes_per_cluster` long.
    pub(crate) fn read_cluster(&mut self, cluster: u16, buf: &mut [u8]) -> Result<()> {
        if (cluster as u32) < types::FIRST_DATA_CLUSTER as u32 {
            return Err(Error::Range);
        }
        let lba = self.geometry.data_cluster_2 + (cluster as u32 - 2) * self.geometry.sectors_per_cluster as u32;
        self.bd.read(lba, buf, self.geometry.sectors_per_cluster as u32)?;
        Ok(())
    }

    /// Loads FAT #0 into memory (spec §4.4 step 1).
    pub(crate) fn load_fat_table(&mut self) -> Result<FatTable> {
        FatTable::load(&mut self.bd, self.fat_position(0), self.geometry.sectors_per_fat)
    }

    /// Upper bound on a chain's length, guarding the walker against a
    /// corrupt/cyclic chain (spec §9).
    pub(crate) fn max_chain_clusters(&self) -> usize {
        (self.geometry.volume_size / self.geometry.sectors_per_cluster as u32) as usize
    }

    /// Releases the underlying block device.
    pub fn close(self) {
        drop(self);
    }
}
