//! Builds synthetic FAT16 images in memory and mounts them through a real
//! temp file, since [`fat16::BlockDevice`] only ever talks to `std::fs::File`.

use std::io::Write;

use fat16::block_device::BlockDevice;
use fat16::Volume;

pub const SECTOR: usize = 512;

/// The handful of boot-sector fields every test image needs to pick.
pub struct Geometry {
    pub sectors_per_cluster: u8,
    pub fat_count: u8,
    pub sectors_per_fat: u16,
    pub root_dir_capacity: u16,
}

impl Default for Geometry {
    fn default() -> Self {
        Self { sectors_per_cluster: 1, fat_count: 2, sectors_per_fat: 1, root_dir_capacity: 16 }
    }
}

/// Assembles a full FAT16 image: boot sector, `fat_count` identical copies
/// of the FAT seeded from `fat_entries`, the root directory seeded from
/// `dir_entries`, then enough data sectors to hold every `(cluster,
/// bytes)` pair in `cluster_data`.
pub struct ImageBuilder {
    geometry: Geometry,
    fat_entries: Vec<(u16, u16)>,
    dir_entries: Vec<(usize, [u8; 32])>,
    cluster_data: Vec<(u16, Vec<u8>)>,
}

impl ImageBuilder {
    pub fn new(geometry: Geometry) -> Self {
        Self { geometry, fat_entries: Vec::new(), dir_entries: Vec::new(), cluster_data: Vec::new() }
    }

    pub fn fat_entry(mut self, cluster: u16, value: u16) -> Self {
        self.fat_entries.push((cluster, value));
        self
    }

    pub fn dir_entry(mut self, slot: usize, entry: [u8; 32]) -> Self {
        self.dir_entries.push((slot, entry));
        self
    }

    pub fn cluster_data(mut self, cluster: u16, bytes: impl Into<Vec<u8>>) -> Self {
        self.cluster_data.push((cluster, bytes.into()));
        self
    }

    fn sectors_per_dir(&self) -> u32 {
        (self.geometry.root_dir_capacity as u32 * 32).div_ceil(SECTOR as u32)
    }

    fn data_cluster_2(&self) -> u32 {
        1 + self.geometry.fat_count as u32 * self.geometry.sectors_per_fat as u32
            + self.sectors_per_dir()
    }

    pub fn build(&self) -> Vec<u8> {
        let bytes_per_cluster = self.geometry.sectors_per_cluster as usize * SECTOR;
        let highest_cluster = self.cluster_data.iter().map(|(c, _)| *c).max().unwrap_or(1);
        let data_sectors =
            (highest_cluster as u32 + 1 - 2) * self.geometry.sectors_per_cluster as u32;

        let total_sectors =
            1 + self.geometry.fat_count as u32 * self.geometry.sectors_per_fat as u32
                + self.sectors_per_dir()
                + data_sectors;

        let mut image = vec![0u8; total_sectors as usize * SECTOR];

        // Boot sector.
        let boot = &mut image[0..SECTOR];
        boot[0x0B..0x0D].copy_from_slice(&(SECTOR as u16).to_le_bytes());
        boot[0x0D] = self.geometry.sectors_per_cluster;
        boot[0x0E..0x10].copy_from_slice(&1u16.to_le_bytes()); // reserved_sectors
        boot[0x10] = self.geometry.fat_count;
        boot[0x11..0x13].copy_from_slice(&self.geometry.root_dir_capacity.to_le_bytes());
        boot[0x13..0x15].copy_from_slice(&(total_sectors as u16).to_le_bytes()); // logical_sectors16
        boot[0x16..0x18].copy_from_slice(&self.geometry.sectors_per_fat.to_le_bytes());
        boot[0x1FE..0x200].copy_from_slice(&0xAA55u16.to_le_bytes());

        // FAT entries, mirrored into every FAT copy.
        let mut fat_sector = vec![0u8; self.geometry.sectors_per_fat as usize * SECTOR];
        for (cluster, value) in &self.fat_entries {
            let offset = *cluster as usize * 2;
            fat_sector[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
        }
        for copy in 0..self.geometry.fat_count {
            let start = SECTOR + copy as usize * self.geometry.sectors_per_fat as usize * SECTOR;
            image[start..start + fat_sector.len()].copy_from_slice(&fat_sector);
        }

        // Root directory.
        let dir_start = SECTOR
            + self.geometry.fat_count as usize * self.geometry.sectors_per_fat as usize * SECTOR;
        for (slot, entry) in &self.dir_entries {
            let offset = dir_start + slot * 32;
            image[offset..offset + 32].copy_from_slice(entry);
        }

        // Data region.
        let data_start = dir_start + self.sectors_per_dir() as usize * SECTOR;
        for (cluster, bytes) in &self.cluster_data {
            let offset = data_start + (*cluster as usize - 2) * bytes_per_cluster;
            image[offset..offset + bytes.len()].copy_from_slice(bytes);
        }

        image
    }

    /// Writes the image to a temp file and mounts it as a `Volume` at
    /// sector 0. The `NamedTempFile` must outlive the returned `Volume`.
    pub fn mount(&self) -> (tempfile::NamedTempFile, Volume) {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&self.build()).unwrap();
        f.flush().unwrap();

        let bd = BlockDevice::open(f.path()).unwrap();
        let volume = Volume::mount(bd, 0).unwrap();
        (f, volume)
    }
}

/// Builds one raw 32-byte root directory entry: an 8.3 name/ext, attributes,
/// starting cluster, and size. Padding spaces fill unused name/ext bytes.
pub fn dir_entry_bytes(name: &str, ext: &str, attributes: u8, cluster: u16, size: u32) -> [u8; 32] {
    let mut e = [0u8; 32];
    let mut name_bytes = [b' '; 8];
    for (i, b) in name.bytes().take(8).enumerate() {
        name_bytes[i] = b;
    }
    let mut ext_bytes = [b' '; 3];
    for (i, b) in ext.bytes().take(3).enumerate() {
        ext_bytes[i] = b;
    }

    e[0..8].copy_from_slice(&name_bytes);
    e[8..11].copy_from_slice(&ext_bytes);
    e[11] = attributes;
    e[26..28].copy_from_slice(&cluster.to_le_bytes());
    e[28..32].copy_from_slice(&size.to_le_bytes());
    e
}

/// A deleted-slot marker (first byte `0xE5`), otherwise zeroed.
pub fn deleted_entry_bytes() -> [u8; 32] {
    let mut e = [0u8; 32];
    e[0] = 0xE5;
    e
}
