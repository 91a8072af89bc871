//! The FAT12/16 boot sector (BIOS Parameter Block) and its on-disk layout.
//!
//! Field offsets follow `original_source/file_reader.h`'s packed
//! `fat_super_t`, which matches the classic DOS 3.31 BPB layout.

use crate::block_device::SECTOR_SIZE;
use crate::error::{Error, Result};

/// The boot sector required by a FAT12/16 volume: must carry the `0xAA55`
/// signature at offset 0x1FE, verified by [`BootRecord::read`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootRecord {
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub fat_count: u8,
    pub root_dir_capacity: u16,
    pub logical_sectors16: u16,
    pub sectors_per_fat: u16,
    pub hidden_sectors: u32,
    pub logical_sectors32: u32,
    pub serial_number: u32,
    pub label: [u8; 11],
    pub fsid: [u8; 8],
    pub signature: u16,
}

const SIGNATURE: u16 = 0xAA55;

impl BootRecord {
    /// Parses a boot record out of one full sector and checks the signature.
    pub fn read(sector: &[u8]) -> Result<Self> {
        if sector.len() != SECTOR_SIZE {
            return Err(Error::BadArgument("boot sector buffer must be SECTOR_SIZE bytes"));
        }

        macro_rules! e {
            ($ty:tt, $offset:literal) => {
                $ty::from_le_bytes(
                    sector[$offset..($offset + core::mem::size_of::<$ty>())]
                        .try_into()
                        .unwrap(),
                )
            };
        }

        let record = Self {
            bytes_per_sector: e!(u16, 0x0B),
            sectors_per_cluster: e!(u8, 0x0D),
            reserved_sectors: e!(u16, 0x0E),
            fat_count: e!(u8, 0x10),
            root_dir_capacity: e!(u16, 0x11),
            logical_sectors16: e!(u16, 0x13),
            sectors_per_fat: e!(u16, 0x16),
            hidden_sectors: e!(u32, 0x1C),
            logical_sectors32: e!(u32, 0x20),
            serial_number: e!(u32, 0x27),
            label: sector[0x2B..0x2B + 11].try_into().unwrap(),
            fsid: sector[0x36..0x36 + 8].try_into().unwrap(),
            signature: e!(u16, 0x1FE),
        };

        if record.signature != SIGNATURE {
            log::warn!(
                "boot sector signature mismatch: got {:#06x}, want {:#06x}",
                record.signature,
                SIGNATURE
            );
            return Err(Error::Invalid("boot sector signature is not 0xAA55"));
        }

        Ok(record)
    }
}
