//! The Block Device (BD) layer: the image file treated as a flat array of
//! fixed-size sectors. No caching, no concurrency — every [`BlockDevice::read`]
//! does a physical seek-then-read.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{Error, Result};

/// Fixed sector size this driver understands. The on-disk `bytes_per_sector`
/// field is still read and validated against this at mount time; nothing
/// here generalizes over other sector sizes (see spec's non-goals).
pub const SECTOR_SIZE: usize = 512;

/// A read-only handle on the backing image file.
///
/// `disk_size` is the number of whole 512-byte sectors in the file; a
/// trailing partial sector (if any) is unaddressable, matching the original
/// driver's `ftell(..) / BYTES_PER_SECTOR` truncation.
#[derive(Debug)]
pub struct BlockDevice {
    file: File,
    disk_size: u32,
}

impl BlockDevice {
    /// Opens `path` read-only and records the disk's size in sectors.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut file = File::open(path)?;
        let len = file.seek(SeekFrom::End(0))?;
        let disk_size = (len / SECTOR_SIZE as u64) as u32;

        log::debug!("opened block device with {disk_size} sectors ({len} bytes)");

        Ok(Self { file, disk_size })
    }

    /// Total number of whole sectors addressable on this device.
    pub fn disk_size(&self) -> u32 {
        self.disk_size
    }

    /// Reads `n` whole sectors starting at `first_sector` into `buf`, which
    /// must be exactly `n * SECTOR_SIZE` bytes long. Returns the number of
    /// sectors read (always `n` on success).
    pub fn read(&mut self, first_sector: u32, buf: &mut [u8], n: u32) -> Result<u32> {
        let needed = n as usize * SECTOR_SIZE;
        if buf.len() != needed {
            return Err(Error::BadArgument("buffer length must be n * SECTOR_SIZE"));
        }

        let last = (first_sector as u64) + (n as u64);
        if last > self.disk_size as u64 {
            log::warn!(
                "read past end of disk: sectors {first_sector}..{last} (disk has {})",
                self.disk_size
            );
            return Err(Error::Range);
        }

        self.file
            .seek(SeekFrom::Start(first_sector as u64 * SECTOR_SIZE as u64))?;
        self.file.read_exact(buf)?;

        log::trace!("read {n} sector(s) starting at {first_sector}");
        Ok(n)
    }

    /// Releases the underlying file handle. A plain `Drop` would do the same
    /// thing; this exists for symmetry with the spec's named `disk_close`
    /// operation and to give callers an explicit release point.
    pub fn close(self) {
        drop(self);
    }
}
