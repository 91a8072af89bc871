//! Directory entries and the (root-only) Directory View.

use core::fmt;

use crate::error::{Error, Result};
use crate::fat::Volume;

/// 32 bytes on disk; offsets follow `original_source/file_reader.h`'s
/// packed `dir_entry_t`.
pub const ENTRY_SIZE: usize = 32;

pub mod attrib {
    pub const READ_ONLY: u8 = 0x01;
    pub const HIDDEN: u8 = 0x02;
    pub const SYSTEM: u8 = 0x04;
    pub const VOLUME_LABEL: u8 = 0x08;
    pub const DIRECTORY: u8 = 0x10;
    pub const ARCHIVE: u8 = 0x20;
}

/// The state a directory slot's first name byte encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// A live entry.
    Exists,
    /// First byte is `0xE5`: a deleted slot, skipped on enumeration.
    Deleted,
    /// First byte is `0x00`: end-of-directory marker.
    End,
}

/// One parsed 32-byte root directory slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: [u8; 8],
    pub ext: [u8; 3],
    pub attributes: u8,
    pub creation_tenths: u8,
    pub time: u16,
    pub date: u16,
    pub last_accessed_date: u16,
    pub high_cluster_index: u16,
    pub last_modification_time: u16,
    pub low_cluster_index: u16,
    pub size: u32,
}

impl DirEntry {
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        if slice.len() != ENTRY_SIZE {
            return Err(Error::BadArgument("directory entry must be 32 bytes"));
        }

        macro_rules! e {
            ($ty:tt, $offset:literal) => {
                $ty::from_le_bytes(
                    slice[$offset..($offset + core::mem::size_of::<$ty>())]
                        .try_into()
                        .unwrap(),
                )
            };
        }

        Ok(Self {
            name: slice[0..8].try_into().unwrap(),
            ext: slice[8..11].try_into().unwrap(),
            attributes: slice[11],
            creation_tenths: slice[13],
            time: e!(u16, 14),
            date: e!(u16, 16),
            last_accessed_date: e!(u16, 18),
            high_cluster_index: e!(u16, 20),
            last_modification_time: e!(u16, 22),
            low_cluster_index: e!(u16, 26),
            size: e!(u32, 28),
        })
    }

    pub fn state(&self) -> State {
        match self.name[0] {
            0x00 => State::End,
            0xE5 => State::Deleted,
            _ => State::Exists,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.attributes & attrib::DIRECTORY != 0
    }

    pub fn is_volume_label(&self) -> bool {
        self.attributes & attrib::VOLUME_LABEL != 0
    }

    /// Trims trailing spaces off `name`, and if `ext` is non-blank appends
    /// `.ext` (also right-trimmed) — spec §3 `FormattedName`.
    pub fn formatted_name(&self) -> String {
        let name = trim_trailing_spaces(&self.name);
        let mut out = String::from(name);

        if self.ext[0] != b' ' {
            out.push('.');
            out.push_str(trim_trailing_spaces(&self.ext));
        }

        out
    }
}

fn trim_trailing_spaces(bytes: &[u8]) -> &str {
    let end = bytes.iter().rposition(|&b| b != b' ').map_or(0, |i| i + 1);
    core::str::from_utf8(&bytes[..end]).unwrap_or("")
}

impl fmt::Display for DirEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted_name())
    }
}

/// A view over the root directory. The sole path this driver accepts is
/// `"\\"` (spec §4.3); `founded_elements` is the only state that persists
/// across [`DirView::read`] calls.
pub struct DirView<'v> {
    volume: &'v mut Volume,
    founded_elements: u32,
}

impl<'v> DirView<'v> {
    /// Opens the root directory. Any path other than `"\\"` fails with
    /// [`Error::NotFound`].
    pub fn open(volume: &'v mut Volume, path: &str) -> Result<Self> {
        if path != "\\" {
            return Err(Error::NotFound("only the root path \"\\\\\" is supported"));
        }

        Ok(Self { volume, founded_elements: 0 })
    }

    /// Reads the next visible entry (skipping deleted slots and volume
    /// labels); `Ok(None)` once every slot has been delivered.
    ///
    /// Re-scans the whole root directory on every call, matching the
    /// original driver's stateless design (spec §4.3): the root directory
    /// is small and fixed-size, so this stays O(root_dir_capacity) per call
    /// without needing a persistent cursor.
    pub fn read(&mut self) -> Result<Option<DirEntry>> {
        let region = self.volume.read_root_dir_region()?;
        let capacity = self.volume.geometry().root_dir_capacity as usize;

        let mut visible_count = 0u32;
        for i in 0..capacity {
            let slot = &region[i * ENTRY_SIZE..(i + 1) * ENTRY_SIZE];
            let entry = DirEntry::from_slice(slot)?;

            match entry.state() {
                State::End | State::Deleted => continue,
                State::Exists => {}
            }

            if entry.is_volume_label() {
                continue;
            }

            visible_count += 1;
            if visible_count <= self.founded_elements {
                continue;
            }

            self.founded_elements += 1;
            return Ok(Some(entry));
        }

        Ok(None)
    }

    pub fn close(self) {
        drop(self);
    }
}

/// Resolves `name` (already in the 8.3 dotted form produced by
/// [`DirEntry::formatted_name`]) against the root directory.
///
/// Per spec §4.3 the scan does *not* stop at the first `0x00` slot — every
/// `root_dir_capacity` slot is examined — so a sparse directory (deleted
/// entries interleaved with a live one past an early end marker) is still
/// searched fully.
pub fn find_file(volume: &mut Volume, name: &str) -> Result<DirEntry> {
    let region = volume.read_root_dir_region()?;
    let capacity = volume.geometry().root_dir_capacity as usize;

    for i in 0..capacity {
        let slot = &region[i * ENTRY_SIZE..(i + 1) * ENTRY_SIZE];
        let entry = DirEntry::from_slice(slot)?;

        if matches!(entry.state(), State::Deleted | State::End) {
            continue;
        }

        if entry.formatted_name() == name {
            if entry.is_directory() || entry.is_volume_label() {
                return Err(Error::IsDir);
            }
            return Ok(entry);
        }
    }

    Err(Error::NotFound("no such file in root directory"))
}
