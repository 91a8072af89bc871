//! The file read/seek engine (spec §4.5): materializes a resolved file's
//! cluster chain and streams bytes across cluster boundaries.

use crate::error::{Error, Result};
use crate::fat::dir;
use crate::fat::table::FatTable;
use crate::fat::Volume;

/// `seek` reference point (spec §4.5). Unlike the C source's raw `whence`
/// integer, invalid modes are unrepresentable rather than a runtime
/// `Invalid` error — see DESIGN.md's Open Question decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Set,
    Cur,
    End,
}

/// An open file: an immutable cluster chain plus a mutable byte cursor.
///
/// `current_cluster`/`current_position_in_cluster` are re-derived from
/// `current_position` after every `read`/`seek` rather than maintained
/// independently (spec §9's note on the cursor being "logically one
/// integer").
pub struct FileStream<'v> {
    volume: &'v mut Volume,
    name: String,
    file_size: u32,
    clusters: Vec<u16>,
    clusters_size_in_bytes: u32,

    current_position: u32,
    current_cluster: usize,
    current_position_in_cluster: u32,
}

impl<'v> FileStream<'v> {
    /// Resolves `name` in the root directory and materializes its cluster
    /// chain (spec §4.3 `find_file` + §4.4 cluster-chain walker).
    pub fn open(volume: &'v mut Volume, name: &str) -> Result<Self> {
        let entry = dir::find_file(volume, name)?;

        let max_clusters = volume.max_chain_clusters();
        let table: FatTable = volume.load_fat_table()?;
        let clusters = table.chain(entry.low_cluster_index, max_clusters)?;

        let bytes_per_cluster = volume.geometry().bytes_per_cluster;
        let clusters_size_in_bytes = clusters.len() as u32 * bytes_per_cluster;

        Ok(Self {
            volume,
            name: entry.formatted_name(),
            file_size: entry.size,
            clusters,
            clusters_size_in_bytes,
            current_position: 0,
            current_cluster: 0,
            current_position_in_cluster: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_size(&self) -> u32 {
        self.file_size
    }

    pub fn position(&self) -> u32 {
        self.current_position
    }

    pub fn clusters_size_in_bytes(&self) -> u32 {
        self.clusters_size_in_bytes
    }

    fn bytes_per_cluster(&self) -> u32 {
        self.volume.geometry().bytes_per_cluster
    }

    fn set_position(&mut self, position: u32) {
        self.current_position = position;
        let bpc = self.bytes_per_cluster();
        if bpc > 0 {
            self.current_cluster = (position / bpc) as usize;
            self.current_position_in_cluster = position % bpc;
        } else {
            self.current_cluster = 0;
            self.current_position_in_cluster = 0;
        }
    }

    /// Reads up to `count` elements of `elem_size` bytes each into `buf`
    /// (spec §4.5 `read`). Clips to `file_size`, not to the chain's
    /// allocated size; a partial trailing element (fewer than `elem_size`
    /// bytes remaining in the file) is copied into `buf` but not counted.
    pub fn read(&mut self, elem_size: usize, count: usize, buf: &mut [u8]) -> Result<usize> {
        if elem_size == 0 || count == 0 {
            return Ok(0);
        }

        let requested =
            elem_size.checked_mul(count).ok_or(Error::BadArgument("elem_size * count overflows"))?;
        if buf.len() < requested {
            return Err(Error::BadArgument("buffer too small for elem_size * count"));
        }

        if self.current_position >= self.file_size {
            return Ok(0);
        }

        let remaining_in_file = (self.file_size - self.current_position) as usize;
        let bytes_to_read = requested.min(remaining_in_file);

        let bytes_per_cluster = self.bytes_per_cluster() as usize;
        let mut cluster_buf = vec![0u8; bytes_per_cluster];
        let mut loaded: Option<usize> = None;

        let mut elements_read = 0usize;
        let mut out_pos = 0usize;

        while elements_read * elem_size < bytes_to_read {
            let remaining = bytes_to_read - elements_read * elem_size;
            let this_elem_len = remaining.min(elem_size);

            for _ in 0..this_elem_len {
                if loaded != Some(self.current_cluster) {
                    let physical = *self
                        .clusters
                        .get(self.current_cluster)
                        .ok_or(Error::Range)?;
                    self.volume.read_cluster(physical, &mut cluster_buf)?;
                    loaded = Some(self.current_cluster);
                }

                buf[out_pos] = cluster_buf[self.current_position_in_cluster as usize];
                out_pos += 1;

                self.set_position(self.current_position + 1);
                if loaded != Some(self.current_cluster) {
                    loaded = None;
                }
            }

            if this_elem_len == elem_size {
                elements_read += 1;
            } else {
                break;
            }
        }

        Ok(elements_read)
    }

    /// Repositions the cursor (spec §4.5 `seek`). The resulting position
    /// must satisfy `0 <= position < clusters_size_in_bytes`; seeking to
    /// exactly `clusters_size_in_bytes` fails with [`Error::Range`] by
    /// design.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<()> {
        let base: i64 = match whence {
            Whence::Set => 0,
            Whence::Cur => self.current_position as i64,
            Whence::End => self.file_size as i64,
        };

        let target = base.checked_add(offset).ok_or(Error::Range)?;
        if target < 0 || target as u64 >= self.clusters_size_in_bytes as u64 {
            return Err(Error::Range);
        }

        self.set_position(target as u32);
        Ok(())
    }

    pub fn close(self) {
        drop(self);
    }
}
