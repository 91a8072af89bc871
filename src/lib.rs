//! A read-only driver for a FAT12/16 volume stored as a single host file.
//!
//! Four layers, leaves first: [`block_device::BlockDevice`] treats the image
//! file as a flat array of 512-byte sectors; [`fat::Volume`] mounts a FAT16
//! volume at a given sector of the block device; [`fat::dir::DirView`] walks
//! the (fixed-capacity, root-only) directory; [`fat::file::FileStream`]
//! materializes a file's cluster chain and supports sequential read + seek.

pub mod error;
pub mod block_device;
pub mod fat;

pub use error::{Error, Result};
pub use block_device::BlockDevice;
pub use fat::Volume;
pub use fat::dir::DirView;
pub use fat::file::FileStream;
