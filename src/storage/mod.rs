//! Storage Module
//!
//! The imgFS container: one file holding a fixed header, a fixed-capacity
//! record table and an append-only blob region.
//!
//! ## Responsibilities
//! - Byte-exact encoding of the header and of each record slot
//! - Loading the whole table on open, rewriting single slots on mutation
//! - Content-hash deduplication at insert time
//! - Lazy, memoized generation of the small and thumbnail variants
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Header (64 bytes)                                           │
//! │   Name (32) | Version u32 | NbFiles u32 | MaxFiles u32      │
//! │   ResizedRes [u16; 4] | reserved u32 | reserved u64         │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Record table (MaxFiles x 208 bytes)                         │
//! │   ImgId (128) | SHA-256 (32) | OrigRes [u32; 2]             │
//! │   Size [u32; 3] | Offset [u64; 3] | IsValid u16 | pad u16   │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Blob region (append-only, never compacted)                  │
//! │   original / small / thumbnail encodings ...                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian.

mod container;
mod dedup;
mod header;
mod listing;
mod operations;
mod record;
mod resize;
mod resolution;
mod table;

pub use container::{Container, OpenMode};
pub use dedup::{content_hash, ContentHash};
pub use header::Header;
pub use listing::{ListEntry, ListFormat, Listing};
pub use record::Record;
pub use resolution::Resolution;
pub use table::RecordTable;

// =============================================================================
// Shared Layout Constants
// =============================================================================

/// Name written into the header of every new container
pub const CONTAINER_NAME: &str = "EPFL ImgFS 2024";

/// Longest container name (the field also holds a NUL terminator)
pub const MAX_CONTAINER_NAME: usize = 31;

/// Longest image id (the field also holds a NUL terminator)
pub const MAX_IMG_ID: usize = 127;

/// Width of a SHA-256 digest
pub const HASH_SIZE: usize = 32;

/// Number of resolutions stored per record
pub const NB_RES: usize = 3;

/// Header size in bytes
pub const HEADER_SIZE: u64 = 64;

/// Record slot size in bytes
pub const RECORD_SIZE: u64 = 208;

/// Byte offset of record slot `index`
pub(crate) fn record_offset(index: usize) -> u64 {
    HEADER_SIZE + index as u64 * RECORD_SIZE
}

/// Validate an image id before it reaches the table
pub(crate) fn validate_img_id(name: &str) -> crate::Result<()> {
    if name.is_empty() {
        return Err(crate::ImgfsError::InvalidArgument(
            "image id must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_IMG_ID {
        return Err(crate::ImgfsError::InvalidArgument(format!(
            "image id is {} bytes (max {})",
            name.len(),
            MAX_IMG_ID
        )));
    }
    if name.as_bytes().contains(&0) {
        return Err(crate::ImgfsError::InvalidArgument(
            "image id must not contain NUL bytes".to_string(),
        ));
    }
    Ok(())
}

/// Copy `s` into a NUL-padded fixed-width field
pub(crate) fn write_fixed_str(field: &mut [u8], s: &str) {
    field.fill(0);
    let n = s.len().min(field.len() - 1);
    field[..n].copy_from_slice(&s.as_bytes()[..n]);
}

/// Read a NUL-padded fixed-width field
pub(crate) fn read_fixed_str(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}
