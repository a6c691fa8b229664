//! Deduplication
//!
//! Names are unique among valid records. Content is shared: an insert whose
//! SHA-256 matches an existing valid record reuses that record's blob
//! locations instead of appending the bytes again.

use sha2::{Digest, Sha256};

use crate::error::{ImgfsError, Result};

use super::{Record, RecordTable, HASH_SIZE};

/// SHA-256 digest of an image's original bytes
pub type ContentHash = [u8; HASH_SIZE];

/// Hash image bytes
pub fn content_hash(bytes: &[u8]) -> ContentHash {
    Sha256::digest(bytes).into()
}

/// Outcome of checking a candidate against the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Dedup {
    /// Identical content already stored in this slot
    SharedWith(usize),
    /// New content that must be appended
    Unique,
}

/// Check a candidate (`name`, `hash`) that will land in slot `target`
///
/// Name collisions are checked across the whole table first, so a
/// duplicate name is rejected even when the content also matches.
pub(crate) fn check(table: &RecordTable, target: usize, name: &str, hash: &ContentHash) -> Result<Dedup> {
    if table
        .find_valid_except(Some(target), |r| r.img_id == name)
        .is_some()
    {
        return Err(ImgfsError::DuplicateName(name.to_string()));
    }

    Ok(match table.find_valid_except(Some(target), |r| &r.hash == hash) {
        Some(slot) => Dedup::SharedWith(slot),
        None => Dedup::Unique,
    })
}

/// Alias `record` onto the storage of `source`
pub(crate) fn share_storage(record: &mut Record, source: &Record) {
    record.offset = source.offset;
    record.size = source.size;
    record.orig_res = source.orig_res;
}
