//! Record slot
//!
//! One fixed 208-byte table entry describing an image and its variants.

use std::fmt;

use bytes::{Buf, BufMut, BytesMut};
use serde::{Serialize, Serializer};

use crate::error::{ImgfsError, Result};

use super::{read_fixed_str, write_fixed_str, ContentHash, Resolution, HASH_SIZE, MAX_IMG_ID, NB_RES, RECORD_SIZE};

/// On-disk value of `is_valid` for a free slot
const EMPTY: u16 = 0;

/// On-disk value of `is_valid` for a live record
const VALID: u16 = 1;

/// In-memory copy of one record slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Logical name, unique among valid records
    pub img_id: String,

    /// SHA-256 of the original bytes
    #[serde(rename = "sha", serialize_with = "serialize_hash")]
    pub hash: ContentHash,

    /// Original (width, height) in pixels
    pub orig_res: [u32; 2],

    /// Byte length per resolution; zero means not materialized
    pub size: [u32; NB_RES],

    /// Blob offset per resolution; zero means not materialized
    pub offset: [u64; NB_RES],

    /// Slot holds a live image
    pub is_valid: bool,
}

fn serialize_hash<S: Serializer>(hash: &ContentHash, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&hex::encode(hash))
}

impl Record {
    /// `(offset, size)` of a variant
    pub fn location(&self, resolution: Resolution) -> (u64, u32) {
        let i = resolution.index();
        (self.offset[i], self.size[i])
    }

    /// Record where a variant lives in the blob region
    pub fn set_location(&mut self, resolution: Resolution, offset: u64, size: u32) {
        let i = resolution.index();
        self.offset[i] = offset;
        self.size[i] = size;
    }

    /// Whether the variant has been written to the blob region
    pub fn has_resolution(&self, resolution: Resolution) -> bool {
        self.location(resolution) != (0, 0)
    }

    /// Serialize to the exact on-disk bytes
    pub fn encode(&self) -> [u8; RECORD_SIZE as usize] {
        let mut img_id = [0u8; MAX_IMG_ID + 1];
        write_fixed_str(&mut img_id, &self.img_id);

        let mut buf = BytesMut::with_capacity(RECORD_SIZE as usize);
        buf.put_slice(&img_id);
        buf.put_slice(&self.hash);
        for v in self.orig_res {
            buf.put_u32_le(v);
        }
        for v in self.size {
            buf.put_u32_le(v);
        }
        for v in self.offset {
            buf.put_u64_le(v);
        }
        buf.put_u16_le(if self.is_valid { VALID } else { EMPTY });
        buf.put_u16_le(0); // reserved

        let mut out = [0u8; RECORD_SIZE as usize];
        out.copy_from_slice(&buf);
        out
    }

    /// Parse the on-disk bytes
    ///
    /// Any non-zero validity flag counts as valid.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < RECORD_SIZE as usize {
            return Err(ImgfsError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("record needs {} bytes, got {}", RECORD_SIZE, bytes.len()),
            )));
        }

        let mut buf = &bytes[..RECORD_SIZE as usize];
        let mut img_id = [0u8; MAX_IMG_ID + 1];
        buf.copy_to_slice(&mut img_id);
        let mut hash = [0u8; HASH_SIZE];
        buf.copy_to_slice(&mut hash);
        let mut orig_res = [0u32; 2];
        for v in orig_res.iter_mut() {
            *v = buf.get_u32_le();
        }
        let mut size = [0u32; NB_RES];
        for v in size.iter_mut() {
            *v = buf.get_u32_le();
        }
        let mut offset = [0u64; NB_RES];
        for v in offset.iter_mut() {
            *v = buf.get_u64_le();
        }
        let is_valid = buf.get_u16_le() != EMPTY;

        Ok(Self {
            img_id: read_fixed_str(&img_id),
            hash,
            orig_res,
            size,
            offset,
            is_valid,
        })
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IMAGE ID: {}", self.img_id)?;
        writeln!(f, "SHA: {}", hex::encode(self.hash))?;
        writeln!(f, "VALID: {}", u16::from(self.is_valid))?;
        for (label, res) in [
            ("ORIG.", Resolution::Original),
            ("THUMB.", Resolution::Thumbnail),
            ("SMALL", Resolution::Small),
        ] {
            let (offset, size) = self.location(res);
            writeln!(f, "OFFSET {:<6}: {}\t\tSIZE {:<6}: {}", label, offset, label, size)?;
        }
        writeln!(f, "ORIGINAL: {} x {}", self.orig_res[0], self.orig_res[1])?;
        write!(f, "*****************************************")
    }
}
