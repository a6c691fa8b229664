//! Container header
//!
//! Fixed 64-byte structure at offset 0 of every container.

use std::fmt;

use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;

use crate::config::CreateOptions;
use crate::error::{ImgfsError, Result};

use super::{read_fixed_str, write_fixed_str, Resolution, CONTAINER_NAME, HEADER_SIZE, MAX_CONTAINER_NAME};

/// In-memory copy of the on-disk header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Container type name
    pub name: String,

    /// Bumped on every insert and delete
    pub version: u32,

    /// Number of valid records
    pub nb_files: u32,

    /// Table capacity, fixed at creation
    pub max_files: u32,

    /// Thumbnail width/height, then small width/height
    pub resized_res: [u16; 4],
}

impl Header {
    /// Fresh header for a new container
    pub fn new(options: &CreateOptions) -> Self {
        Self {
            name: CONTAINER_NAME.to_string(),
            version: 0,
            nb_files: 0,
            max_files: options.max_files,
            resized_res: [
                options.thumb_res.0,
                options.thumb_res.1,
                options.small_res.0,
                options.small_res.1,
            ],
        }
    }

    /// Target (width, height) for a resized variant
    ///
    /// Returns `None` for the original, which is never resized.
    pub fn target_res(&self, resolution: Resolution) -> Option<(u32, u32)> {
        match resolution {
            Resolution::Thumbnail => Some((self.resized_res[0] as u32, self.resized_res[1] as u32)),
            Resolution::Small => Some((self.resized_res[2] as u32, self.resized_res[3] as u32)),
            Resolution::Original => None,
        }
    }

    /// Serialize to the exact on-disk bytes
    pub fn encode(&self) -> [u8; HEADER_SIZE as usize] {
        let mut name = [0u8; MAX_CONTAINER_NAME + 1];
        write_fixed_str(&mut name, &self.name);

        let mut buf = BytesMut::with_capacity(HEADER_SIZE as usize);
        buf.put_slice(&name);
        buf.put_u32_le(self.version);
        buf.put_u32_le(self.nb_files);
        buf.put_u32_le(self.max_files);
        for res in self.resized_res {
            buf.put_u16_le(res);
        }
        buf.put_u32_le(0); // reserved
        buf.put_u64_le(0); // reserved

        let mut out = [0u8; HEADER_SIZE as usize];
        out.copy_from_slice(&buf);
        out
    }

    /// Parse the on-disk bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE as usize {
            return Err(ImgfsError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("header needs {} bytes, got {}", HEADER_SIZE, bytes.len()),
            )));
        }

        let mut buf = &bytes[..HEADER_SIZE as usize];
        let mut name = [0u8; MAX_CONTAINER_NAME + 1];
        buf.copy_to_slice(&mut name);
        let version = buf.get_u32_le();
        let nb_files = buf.get_u32_le();
        let max_files = buf.get_u32_le();
        let mut resized_res = [0u16; 4];
        for res in resized_res.iter_mut() {
            *res = buf.get_u16_le();
        }

        Ok(Self {
            name: read_fixed_str(&name),
            version,
            nb_files,
            max_files,
            resized_res,
        })
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "*****************************************")?;
        writeln!(f, "********** IMGFS HEADER START ***********")?;
        writeln!(f, "TYPE: {}", self.name)?;
        writeln!(f, "VERSION: {}", self.version)?;
        writeln!(f, "IMAGE COUNT: {}\t\tMAX IMAGES: {}", self.nb_files, self.max_files)?;
        writeln!(
            f,
            "THUMBNAIL: {} x {}\tSMALL: {} x {}",
            self.resized_res[0], self.resized_res[1], self.resized_res[2], self.resized_res[3]
        )?;
        writeln!(f, "*********** IMGFS HEADER END ************")?;
        write!(f, "*****************************************")
    }
}
