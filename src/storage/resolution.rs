//! Image resolutions stored per record.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{ImgfsError, Result};

/// One of the three variants kept for every image.
///
/// The discriminant is the index into a record's `size`/`offset` arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(usize)]
pub enum Resolution {
    Thumbnail = 0,
    Small = 1,
    Original = 2,
}

impl Resolution {
    /// Index into the per-record arrays
    pub fn index(self) -> usize {
        self as usize
    }

    /// Suffix used when the CLI writes a variant to disk
    pub fn suffix(self) -> &'static str {
        match self {
            Resolution::Thumbnail => "thumb",
            Resolution::Small => "small",
            Resolution::Original => "orig",
        }
    }
}

impl FromStr for Resolution {
    type Err = ImgfsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "thumb" | "thumbnail" => Ok(Resolution::Thumbnail),
            "small" => Ok(Resolution::Small),
            "orig" | "original" => Ok(Resolution::Original),
            other => Err(ImgfsError::InvalidResolution(other.to_string())),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resolution::Thumbnail => "thumbnail",
            Resolution::Small => "small",
            Resolution::Original => "original",
        };
        f.write_str(name)
    }
}
