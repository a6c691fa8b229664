//! Lazy resize
//!
//! Small and thumbnail variants are produced on first read and appended to
//! the blob region. Once a record's `(offset, size)` for a resolution is
//! non-zero it is never recomputed, invalidated or evicted.

use crate::error::{ImgfsError, Result};

use super::{Container, Resolution};

impl Container {
    /// Make sure slot `index` has `resolution` materialized
    ///
    /// Only the record slot is rewritten; header version and count stay
    /// unchanged because no logical record was added or removed.
    pub(crate) fn ensure_resolution(&mut self, index: usize, resolution: Resolution) -> Result<()> {
        let record = match self.table.get(index) {
            Some(r) if r.is_valid => r,
            _ => return Err(ImgfsError::ImageNotFound(format!("slot {}", index))),
        };

        if resolution == Resolution::Original || record.has_resolution(resolution) {
            return Ok(());
        }

        let (width, height) = self.header.target_res(resolution).ok_or_else(|| {
            ImgfsError::InvalidResolution(resolution.to_string())
        })?;
        let (orig_offset, orig_size) = record.location(Resolution::Original);
        let img_id = record.img_id.clone();

        self.require_writable()?;

        // Step 1: Load the original
        let original = self.read_blob(orig_offset, orig_size)?;

        // Step 2: Transcode
        let resized = self.codec.transcode(&original, width, height)?;
        if resized.is_empty() {
            return Err(ImgfsError::Codec(format!(
                "{} variant of '{}' came back empty",
                resolution, img_id
            )));
        }

        // Step 3: Append and record the location
        let (offset, size) = self.append_blob(&resized)?;
        self.table.slot_mut(index)?.set_location(resolution, offset, size);

        // Step 4: Persist the slot
        self.write_record(index)?;

        tracing::debug!(
            "Materialized {} of '{}' ({}x{}): {} bytes at offset {}",
            resolution,
            img_id,
            width,
            height,
            size,
            offset
        );

        Ok(())
    }
}
