//! Insert, read and delete
//!
//! Every state change rewrites the affected record slot and then the header
//! before returning. There is no rollback: if the second write fails the
//! file and the in-memory copy may disagree, and the container must be
//! reopened before further use.

use crate::error::{ImgfsError, Result};

use super::dedup::{self, Dedup};
use super::{content_hash, validate_img_id, Container, Record, Resolution};

impl Container {
    /// Insert `bytes` under `name`
    ///
    /// Steps:
    /// 1. Reject when full, find the first free slot
    /// 2. Hash the content, reject a name already in use
    /// 3. Share storage with identical content, or decode and append
    /// 4. Mark the slot valid, bump count and version
    /// 5. Write the slot, then the header
    pub fn insert(&mut self, bytes: &[u8], name: &str) -> Result<()> {
        validate_img_id(name)?;
        if bytes.is_empty() {
            return Err(ImgfsError::InvalidArgument("image is empty".to_string()));
        }
        if u32::try_from(bytes.len()).is_err() {
            return Err(ImgfsError::InvalidArgument(format!(
                "image of {} bytes is too large",
                bytes.len()
            )));
        }
        self.require_writable()?;

        // Step 1: Capacity and free slot
        if self.header.nb_files >= self.header.max_files {
            return Err(ImgfsError::ContainerFull);
        }
        let index = self.table.find_free().ok_or(ImgfsError::ContainerFull)?;

        // Step 2: Hash + name uniqueness
        let hash = content_hash(bytes);
        let mut record = Record {
            img_id: name.to_string(),
            hash,
            ..Default::default()
        };

        // Step 3: Content dedup or append
        match dedup::check(&self.table, index, name, &hash)? {
            Dedup::SharedWith(source) => {
                let shared = self.table.get(source).ok_or_else(|| {
                    ImgfsError::InvalidArgument(format!("slot {} out of range", source))
                })?;
                dedup::share_storage(&mut record, shared);
                tracing::debug!("'{}' shares content with slot {}", name, source);
            }
            Dedup::Unique => {
                let (width, height) = self.codec.decode_dimensions(bytes)?;
                let (offset, size) = self.append_blob(bytes)?;
                record.orig_res = [width, height];
                record.set_location(Resolution::Original, offset, size);
                tracing::debug!(
                    "'{}' stored: {}x{}, {} bytes at offset {}",
                    name,
                    width,
                    height,
                    size,
                    offset
                );
            }
        }

        // Step 4: Commit in memory
        record.is_valid = true;
        *self.table.slot_mut(index)? = record;
        self.header.nb_files += 1;
        self.header.version += 1;

        // Step 5: Persist slot then header
        self.write_record(index)?;
        self.write_header().map_err(|e| {
            tracing::error!(
                "{}: slot {} written but header was not; reopen before further use",
                self.path.display(),
                index
            );
            e
        })?;

        tracing::info!(
            "Inserted '{}' into slot {} (version {})",
            name,
            index,
            self.header.version
        );
        Ok(())
    }

    /// Read `name` at `resolution`, creating the variant if needed
    pub fn read(&mut self, name: &str, resolution: Resolution) -> Result<Vec<u8>> {
        validate_img_id(name)?;

        // Step 1: Lookup
        let index = self
            .table
            .find_by_name(name)
            .ok_or_else(|| ImgfsError::ImageNotFound(name.to_string()))?;

        // Step 2: Lazy resize
        self.ensure_resolution(index, resolution)?;

        // Step 3: Fetch bytes
        let (offset, size) = self
            .table
            .get(index)
            .map(|r| r.location(resolution))
            .ok_or_else(|| ImgfsError::ImageNotFound(name.to_string()))?;
        let bytes = self.read_blob(offset, size)?;

        tracing::debug!("Read '{}' at {} ({} bytes)", name, resolution, bytes.len());
        Ok(bytes)
    }

    /// Delete `name`
    ///
    /// Only the validity flag changes. Blob bytes stay, so records sharing
    /// them through dedup remain readable.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        validate_img_id(name)?;
        self.require_writable()?;

        // Step 1: Lookup
        let index = self
            .table
            .find_by_name(name)
            .ok_or_else(|| ImgfsError::ImageNotFound(name.to_string()))?;

        // Step 2: Flag empty
        self.table.slot_mut(index)?.is_valid = false;

        // Step 3: Persist slot, then count/version/header
        self.write_record(index)?;
        self.header.nb_files = self.header.nb_files.saturating_sub(1);
        self.header.version += 1;
        self.write_header().map_err(|e| {
            tracing::error!(
                "{}: slot {} cleared but header was not rewritten; reopen before further use",
                self.path.display(),
                index
            );
            e
        })?;

        tracing::info!(
            "Deleted '{}' from slot {} (version {})",
            name,
            index,
            self.header.version
        );
        Ok(())
    }
}
