//! Container handle
//!
//! Owns the file and the in-memory copy of header and table.
//!
//! ## Lifecycle
//! - `create`: write a fresh header and `max_files` zeroed slots
//! - `open`: load header + whole table, or fail having released everything;
//!   the file count is recomputed from the validity flags
//! - `close`: drop the handle; nothing is flushed since every mutation
//!   already wrote its slot and header before returning

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::codec::{Codec, ImageCodec};
use crate::config::CreateOptions;
use crate::error::{ImgfsError, Result};

use super::{record_offset, Header, Record, RecordTable, HEADER_SIZE, RECORD_SIZE};

/// How the backing file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
    ReadWrite,
}

/// An open imgFS container
///
/// Not internally synchronized: callers sharing a container across threads
/// wrap it in a lock (see [`crate::engine::Engine`]). Reads may append
/// resized variants, so they need `&mut self` too.
pub struct Container {
    /// Path of the backing file (for logging)
    pub(super) path: PathBuf,

    /// Backing file
    pub(super) file: File,

    /// Mode the file was opened with
    pub(super) mode: OpenMode,

    /// In-memory header
    pub(super) header: Header,

    /// In-memory record table
    pub(super) table: RecordTable,

    /// Decoder/resizer for inserts and lazy variants
    pub(super) codec: Box<dyn Codec>,
}

impl Container {
    /// Create a new container file, truncating any existing one
    pub fn create(path: impl AsRef<Path>, options: CreateOptions) -> Result<Self> {
        Self::create_with_codec(path, options, Box::new(ImageCodec))
    }

    /// Create with a custom codec
    pub fn create_with_codec(
        path: impl AsRef<Path>,
        options: CreateOptions,
        codec: Box<dyn Codec>,
    ) -> Result<Self> {
        let path = path.as_ref();

        if options.max_files == 0 {
            return Err(ImgfsError::InvalidArgument(
                "max_files must be at least 1".to_string(),
            ));
        }
        let (tw, th) = options.thumb_res;
        let (sw, sh) = options.small_res;
        if tw == 0 || th == 0 || sw == 0 || sh == 0 {
            return Err(ImgfsError::InvalidArgument(
                "resized resolutions must be non-zero".to_string(),
            ));
        }

        let header = Header::new(&options);
        let table = RecordTable::with_capacity(options.max_files as usize)?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut container = Self {
            path: path.to_path_buf(),
            file,
            mode: OpenMode::ReadWrite,
            header,
            table,
            codec,
        };
        container.write_all_metadata()?;

        tracing::info!(
            "Created {} ({} item(s) written, capacity {})",
            path.display(),
            options.max_files as u64 + 1,
            options.max_files
        );

        Ok(container)
    }

    /// Open an existing container
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        Self::open_with_codec(path, mode, Box::new(ImageCodec))
    }

    /// Open with a custom codec
    ///
    /// Either the whole table is loaded or nothing is kept: every resource
    /// acquired so far is dropped on the error path.
    pub fn open_with_codec(path: impl AsRef<Path>, mode: OpenMode, codec: Box<dyn Codec>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .read(true)
            .write(mode == OpenMode::ReadWrite)
            .open(path)?;

        // Step 1: Header
        let mut header_bytes = [0u8; HEADER_SIZE as usize];
        file.read_exact(&mut header_bytes)?;
        let mut header = Header::decode(&header_bytes)?;

        if header.nb_files > header.max_files {
            return Err(ImgfsError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "header claims {} files but capacity is {}",
                    header.nb_files, header.max_files
                ),
            )));
        }

        // Step 2: Whole table in one read, after checking the file holds it
        let capacity = header.max_files as usize;
        let needed = HEADER_SIZE + u64::from(header.max_files) * RECORD_SIZE;
        let file_len = file.metadata()?.len();
        if file_len < needed {
            return Err(ImgfsError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "{} slots need {} bytes but file has {}",
                    header.max_files, needed, file_len
                ),
            )));
        }
        let table_len = capacity
            .checked_mul(RECORD_SIZE as usize)
            .ok_or_else(|| ImgfsError::OutOfMemory(format!("table of {} slots", capacity)))?;
        let mut table_bytes = Vec::new();
        table_bytes.try_reserve_exact(table_len)?;
        table_bytes.resize(table_len, 0);
        file.read_exact(&mut table_bytes)?;

        let mut records = Vec::new();
        records.try_reserve_exact(capacity)?;
        for chunk in table_bytes.chunks_exact(RECORD_SIZE as usize) {
            records.push(Record::decode(chunk)?);
        }
        let table = RecordTable::from_records(records);

        // Step 3: The table's flags are authoritative for the count
        let valid = table.valid_count() as u32;
        if valid != header.nb_files {
            tracing::warn!(
                "{}: header counts {} files but table holds {} valid records; using {}",
                path.display(),
                header.nb_files,
                valid,
                valid
            );
            header.nb_files = valid;
        }

        tracing::debug!(
            "Opened {} ({:?}, version {}, {}/{} files)",
            path.display(),
            mode,
            header.version,
            header.nb_files,
            header.max_files
        );

        Ok(Self {
            path: path.to_path_buf(),
            file,
            mode,
            header,
            table,
            codec,
        })
    }

    /// Release the table and the file handle
    ///
    /// Nothing is written here.
    pub fn close(self) {
        tracing::debug!("Closing {}", self.path.display());
        drop(self);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn table(&self) -> &RecordTable {
        &self.table
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn version(&self) -> u32 {
        self.header.version
    }

    pub fn nb_files(&self) -> u32 {
        self.header.nb_files
    }

    pub fn max_files(&self) -> u32 {
        self.header.max_files
    }

    /// Current length of the backing file
    pub fn file_size(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Record currently named `name`
    pub fn find(&self, name: &str) -> Option<&Record> {
        self.table.find_by_name(name).and_then(|i| self.table.get(i))
    }

    // =========================================================================
    // Persistence Helpers
    // =========================================================================

    pub(super) fn require_writable(&self) -> Result<()> {
        if self.mode == OpenMode::ReadOnly {
            return Err(ImgfsError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is opened read-only", self.path.display()),
            )));
        }
        Ok(())
    }

    /// Rewrite the header at offset 0
    pub(super) fn write_header(&mut self) -> Result<()> {
        let bytes = self.header.encode();
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&bytes)?;
        Ok(())
    }

    /// Rewrite one record slot
    pub(super) fn write_record(&mut self, index: usize) -> Result<()> {
        let record = self.table.get(index).ok_or_else(|| {
            ImgfsError::InvalidArgument(format!("slot {} out of range", index))
        })?;
        let bytes = record.encode();
        self.file.seek(SeekFrom::Start(record_offset(index)))?;
        self.file.write_all(&bytes)?;
        Ok(())
    }

    /// Write header and every slot (used by create)
    fn write_all_metadata(&mut self) -> Result<()> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(HEADER_SIZE as usize + self.table.capacity() * RECORD_SIZE as usize)?;
        buf.extend_from_slice(&self.header.encode());
        for record in self.table.iter() {
            buf.extend_from_slice(&record.encode());
        }
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&buf)?;
        self.file.flush()?;
        Ok(())
    }

    /// Append bytes to the blob region, returning `(offset, length)`
    pub(super) fn append_blob(&mut self, bytes: &[u8]) -> Result<(u64, u32)> {
        let len = u32::try_from(bytes.len()).map_err(|_| {
            ImgfsError::InvalidArgument(format!("blob of {} bytes exceeds u32", bytes.len()))
        })?;
        let offset = self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(bytes)?;
        Ok((offset, len))
    }

    /// Read exactly `len` bytes at `offset`
    pub(super) fn read_blob(&mut self, offset: u64, len: u32) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(len as usize)?;
        buf.resize(len as usize, 0);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}
