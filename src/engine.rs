//! Engine Module
//!
//! Shares one open container between connection threads.
//!
//! ## Responsibilities
//! - Own the container and the lock that serializes access to it
//! - Route parsed commands to container operations
//!
//! Every command, reads included, takes the same lock: a read can append a
//! resized variant, which is a write to the file.

use std::path::Path;

use parking_lot::Mutex;

use crate::error::Result;
use crate::protocol::Command;
use crate::storage::{Container, Header, ListFormat, OpenMode};

/// Result of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// JSON listing
    Listing(String),
    /// Image bytes
    Image(Vec<u8>),
    /// Mutation applied
    Done,
}

/// Container behind a single lock
pub struct Engine {
    container: Mutex<Container>,
}

impl Engine {
    /// Wrap an already open container
    pub fn new(container: Container) -> Self {
        Self {
            container: Mutex::new(container),
        }
    }

    /// Open a container read-write
    pub fn open_path(path: &Path) -> Result<Self> {
        Ok(Self::new(Container::open(path, OpenMode::ReadWrite)?))
    }

    /// Execute a command
    pub fn execute(&self, command: Command) -> Result<Reply> {
        let mut container = self.container.lock();
        match command {
            Command::List => Ok(Reply::Listing(container.list(ListFormat::Names).to_json()?)),
            Command::Read { img_id, resolution } => {
                Ok(Reply::Image(container.read(&img_id, resolution)?))
            }
            Command::Insert { img_id, data } => {
                container.insert(&data, &img_id)?;
                Ok(Reply::Done)
            }
            Command::Delete { img_id } => {
                container.delete(&img_id)?;
                Ok(Reply::Done)
            }
        }
    }

    /// Snapshot of the header
    pub fn header(&self) -> Header {
        self.container.lock().header().clone()
    }

    /// Run `f` with the container locked
    pub fn with_container<T>(&self, f: impl FnOnce(&mut Container) -> T) -> T {
        let mut container = self.container.lock();
        f(&mut container)
    }

    /// Release the container
    pub fn close(self) {
        self.container.into_inner().close();
    }
}
