//! Record table
//!
//! In-memory mirror of the on-disk slot array.
//!
//! Slots are never removed: a deleted record is only flagged empty and the
//! slot is reused by the next insert (first free slot wins). Lookups are
//! linear scans in slot order, so the lowest matching index breaks ties.

use crate::error::{ImgfsError, Result};

use super::Record;

/// Fixed-capacity array of record slots
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    slots: Vec<Record>,
}

impl RecordTable {
    /// Table of `capacity` empty slots
    ///
    /// Allocation failure surfaces as `OutOfMemory` instead of aborting.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        slots.resize_with(capacity, Record::default);
        Ok(Self { slots })
    }

    /// Build from records read off disk
    pub(crate) fn from_records(slots: Vec<Record>) -> Self {
        Self { slots }
    }

    /// Number of slots (valid or not)
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of valid records, counted from the flags
    pub fn valid_count(&self) -> usize {
        self.slots.iter().filter(|r| r.is_valid).count()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.slots.get(index)
    }

    /// Mutable slot; an index past the capacity is an error, not a no-op
    pub(crate) fn slot_mut(&mut self, index: usize) -> Result<&mut Record> {
        let capacity = self.slots.len();
        self.slots.get_mut(index).ok_or_else(|| {
            ImgfsError::InvalidArgument(format!("slot {} out of range (capacity {})", index, capacity))
        })
    }

    /// All slots in table order
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.slots.iter()
    }

    /// First empty slot
    pub fn find_free(&self) -> Option<usize> {
        self.slots.iter().position(|r| !r.is_valid)
    }

    /// First valid record named `name`
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|r| r.is_valid && r.img_id == name)
    }

    /// First valid record satisfying `pred`, skipping slot `except`
    pub(crate) fn find_valid_except<F>(&self, except: Option<usize>, pred: F) -> Option<usize>
    where
        F: Fn(&Record) -> bool,
    {
        self.slots
            .iter()
            .enumerate()
            .find(|(i, r)| Some(*i) != except && r.is_valid && pred(r))
            .map(|(i, _)| i)
    }
}
