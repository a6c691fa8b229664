//! Listing
//!
//! Lazy, one-shot enumeration of valid records in slot order.

use serde_json::json;

use crate::error::Result;

use super::{Container, Record};

/// What each listing entry carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    /// Image ids only
    Names,
    /// Full record metadata
    Verbose,
}

/// One listed record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEntry<'a> {
    Name(&'a str),
    Record { slot: usize, record: &'a Record },
}

/// Iterator returned by [`Container::list`]
///
/// Borrows the container, so the table cannot change while it is alive.
pub struct Listing<'a> {
    slots: std::iter::Enumerate<std::slice::Iter<'a, Record>>,
    format: ListFormat,
}

impl<'a> Iterator for Listing<'a> {
    type Item = ListEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let format = self.format;
        self.slots
            .by_ref()
            .find(|(_, r)| r.is_valid)
            .map(|(slot, record)| match format {
                ListFormat::Names => ListEntry::Name(record.img_id.as_str()),
                ListFormat::Verbose => ListEntry::Record { slot, record },
            })
    }
}

impl<'a> Listing<'a> {
    /// Consume the listing into JSON
    ///
    /// Names render as `{"Images": [...]}`; verbose entries as an array of
    /// record objects with their slot index.
    pub fn to_json(self) -> Result<String> {
        let value = match self.format {
            ListFormat::Names => {
                let names: Vec<&str> = self
                    .filter_map(|e| match e {
                        ListEntry::Name(n) => Some(n),
                        ListEntry::Record { .. } => None,
                    })
                    .collect();
                json!({ "Images": names })
            }
            ListFormat::Verbose => {
                let mut records = Vec::new();
                for entry in self {
                    if let ListEntry::Record { slot, record } = entry {
                        let mut v = serde_json::to_value(record)?;
                        v["slot"] = json!(slot);
                        records.push(v);
                    }
                }
                serde_json::Value::Array(records)
            }
        };
        Ok(serde_json::to_string(&value)?)
    }
}

impl Container {
    /// Enumerate valid records; no side effects
    pub fn list(&self, format: ListFormat) -> Listing<'_> {
        Listing {
            slots: self.table.iter().enumerate(),
            format,
        }
    }
}
