//! Per-sheet event processing.
//!
//! A worksheet arrives as a stream of markup events: element open (with its
//! attributes), element close, and character data, in document order.
//! [`SheetHandler`] consumes those events for exactly one sheet, coerces each
//! completed cell value and hands it straight to the output emitter.
//!
//! The event source is anything that can drive a [`SheetContentHandler`]:
//! the `.xlsx` reader in [`crate::xlsx`], a binary-record translator, or a
//! test feeding events by hand.

pub mod context;
pub mod handler;
pub mod reference;

use smallvec::SmallVec;

use crate::error::Result;

pub use context::{SheetParseContext, TagState};
pub use handler::{SheetHandler, SheetSummary};
pub use reference::CellAddress;

/// Receiver of one sheet's markup events.
pub trait SheetContentHandler {
    /// An element opened.
    fn start_element(&mut self, name: &str, attributes: &Attributes) -> Result<()>;

    /// An element closed.
    fn end_element(&mut self, name: &str) -> Result<()>;

    /// Character data inside the current element.
    fn characters(&mut self, text: &str) -> Result<()>;
}

/// Attributes of an opened element, by local name.
///
/// Worksheet elements carry only a handful of attributes, so lookups scan
/// a small inline vector.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    entries: SmallVec<[(String, String); 4]>,
}

impl Attributes {
    /// Create an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Value of the attribute with the given local name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Remove all attributes, keeping the allocation.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (name, value) in iter {
            attributes.push(name, value);
        }
        attributes
    }
}
