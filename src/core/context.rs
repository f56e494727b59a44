/// Resolution context: capture variables of one template instance.
use rustc_hash::FxHashMap;

use crate::core::lexicon::DrawnEntry;

/// A word captured by `=N`, reusable through `$(@N:...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub entry: DrawnEntry,
    /// Lower-cased category the entry was drawn from.
    pub word_type: String,
}

/// Maps capture indexes to drawn entries while one template is resolved.
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    captures: FxHashMap<u32, Capture>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: u32) -> Option<&Capture> {
        self.captures.get(&index)
    }

    pub fn contains(&self, index: u32) -> bool {
        self.captures.contains_key(&index)
    }

    /// Bind `index`. Returns `false` and keeps the earlier capture if the
    /// index is already bound.
    pub fn bind(&mut self, index: u32, capture: Capture) -> bool {
        if self.captures.contains_key(&index) {
            return false;
        }
        self.captures.insert(index, capture);
        true
    }

    pub fn len(&self) -> usize {
        self.captures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }
}
