//! Linear, cursor-addressed record of presented clips.
//!
//! Behaves like browser history: going back and then picking something new
//! discards everything after the cursor. There is deliberately no way to step
//! forward again.

use cliploop_common::ClipDescriptor;

/// Oldest entries are dropped beyond this many.
pub const MAX_HISTORY_LEN: usize = 500;

#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<ClipDescriptor>,
    index: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Truncate after the cursor, append `clip` and move the cursor onto it.
    pub fn push(&mut self, clip: ClipDescriptor) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(clip);

        if self.entries.len() > MAX_HISTORY_LEN {
            let excess = self.entries.len() - MAX_HISTORY_LEN;
            self.entries.drain(..excess);
        }
        self.index = self.entries.len() - 1;
    }

    /// Move the cursor back one entry and return it.
    pub fn step_back(&mut self) -> Option<&ClipDescriptor> {
        if !self.can_step_back() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    pub fn can_step_back(&self) -> bool {
        !self.entries.is_empty() && self.index > 0
    }

    /// Entry under the cursor.
    pub fn current(&self) -> Option<&ClipDescriptor> {
        self.entries.get(self.index)
    }

    /// Cursor position, `None` while empty.
    pub fn index(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.index)
    }

    pub fn entries(&self) -> &[ClipDescriptor] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
    }
}
