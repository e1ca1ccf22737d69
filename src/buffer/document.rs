//! Host buffer seam and the bundled string-backed document.

use crate::buffer::change::Transaction;
use crate::buffer::lines::TextLines;
use crate::buffer::position::{Selection, SelectionRange};
use crate::error::{Error, Result};
use log::debug;

/// The transaction engine the editing commands run against.
///
/// Implementations own the text and its single selection. Commands only read
/// through `text()`/`selection()` and write through `dispatch()`.
pub trait TextBuffer {
    /// Current full text.
    fn text(&self) -> &str;

    /// Current selection as byte offsets.
    fn selection(&self) -> SelectionRange;

    /// Apply a transaction atomically. On error the buffer is unchanged.
    fn dispatch(&mut self, transaction: Transaction) -> Result<()>;

    /// Revert the last transaction. Buffers without history report `false`.
    fn undo(&mut self) -> bool {
        false
    }

    /// Re-apply the last reverted transaction.
    fn redo(&mut self) -> bool {
        false
    }
}

/// Snapshot kept on the undo/redo stacks.
#[derive(Debug, Clone)]
struct Snapshot {
    text: String,
    selection: SelectionRange,
}

/// String-backed `TextBuffer` with linear undo/redo history.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    selection: SelectionRange,
    /// Undo history stack
    undo_stack: Vec<Snapshot>,
    /// Redo history stack
    redo_stack: Vec<Snapshot>,
    /// Maximum undo history size
    max_undo_size: usize,
    /// Incremented on every change to the text
    version: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new("")
    }
}

impl Document {
    /// Default maximum undo history size.
    pub const DEFAULT_MAX_UNDO: usize = 100;

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selection: SelectionRange::default(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo_size: Self::DEFAULT_MAX_UNDO,
            version: 0,
        }
    }

    pub fn with_max_undo(mut self, max_undo_size: usize) -> Self {
        self.max_undo_size = max_undo_size.max(1);
        self
    }

    /// Replace the whole text, recording it for undo. The caret moves to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.push_undo();
            self.text = text;
            self.selection = SelectionRange::caret(self.text.len());
            self.version = self.version.wrapping_add(1);
        }
    }

    /// Set the selection from byte offsets.
    pub fn set_selection_range(&mut self, selection: SelectionRange) -> Result<()> {
        let len = self.text.len();
        for offset in [selection.anchor, selection.head] {
            if offset > len || !self.text.is_char_boundary(offset) {
                return Err(Error::InvalidOffset { offset, len });
            }
        }
        self.selection = selection;
        Ok(())
    }

    /// Set the selection from positions.
    pub fn set_selection(&mut self, selection: Selection) -> Result<()> {
        let lines = TextLines::new(&self.text);
        let anchor = lines.to_offset(selection.anchor)?;
        let head = lines.to_offset(selection.head)?;
        self.selection = SelectionRange::new(anchor, head);
        Ok(())
    }

    /// Current selection as positions.
    pub fn selection_positions(&self) -> Selection {
        let lines = TextLines::new(&self.text);
        Selection::new(
            lines.clamp_pos(self.selection.anchor),
            lines.clamp_pos(self.selection.head),
        )
    }

    /// Selected text.
    pub fn selected_text(&self) -> &str {
        &self.text[self.selection.from()..self.selection.to()]
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn push_undo(&mut self) {
        self.undo_stack.push(Snapshot {
            text: self.text.clone(),
            selection: self.selection,
        });
        if self.undo_stack.len() > self.max_undo_size {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

impl TextBuffer for Document {
    fn text(&self) -> &str {
        &self.text
    }

    fn selection(&self) -> SelectionRange {
        self.selection
    }

    fn dispatch(&mut self, transaction: Transaction) -> Result<()> {
        let Transaction { changes, selection } = transaction;
        if changes.doc_len() != self.text.len() && !changes.is_empty() {
            return Err(Error::InvalidChange {
                from: 0,
                to: changes.doc_len(),
                len: self.text.len(),
            });
        }

        let new_text = changes.apply(&self.text);
        let new_selection = selection.unwrap_or_else(|| changes.map_selection(self.selection));
        for offset in [new_selection.anchor, new_selection.head] {
            if offset > new_text.len() || !new_text.is_char_boundary(offset) {
                return Err(Error::InvalidOffset {
                    offset,
                    len: new_text.len(),
                });
            }
        }

        if !changes.is_empty() {
            self.push_undo();
            self.text = new_text;
            self.version = self.version.wrapping_add(1);
            debug!(
                "Applied {} change(s), document is now {} bytes",
                changes.len(),
                self.text.len()
            );
        }
        self.selection = new_selection;
        Ok(())
    }

    /// Undo the last change. Returns `true` if undo was performed.
    fn undo(&mut self) -> bool {
        if let Some(previous) = self.undo_stack.pop() {
            self.redo_stack.push(Snapshot {
                text: std::mem::replace(&mut self.text, previous.text),
                selection: self.selection,
            });
            self.selection = previous.selection;
            self.version = self.version.wrapping_add(1);
            true
        } else {
            false
        }
    }

    /// Redo the last undone change. Returns `true` if redo was performed.
    fn redo(&mut self) -> bool {
        if let Some(next) = self.redo_stack.pop() {
            self.undo_stack.push(Snapshot {
                text: std::mem::replace(&mut self.text, next.text),
                selection: self.selection,
            });
            self.selection = next.selection;
            self.version = self.version.wrapping_add(1);
            true
        } else {
            false
        }
    }
}
