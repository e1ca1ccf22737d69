//! Read-only view of the buffer that edit builders work against.

use crate::buffer::{Change, ChangeSet, Position, SelectionRange, TextLines, Transaction};
use crate::error::Result;

/// Text and selection snapshot for computing one transaction.
pub(crate) struct EditContext<'a> {
    pub text: &'a str,
    pub lines: TextLines<'a>,
    pub selection: SelectionRange,
}

impl<'a> EditContext<'a> {
    pub fn new(text: &'a str, selection: SelectionRange) -> Self {
        Self {
            text,
            lines: TextLines::new(text),
            selection,
        }
    }

    /// Position of the selection start.
    pub fn start(&self) -> Position {
        self.lines.clamp_pos(self.selection.from())
    }

    /// Position of the selection end.
    pub fn end(&self) -> Position {
        self.lines.clamp_pos(self.selection.to())
    }

    /// Position of the selection head.
    pub fn head(&self) -> Position {
        self.lines.clamp_pos(self.selection.head)
    }

    /// Line text, empty for lines past the end.
    pub fn line(&self, line: usize) -> &'a str {
        self.lines.line_text(line).unwrap_or("")
    }

    pub fn line_start(&self, line: usize) -> Result<usize> {
        self.lines.line_start(line)
    }

    pub fn line_end(&self, line: usize) -> Result<usize> {
        self.lines.line_end(line)
    }

    /// Lines touched by the selection, first and last inclusive.
    pub fn selected_lines(&self) -> (usize, usize) {
        (self.start().line, self.end().line)
    }

    /// Like `selected_lines`, but a non-empty selection ending at the start
    /// of a line does not include that line.
    pub fn covered_lines(&self) -> (usize, usize) {
        let (first, last) = self.selected_lines();
        if !self.selection.is_empty() && last > first && self.end().ch == 0 {
            (first, last - 1)
        } else {
            (first, last)
        }
    }

    /// Validate `changes` into a transaction that maps the current selection.
    pub fn transaction(&self, changes: Vec<Change>) -> Result<Transaction> {
        Ok(Transaction::new(ChangeSet::new(changes, self.text)?))
    }

    /// Text and selection after `tx`, without touching a buffer.
    #[cfg(test)]
    pub fn outcome(&self, tx: &Transaction) -> (String, SelectionRange) {
        let text = tx.changes.apply(self.text);
        let selection = tx
            .selection
            .unwrap_or_else(|| tx.changes.map_selection(self.selection));
        (text, selection)
    }
}
