//! Multi-range changes and transactions.
//!
//! A `ChangeSet` is a validated list of replacements whose offsets all refer
//! to the same (pre-change) text. It is applied atomically: the buffer goes
//! from the old text to the new text in one step and offsets into the old
//! text can be mapped into the new one.

use crate::buffer::position::SelectionRange;
use crate::error::{Error, Result};

/// Replace `from..to` with `insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub from: usize,
    pub to: usize,
    pub insert: String,
}

impl Change {
    pub fn replace(from: usize, to: usize, insert: impl Into<String>) -> Self {
        Self {
            from,
            to,
            insert: insert.into(),
        }
    }

    pub fn insert(at: usize, insert: impl Into<String>) -> Self {
        Self::replace(at, at, insert)
    }

    pub fn delete(from: usize, to: usize) -> Self {
        Self::replace(from, to, String::new())
    }
}

/// Which side of an insertion a mapped offset sticks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Before,
    After,
}

/// A validated, sorted, non-overlapping set of changes against one text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<Change>,
    doc_len: usize,
}

impl ChangeSet {
    /// Validate `changes` against `doc`.
    ///
    /// Changes are sorted by position; changes that would not alter the text
    /// are dropped. Fails when a change is out of bounds, reversed, not on a
    /// character boundary, or overlaps another change.
    pub fn new(mut changes: Vec<Change>, doc: &str) -> Result<Self> {
        let len = doc.len();
        for change in &changes {
            if change.from > change.to
                || change.to > len
                || !doc.is_char_boundary(change.from)
                || !doc.is_char_boundary(change.to)
            {
                return Err(Error::InvalidChange {
                    from: change.from,
                    to: change.to,
                    len,
                });
            }
        }

        changes.sort_by_key(|c| (c.from, c.to));
        for pair in changes.windows(2) {
            if pair[1].from < pair[0].to {
                return Err(Error::InvalidChange {
                    from: pair[1].from,
                    to: pair[1].to,
                    len,
                });
            }
        }
        changes.retain(|c| doc[c.from..c.to] != c.insert);

        Ok(Self {
            changes,
            doc_len: len,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Length of the text this set was validated against.
    pub fn doc_len(&self) -> usize {
        self.doc_len
    }

    /// Produce the new text.
    pub fn apply(&self, doc: &str) -> String {
        let added: usize = self.changes.iter().map(|c| c.insert.len()).sum();
        let mut out = String::with_capacity(doc.len() + added);
        let mut cursor = 0;
        for change in &self.changes {
            out.push_str(&doc[cursor..change.from]);
            out.push_str(&change.insert);
            cursor = change.to;
        }
        out.push_str(&doc[cursor..]);
        out
    }

    /// Map an offset in the old text to the new text.
    ///
    /// Offsets inside a replaced range collapse to the start (`Before`) or
    /// end (`After`) of the replacement. An offset at the end of a replaced
    /// range stays glued to the text that follows it.
    pub fn map_offset(&self, pos: usize, assoc: Assoc) -> usize {
        let mut delta: isize = 0;
        for change in &self.changes {
            let inserted = change.insert.len() as isize;
            let removed = (change.to - change.from) as isize;
            if change.from > pos {
                break;
            }
            if change.to < pos {
                delta += inserted - removed;
                continue;
            }
            if change.from == change.to {
                if assoc == Assoc::Before {
                    break;
                }
                delta += inserted;
                continue;
            }
            if pos == change.to {
                delta += inserted - removed;
                continue;
            }
            let base = (change.from as isize + delta) as usize;
            return match assoc {
                Assoc::Before => base,
                Assoc::After => base + change.insert.len(),
            };
        }
        (pos as isize + delta) as usize
    }

    /// Map a selection: a caret follows inserted text, a range maps inward.
    pub fn map_selection(&self, sel: SelectionRange) -> SelectionRange {
        if sel.is_empty() {
            return SelectionRange::caret(self.map_offset(sel.head, Assoc::After));
        }
        let from = self.map_offset(sel.from(), Assoc::After);
        let to = self.map_offset(sel.to(), Assoc::Before).max(from);
        if sel.anchor <= sel.head {
            SelectionRange::new(from, to)
        } else {
            SelectionRange::new(to, from)
        }
    }
}

/// A change set plus the selection to install once it is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    pub changes: ChangeSet,
    /// Selection in the new text; `None` maps the current selection.
    pub selection: Option<SelectionRange>,
}

impl Transaction {
    pub fn new(changes: ChangeSet) -> Self {
        Self {
            changes,
            selection: None,
        }
    }

    pub fn with_selection(mut self, selection: SelectionRange) -> Self {
        self.selection = Some(selection);
        self
    }
}
