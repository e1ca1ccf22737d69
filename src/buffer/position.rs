//! Coordinates and selections.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column sentinel meaning "end of line" for clamped lookups.
pub const END_OF_LINE: usize = usize::MAX;

/// A logical `line:column` coordinate (both 0-indexed, column in bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

impl Position {
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }

    /// The end of `line`, resolved by clamped lookups.
    pub fn end_of_line(line: usize) -> Self {
        Self {
            line,
            ch: END_OF_LINE,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.ch)
    }
}

impl FromStr for Position {
    type Err = String;

    /// Parse `LINE:CH`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (line, ch) = s
            .split_once(':')
            .ok_or_else(|| format!("expected LINE:CH, got '{}'", s))?;
        let line = line
            .trim()
            .parse()
            .map_err(|e| format!("invalid line in '{}': {}", s, e))?;
        let ch = ch
            .trim()
            .parse()
            .map_err(|e| format!("invalid column in '{}': {}", s, e))?;
        Ok(Self { line, ch })
    }
}

/// A selection expressed as logical positions. `anchor == head` is a caret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Position,
    pub head: Position,
}

impl Selection {
    pub fn new(anchor: Position, head: Position) -> Self {
        Self { anchor, head }
    }

    pub fn caret(pos: Position) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn start(&self) -> Position {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> Position {
        self.anchor.max(self.head)
    }

    pub fn is_caret(&self) -> bool {
        self.anchor == self.head
    }
}

/// A selection expressed as linear byte offsets, as the host buffer stores it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub anchor: usize,
    pub head: usize,
}

impl SelectionRange {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    pub fn caret(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }
}
