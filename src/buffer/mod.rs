//! Text buffer model
//!
//! Coordinates, the position/offset adapter, atomic multi-range changes and
//! the `TextBuffer` seam the editing commands dispatch through, with a
//! bundled string-backed `Document`.

mod change;
mod document;
mod lines;
mod position;

pub use change::{Assoc, Change, ChangeSet, Transaction};
pub use document::{Document, TextBuffer};
pub use lines::TextLines;
pub use position::{Position, Selection, SelectionRange, END_OF_LINE};
