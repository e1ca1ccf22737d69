//! Tidemark - markdown-aware structural editing
//!
//! Detects which markdown constructs are active at a position and applies
//! idempotent toggles (emphasis, headings, quotes, lists, code, links) as
//! atomic multi-range transactions against a host text buffer.
//!
//! # Example
//! ```
//! use tidemark::buffer::SelectionRange;
//! use tidemark::config::EditorSettings;
//! use tidemark::editing::MarkdownEditor;
//!
//! let mut editor = MarkdownEditor::from_text("make this bold", EditorSettings::default());
//! editor
//!     .buffer_mut()
//!     .set_selection_range(SelectionRange::new(5, 9))
//!     .unwrap();
//! assert!(editor.toggle_bold());
//! assert_eq!(editor.text(), "make **this** bold");
//! ```

pub mod buffer;
pub mod config;
pub mod editing;
pub mod error;
pub mod markdown;
pub mod string_utils;

pub use buffer::{Document, Position, Selection, SelectionRange, TextBuffer};
pub use editing::{EditorCommand, MarkdownEditor};
pub use error::{Error, Result};
